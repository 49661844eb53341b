//! tagfade-server — NFC reader events in, fading MIDI control changes out.
//!
//! Serves `GET /nfc?uid=<tag>&reader=<id>` for the readers and
//! `GET /api/status` for inspection. Each tag arriving on a reader fades its
//! CC up to 127; the reader going empty fades its tags back to 0.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use tagfade_core::sink::LogSink;
use tagfade_core::{CcSink, EventDispatcher, FadeSettings};

mod config;
mod midi;
mod routes;

use config::Config;

/// Shared application state passed to every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<EventDispatcher>,
}

#[tokio::main]
async fn main() {
    let config = Config::parse();
    init_logging(&config.log_level, &config.log_format);

    if config.list_ports {
        match midi::list_ports() {
            Ok(ports) if ports.is_empty() => println!("No MIDI output ports found"),
            Ok(ports) => ports.iter().enumerate().for_each(|(i, name)| println!("{i}: {name}")),
            Err(e) => {
                error!("failed to list MIDI ports: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(config).await {
        error!("{e:#}");
        process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    info!("tagfade-server v{}", env!("CARGO_PKG_VERSION"));

    let table = config.load_table()?;
    let sink = open_sink(&config)?;
    let dispatcher = EventDispatcher::with_options(
        Arc::new(table),
        sink,
        FadeSettings::default(),
        config.fade_scope(),
    );
    info!(scope = ?dispatcher.scope(), "Fade engine ready");

    let app = routes::router(AppState {
        dispatcher: Arc::new(dispatcher),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;
    info!("Listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("tagfade-server shutdown complete");
    Ok(())
}

fn open_sink(config: &Config) -> Result<Arc<dyn CcSink>> {
    if config.dry_run {
        info!("Dry run: CC writes are logged, not sent");
        return Ok(Arc::new(LogSink));
    }
    let sink = midi::MidiSink::connect(config.midi_port.as_deref())
        .context("Failed to open MIDI output (use --list-ports or --dry-run)")?;
    info!(port = %sink.port_name(), "MIDI output opened");
    Ok(Arc::new(sink))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    info!("received Ctrl+C, shutting down...");
}

/// Default directives when `RUST_LOG` is unset: our own crates log at the
/// requested level, the HTTP stack stays at `warn` so per-request noise does
/// not drown the fade log.
fn default_filter(level_str: &str) -> String {
    format!("warn,tagfade_core={level_str},tagfade_server={level_str}")
}

/// Install the tracing subscriber. `RUST_LOG` takes precedence over
/// `--log-level`; `--log-format json` switches to structured output.
fn init_logging(level_str: &str, format: &str) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(level_str)));

    if format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_level(true))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::EnvFilter;

    #[test]
    fn default_filter_scopes_level_to_our_crates() {
        let directives = default_filter("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("tagfade_core=debug"));
        assert!(directives.contains("tagfade_server=debug"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
