//! Server configuration from command-line flags and `TAGFADE_*` variables.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use tagfade_core::{FadeScope, StaticLookup};

/// Default HTTP bind address; readers post to port 3000.
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

/// NFC reader events in, fading MIDI control changes out.
#[derive(Parser, Debug, Clone)]
#[command(name = "tagfade-server", version, about = "NFC tag presence to fading MIDI CC")]
pub struct Config {
    /// HTTP bind address
    #[arg(long, env = "TAGFADE_BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// MIDI output port (case-insensitive substring of the port name).
    /// Defaults to the first available port.
    #[arg(long, env = "TAGFADE_MIDI_PORT")]
    pub midi_port: Option<String>,

    /// Print available MIDI output ports and exit
    #[arg(long)]
    pub list_ports: bool,

    /// Log CC writes instead of opening a MIDI port
    #[arg(long, env = "TAGFADE_DRY_RUN")]
    pub dry_run: bool,

    /// Lookup table file (TOML, JSON or YAML)
    #[arg(long, env = "TAGFADE_TABLE")]
    pub table: Option<PathBuf>,

    /// Share one fade per raw tag id across readers
    #[arg(long, env = "TAGFADE_SHARED_TAG_FADES")]
    pub shared_tag_fades: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TAGFADE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Log output format ("text" or "json")
    #[arg(long, env = "TAGFADE_LOG_FORMAT", default_value = "text")]
    pub log_format: String,
}

impl Config {
    pub fn fade_scope(&self) -> FadeScope {
        if self.shared_tag_fades {
            FadeScope::SharedTag
        } else {
            FadeScope::PerReader
        }
    }

    /// Table file to load: `--table`, else `tagfade/table.toml` in the user
    /// config directory when present.
    pub fn table_path(&self) -> Option<PathBuf> {
        self.table.clone().or_else(|| {
            dirs::config_dir()
                .map(|dir| dir.join("tagfade").join("table.toml"))
                .filter(|path| path.is_file())
        })
    }

    /// Load the lookup table, falling back to the built-in wiring.
    pub fn load_table(&self) -> Result<StaticLookup> {
        match self.table_path() {
            Some(path) => {
                let table = StaticLookup::load(&path).with_context(|| {
                    format!("Failed to load lookup table {}", path.display())
                })?;
                info!(path = %path.display(), mappings = table.len(), "Lookup table loaded");
                Ok(table)
            }
            None => {
                let table = StaticLookup::default_table();
                info!(mappings = table.len(), "Using built-in lookup table");
                Ok(table)
            }
        }
    }
}
