//! Static reader → tag → CC wiring.
//!
//! Tag ids are stored and matched in their canonical form
//! ([`TagId::canonical`]), so lookups ignore case.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{CC_MAX, DEFAULT_TABLE};
use crate::error::LookupError;
use crate::traits::LookupTable;
use crate::types::{ReaderId, TagId};

/// On-disk shape of a lookup table file.
///
/// ```toml
/// [readers.1]
/// "04:94:6a:5a:a3:11:90" = 21
/// ```
#[derive(Deserialize, Debug, Default)]
pub struct TableDocument {
    #[serde(default)]
    pub readers: BTreeMap<String, BTreeMap<String, u32>>,
}

/// Immutable lookup table held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticLookup {
    readers: BTreeMap<ReaderId, BTreeMap<TagId, u8>>,
}

impl StaticLookup {
    /// The installation's built-in wiring.
    pub fn default_table() -> Self {
        let mut readers: BTreeMap<ReaderId, BTreeMap<TagId, u8>> = BTreeMap::new();
        for (reader, tag, cc) in DEFAULT_TABLE {
            readers
                .entry(ReaderId::from(*reader))
                .or_default()
                .insert(TagId::canonical(tag), *cc);
        }
        Self { readers }
    }

    /// Build a table, validating ids and CC range.
    pub fn from_document(doc: TableDocument) -> Result<Self, LookupError> {
        let mut readers = BTreeMap::new();
        for (reader, tags) in doc.readers {
            let reader = reader.trim().to_string();
            if reader.is_empty() {
                return Err(LookupError::EmptyReader);
            }
            let mut mapped = BTreeMap::new();
            for (tag, cc) in tags {
                if tag.trim().is_empty() {
                    return Err(LookupError::EmptyTag(reader));
                }
                if cc > u32::from(CC_MAX) {
                    return Err(LookupError::CcOutOfRange { reader, tag, cc });
                }
                mapped.insert(TagId::canonical(&tag), cc as u8);
            }
            readers.insert(ReaderId(reader), mapped);
        }
        Ok(Self { readers })
    }

    /// Load a table file (TOML, JSON or YAML, chosen by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LookupError> {
        let doc: TableDocument = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| LookupError::Load(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Number of `(reader, tag)` mappings.
    pub fn len(&self) -> usize {
        self.readers.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LookupTable for StaticLookup {
    fn resolve(&self, reader: &ReaderId, tag: &TagId) -> Option<u8> {
        self.readers.get(reader)?.get(&TagId::canonical(tag.as_str())).copied()
    }

    fn readers(&self) -> Vec<ReaderId> {
        self.readers.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn doc(entries: &[(&str, &str, u32)]) -> TableDocument {
        let mut doc = TableDocument::default();
        for (r, t, cc) in entries {
            doc.readers
                .entry(r.to_string())
                .or_default()
                .insert(t.to_string(), *cc);
        }
        doc
    }

    #[test]
    fn default_table_resolves_per_reader() {
        let table = StaticLookup::default_table();
        let tag = TagId::from("04:94:6a:5a:a3:11:90");
        assert_eq!(table.resolve(&"1".into(), &tag), Some(21));
        assert_eq!(table.resolve(&"2".into(), &tag), Some(23));
        assert_eq!(table.len(), 6);
    }

    #[test]
    fn unknown_reader_or_tag_is_none() {
        let table = StaticLookup::default_table();
        assert_eq!(table.resolve(&"9".into(), &"04:94:6a:5a:a3:11:90".into()), None);
        assert_eq!(table.resolve(&"1".into(), &"ff:ff".into()), None);
    }

    #[test]
    fn tag_match_ignores_case() {
        let table = StaticLookup::default_table();
        assert_eq!(table.resolve(&"1".into(), &"04:8D:6A:5A:A3:11:90".into()), Some(22));
    }

    #[test]
    fn readers_are_listed_in_order() {
        let table = StaticLookup::default_table();
        assert_eq!(table.readers(), vec![ReaderId::from("1"), ReaderId::from("2")]);
    }

    #[test]
    fn rejects_cc_above_127() {
        let err = StaticLookup::from_document(doc(&[("1", "a", 128)])).unwrap_err();
        assert!(matches!(err, LookupError::CcOutOfRange { cc: 128, .. }));
    }

    #[test]
    fn rejects_empty_ids() {
        assert_eq!(
            StaticLookup::from_document(doc(&[(" ", "a", 1)])).unwrap_err(),
            LookupError::EmptyReader
        );
        assert_eq!(
            StaticLookup::from_document(doc(&[("1", "", 1)])).unwrap_err(),
            LookupError::EmptyTag("1".into())
        );
    }

    #[test]
    fn empty_document_is_empty_table() {
        let table = StaticLookup::from_document(TableDocument::default()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn loads_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[readers.1]\n\"aa:bb\" = 30\n\n[readers.2]\n\"aa:bb\" = 31\n\"cc:dd\" = 32"
        )
        .unwrap();

        let table = StaticLookup::load(file.path()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.resolve(&"1".into(), &"aa:bb".into()), Some(30));
        assert_eq!(table.resolve(&"2".into(), &"cc:dd".into()), Some(32));
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"readers": {{"7": {{"ee:ff": 5}}}}}}"#).unwrap();

        let table = StaticLookup::load(file.path()).unwrap();
        assert_eq!(table.resolve(&"7".into(), &"ee:ff".into()), Some(5));
    }

    #[test]
    fn missing_file_is_load_error() {
        let err = StaticLookup::load("/nonexistent/tagfade-table.toml").unwrap_err();
        assert!(matches!(err, LookupError::Load(_)));
    }
}
