//! Peer declaration file loading
//!
//! A peer file describes how the far side of the boundary declares our
//! records, plus the comparison settings to check them with. TOML is the
//! default format; files ending in `.json` are read as JSON.

use anyhow::{bail, Context, Result};
use interop_records::{CompareConfig, PeerRecord};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Contents of a peer declaration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PeerFile {
    #[serde(default)]
    pub compare: CompareConfig,
    pub records: Vec<PeerRecord>,
}

/// Load a peer declaration file
pub fn load_peer_file(path: &Path) -> Result<PeerFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read peer file: {:?}", path))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let file: PeerFile = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse peer file as JSON: {:?}", path))?
    } else {
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse peer file: {:?}", path))?
    };

    if file.records.is_empty() {
        bail!("Peer file declares no records: {:?}", path);
    }

    log::debug!("Loaded {} peer record(s) from {:?}", file.records.len(), path);
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_records::ScalarKind;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    const PEER_TOML: &str = r#"
        [compare]
        match_field_names = true

        [[records]]
        name = "PythonColor"
        record = "Color"
        fields = [
            { name = "r", kind = "f32" },
            { name = "g", kind = "f32", offset = 4 },
            { name = "b", kind = "f32" },
            { name = "a", kind = "f32" },
        ]

        [[records]]
        name = "Point"
        fields = [
            { name = "x", kind = "f64" },
            { name = "y", kind = "f64" },
        ]
    "#;

    #[test]
    fn test_peer_file_deserialization() {
        let file: PeerFile = toml::from_str(PEER_TOML).unwrap();
        assert!(file.compare.match_field_names);
        assert!(file.compare.check_record_size);
        assert_eq!(file.records.len(), 2);
        assert_eq!(file.records[0].binds_to(), "Color");
        assert_eq!(file.records[0].fields[1].offset, Some(4));
        assert_eq!(file.records[1].fields[0].kind, ScalarKind::F64);
    }

    #[test]
    fn test_load_toml_file() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(PEER_TOML.as_bytes()).unwrap();

        let file = load_peer_file(tmp.path()).unwrap();
        assert_eq!(file.records[1].name, "Point");
    }

    #[test]
    fn test_load_json_file() {
        let mut tmp = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            tmp,
            r#"{{"records": [{{"name": "Point", "fields": [
                {{"name": "x", "kind": "f32"}},
                {{"name": "y", "kind": "f32"}}
            ]}}]}}"#
        )
        .unwrap();

        let file = load_peer_file(tmp.path()).unwrap();
        assert_eq!(file.compare, CompareConfig::default());
        assert_eq!(file.records[0].fields.len(), 2);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(
            br#"
            [[records]]
            name = "Point"
            fields = [{ name = "x", kind = "float" }]
            "#,
        )
        .unwrap();

        assert!(load_peer_file(tmp.path()).is_err());
    }

    #[test]
    fn test_empty_and_missing_files() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"records = []\n").unwrap();
        assert!(load_peer_file(tmp.path()).is_err());

        assert!(load_peer_file(Path::new("does/not/exist.toml")).is_err());
    }
}
