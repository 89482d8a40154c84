//! Merging derived endpoints into the user's base Gatus configuration.
//!
//! The base document is read fresh on every write so that edits to it
//! are picked up on the next detected change.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{GeneratorError, Result};
use crate::types::Endpoint;

const ENDPOINTS_KEY: &str = "endpoints";

/// Reads the base document.  An empty file counts as an empty mapping.
pub fn load_base_config(path: &Path) -> Result<Mapping> {
    let content = fs::read_to_string(path).map_err(|source| GeneratorError::ReadBase {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value =
        serde_yaml::from_str(&content).map_err(|source| GeneratorError::ParseBase {
            path: path.to_path_buf(),
            source,
        })?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        _ => Err(GeneratorError::BaseNotMapping {
            path: path.to_path_buf(),
        }),
    }
}

/// Appends `endpoints` to an existing `endpoints` list, or replaces
/// whatever else sits under that key.
pub fn merge_endpoints(mut base: Mapping, endpoints: &[Endpoint]) -> Result<Mapping> {
    let derived = endpoints
        .iter()
        .map(serde_yaml::to_value)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    if let Some(Value::Sequence(existing)) = base.get_mut(ENDPOINTS_KEY) {
        existing.extend(derived);
    } else {
        base.insert(Value::from(ENDPOINTS_KEY), Value::Sequence(derived));
    }
    Ok(base)
}

pub fn write_generated_config(path: &Path, document: &Mapping) -> Result<()> {
    let yaml = serde_yaml::to_string(document)?;
    fs::write(path, yaml).map_err(|source| GeneratorError::WriteGenerated {
        path: path.to_path_buf(),
        source,
    })
}

/// Full merge step of a reconciliation cycle: read, merge, write.
pub fn generate(base_path: &Path, generated_path: &Path, endpoints: &[Endpoint]) -> Result<()> {
    let base = load_base_config(base_path)?;
    let merged = merge_endpoints(base, endpoints)?;
    write_generated_config(generated_path, &merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn endpoint(name: &str) -> Endpoint {
        Endpoint {
            name: name.into(),
            url: format!("icmp://{}", name),
            conditions: vec!["[CONNECTED] == true".into()],
            ..Default::default()
        }
    }

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn empty_merge_keeps_existing_list() {
        let base = mapping("endpoints:\n  - name: static\n    url: https://example.com\n");
        let merged = merge_endpoints(base.clone(), &[]).unwrap();
        assert_eq!(merged, base);
    }

    #[test]
    fn empty_merge_into_missing_key_creates_empty_list() {
        let merged = merge_endpoints(mapping("web:\n  port: 8080\n"), &[]).unwrap();
        assert_eq!(merged[ENDPOINTS_KEY], Value::Sequence(vec![]));
        assert_eq!(merged["web"]["port"], 8080);
    }

    #[test]
    fn appends_after_static_endpoints() {
        let base = mapping("endpoints:\n  - name: static\n");
        let merged = merge_endpoints(base, &[endpoint("db"), endpoint("cache")]).unwrap();
        let list = merged[ENDPOINTS_KEY].as_sequence().unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0]["name"], "static");
        assert_eq!(list[1]["name"], "db");
        assert_eq!(list[2]["name"], "cache");
    }

    #[test]
    fn non_list_endpoints_are_replaced() {
        for yaml in ["endpoints:\n", "endpoints: 3\n", "endpoints:\n  a: b\n"] {
            let merged = merge_endpoints(mapping(yaml), &[endpoint("db")]).unwrap();
            let list = merged[ENDPOINTS_KEY].as_sequence().unwrap();
            assert_eq!(list.len(), 1, "base: {}", yaml);
            assert_eq!(list[0]["url"], "icmp://db");
        }
    }

    #[test]
    fn load_treats_empty_file_as_empty_mapping() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_base_config(file.path()).unwrap().is_empty());
    }

    #[test]
    fn load_rejects_scalar_document() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "just a string").unwrap();
        assert!(matches!(
            load_base_config(file.path()),
            Err(GeneratorError::BaseNotMapping { .. })
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.yml");
        let err = load_base_config(&missing).unwrap_err();
        assert!(matches!(err, GeneratorError::ReadBase { .. }));
        assert!(err.to_string().contains("nope.yml"));
    }

    #[test]
    fn generate_writes_merged_document() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("gatus_config.yml");
        let generated = dir.path().join("gatus_config_generated.yml");
        fs::write(&base, "storage:\n  type: memory\nendpoints: []\n").unwrap();

        generate(&base, &generated, &[endpoint("db")]).unwrap();

        let written: Value =
            serde_yaml::from_str(&fs::read_to_string(&generated).unwrap()).unwrap();
        assert_eq!(written["storage"]["type"], "memory");
        assert_eq!(written["endpoints"][0]["name"], "db");
        assert_eq!(written["endpoints"][0]["conditions"][0], "[CONNECTED] == true");
    }

    #[test]
    fn generate_fails_when_target_is_unwritable() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("base.yml");
        fs::write(&base, "endpoints: []\n").unwrap();
        let generated = dir.path().join("missing-dir").join("out.yml");

        let err = generate(&base, &generated, &[]).unwrap_err();
        assert!(matches!(err, GeneratorError::WriteGenerated { .. }));
    }
}
