//! Initial content loading.

use std::path::Path;

use folio_core::StorePath;
use serde_json::Value;
use tracing::info;

use crate::error::StoreError;
use crate::store::RemoteStore;

/// Formats accepted for seed files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Json,
    Yaml,
}

impl SeedFormat {
    /// Detects the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yml" | "yaml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// Parses seed content in the given format.
pub fn parse_seed(content: &str, format: SeedFormat, origin: &Path) -> Result<Value, StoreError> {
    match format {
        SeedFormat::Json => {
            serde_json::from_str(content).map_err(|e| StoreError::parse(origin, e.to_string()))
        },
        SeedFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| StoreError::parse(origin, e.to_string()))
        },
    }
}

/// Reads and parses a seed file.
pub fn load_seed(path: &Path) -> Result<Value, StoreError> {
    let format = SeedFormat::from_path(path)
        .ok_or_else(|| StoreError::parse(path, "expected a .json, .yml or .yaml file"))?;
    let content = std::fs::read_to_string(path)?;
    parse_seed(&content, format, path)
}

/// Writes `value` at `target` only when nothing is stored there.
///
/// Returns true if the seed was written.
pub async fn seed_if_empty(
    store: &dyn RemoteStore,
    target: &StorePath,
    value: Value,
) -> Result<bool, StoreError> {
    if store.read(target).await?.is_some() {
        info!(path = %target, "Seed skipped, data already present");
        return Ok(false);
    }
    store.write(target, value).await?;
    info!(path = %target, "Seed data written");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_format_detection() {
        assert_eq!(SeedFormat::from_path(Path::new("site.json")), Some(SeedFormat::Json));
        assert_eq!(SeedFormat::from_path(Path::new("site.YML")), Some(SeedFormat::Yaml));
        assert_eq!(SeedFormat::from_path(Path::new("site.toml")), None);
    }

    #[test]
    fn test_load_yaml_seed() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        writeln!(file, "hero:\n  title: Folio\nservices:\n  - id: 1\n    title: SEO").unwrap();

        let value = load_seed(file.path()).unwrap();
        assert_eq!(value["hero"]["title"], "Folio");
        assert_eq!(value["services"][0]["id"], 1);
    }

    #[test]
    fn test_load_invalid_json_seed() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = load_seed(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let store = MemoryStore::new("memory");
        let website = StorePath::parse("website").unwrap();

        assert!(seed_if_empty(&store, &website, json!({"hero": {"title": "A"}})).await.unwrap());
        assert!(!seed_if_empty(&store, &website, json!({"hero": {"title": "B"}})).await.unwrap());
        assert_eq!(
            store.read(&website).await.unwrap(),
            Some(json!({"hero": {"title": "A"}}))
        );
    }
}
