//! Immutable mapping of reply ids to reply bodies

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use super::ResponseError;

const BUILTIN_CATALOG: &str = include_str!("../../data/responses.json");

#[derive(Debug, Deserialize)]
struct CatalogFile {
    answers: BTreeMap<String, String>,
}

/// Canned replies, loaded once and never mutated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseCatalog {
    answers: BTreeMap<String, String>,
}

impl ResponseCatalog {
    /// Build a catalog from `(id, text)` pairs
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            answers: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse `{"answers": {"<id>": "<text>"}}`
    pub fn from_json_str(raw: &str) -> Result<Self, ResponseError> {
        let file: CatalogFile =
            serde_json::from_str(raw).map_err(|e| ResponseError::InvalidCatalog(e.to_string()))?;
        Ok(Self {
            answers: file.answers,
        })
    }

    /// Read a catalog file
    pub async fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ResponseError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            ResponseError::InvalidCatalog(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw)
    }

    /// The catalog bundled with the crate
    pub fn builtin() -> Self {
        // The bundled file is covered by a unit test
        Self::from_json_str(BUILTIN_CATALOG).unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.answers.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.answers.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Whether `text` is one of the reply bodies
    pub fn contains_reply(&self, text: &str) -> bool {
        self.answers.values().any(|v| v == text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_parses() {
        let parsed = ResponseCatalog::from_json_str(BUILTIN_CATALOG).unwrap();
        assert!(!parsed.is_empty());
        assert_eq!(parsed, ResponseCatalog::builtin());
    }

    #[test]
    fn test_keys_and_get() {
        let catalog = ResponseCatalog::from_json_str(
            r#"{"answers": {"1": "Salut", "2": "Ça va ?"}}"#,
        )
        .unwrap();

        assert_eq!(catalog.keys().collect::<Vec<_>>(), vec!["1", "2"]);
        assert_eq!(catalog.get("2"), Some("Ça va ?"));
        assert_eq!(catalog.get("3"), None);
        assert!(catalog.contains_reply("Salut"));
    }

    #[tokio::test]
    async fn test_invalid_catalog() {
        let err = ResponseCatalog::from_json_str(r#"{"replies": []}"#).unwrap_err();
        assert!(matches!(err, ResponseError::InvalidCatalog(_)));

        let err = ResponseCatalog::from_path("/definitely/not/here.json")
            .await
            .unwrap_err();
        assert!(matches!(err, ResponseError::InvalidCatalog(_)));
    }

    #[tokio::test]
    async fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("answers.json");
        std::fs::write(&path, r#"{"answers": {"1": "Coucou"}}"#).unwrap();

        let catalog = ResponseCatalog::from_path(&path).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("1"), Some("Coucou"));
    }
}
