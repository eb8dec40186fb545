use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use tracing::warn;

use crate::types::VariantCount;
use crate::{Error, Result};

/// Env vars consulted for the API key, in order.
pub const API_KEY_VARS: &[&str] = &["GOOGLE_API_KEY", "GEMINI_API_KEY"];

/// Layered lookup: a parsed `.env` file first, then the process
/// environment. Blank values are treated as unset.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub dotenv: BTreeMap<String, String>,
}

impl Env {
    pub fn parse_dotenv(contents: &str) -> Self {
        Self {
            dotenv: parse_dotenv(contents),
        }
    }

    /// Reads `<dir>/.env` when present; a missing file just leaves the
    /// dotenv layer empty, any other read error is logged and skipped.
    pub async fn load(dir: &Path) -> Self {
        let path = dir.join(".env");
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Self::parse_dotenv(&contents),
            Err(err) if err.kind() == ErrorKind::NotFound => Self::default(),
            Err(err) => {
                warn!("could not read {} ({err}); ignoring it", path.display());
                Self::default()
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = self.dotenv.get(key) {
            return Some(value.clone());
        }
        std::env::var(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }

    /// Fatal configuration check: resolves the provider API key before
    /// any network activity.
    pub fn resolve_api_key(&self) -> Result<String> {
        for key in API_KEY_VARS {
            if let Some(value) = self.get(key) {
                return Ok(value);
            }
        }
        Err(Error::MissingApiKey(API_KEY_VARS.join(", ")))
    }
}

pub fn parse_dotenv(contents: &str) -> BTreeMap<String, String> {
    let mut out = BTreeMap::<String, String>::new();

    for raw_line in contents.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line).trim();
        let Some((raw_key, raw_value)) = line.split_once('=') else {
            continue;
        };
        let key = raw_key.trim();
        if key.is_empty() {
            continue;
        }

        let mut value = raw_value.trim().to_string();
        if let Some(stripped) = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        {
            value = stripped.to_string();
        }

        if value.trim().is_empty() {
            continue;
        }

        out.insert(key.to_string(), value);
    }

    out
}

/// Selection contract: a requested model is only accepted when it is an
/// element of the resolved catalog.
pub fn select_model(catalog: &[String], requested: &str) -> Result<String> {
    if catalog.iter().any(|m| m == requested) {
        Ok(requested.to_string())
    } else {
        Err(Error::UnknownModel(requested.to_string()))
    }
}

/// Supplies the three run inputs ahead of any generation call. Both an
/// interactive implementation (terminal prompts) and a non-interactive
/// one (flags) satisfy it; the selected model must be an element of
/// `catalog`, and the variant count is constrained by its type.
pub trait ConfigSource {
    fn select_model(&mut self, catalog: &[String]) -> Result<String>;

    fn variant_count(&mut self) -> Result<VariantCount>;

    /// Last gate before any network generation call; `false` aborts
    /// with no side effects.
    fn confirm(
        &mut self,
        model: &str,
        prompt_count: usize,
        variant_count: VariantCount,
    ) -> Result<bool>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotenv_basic() {
        let parsed = parse_dotenv(
            r#"
# comment
export GOOGLE_API_KEY="key-test"
FOO=bar
EMPTY=
"#,
        );
        assert_eq!(
            parsed.get("GOOGLE_API_KEY").map(String::as_str),
            Some("key-test")
        );
        assert_eq!(parsed.get("FOO").map(String::as_str), Some("bar"));
        assert_eq!(parsed.get("EMPTY"), None);
    }

    #[test]
    fn dotenv_layer_takes_precedence() {
        let env = Env::parse_dotenv("GOOGLE_API_KEY=from-dotenv");
        assert_eq!(env.resolve_api_key().ok().as_deref(), Some("from-dotenv"));
    }

    #[test]
    fn missing_api_key_names_the_vars_tried() {
        let env = Env::default();
        if env.get("GOOGLE_API_KEY").is_some() || env.get("GEMINI_API_KEY").is_some() {
            // Host environment already carries a key; nothing to assert.
            return;
        }
        match env.resolve_api_key() {
            Err(Error::MissingApiKey(tried)) => {
                assert!(tried.contains("GOOGLE_API_KEY"));
                assert!(tried.contains("GEMINI_API_KEY"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn load_reads_dotenv_next_to_the_working_dir() -> Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join(".env"), "GOOGLE_API_KEY=from-file").await?;
        let env = Env::load(dir.path()).await;
        assert_eq!(
            env.dotenv.get("GOOGLE_API_KEY").map(String::as_str),
            Some("from-file")
        );
        Ok(())
    }

    #[tokio::test]
    async fn load_tolerates_missing_and_unreadable_dotenv() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert!(Env::load(dir.path()).await.dotenv.is_empty());

        // A directory named `.env` exists but cannot be read as a file.
        tokio::fs::create_dir(dir.path().join(".env")).await?;
        assert!(Env::load(dir.path()).await.dotenv.is_empty());
        Ok(())
    }

    #[test]
    fn select_model_requires_catalog_membership() {
        let catalog = vec!["imagen-3.0-generate-001".to_string()];
        assert!(select_model(&catalog, "imagen-3.0-generate-001").is_ok());
        match select_model(&catalog, "imagen-9000") {
            Err(Error::UnknownModel(name)) => assert_eq!(name, "imagen-9000"),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
