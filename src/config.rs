use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::constants;
use crate::error::{IndexerError, Result};
use crate::types::SpanSchema;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub destination: DestinationConfig,
    pub ingest: IngestConfig,
}

/// Address of the destination search service.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DestinationConfig {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            scheme: "http".to_string(),
            host: "localhost".to_string(),
            port: 9200,
        }
    }
}

impl DestinationConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// Ingestion settings: where the dataset dumps live, how large a bulk
/// submission may grow, and which title-span schema variant to decode.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub data_dir: PathBuf,
    pub batch_size: usize,
    pub title_span: SpanSchema,
    pub name_basics: String,
    pub title_basics: String,
    pub title_principals: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            batch_size: 10_000,
            title_span: SpanSchema::default(),
            name_basics: constants::NAME_BASICS_FILE.to_string(),
            title_basics: constants::TITLE_BASICS_FILE.to_string(),
            title_principals: constants::TITLE_PRINCIPALS_FILE.to_string(),
        }
    }
}

impl IngestConfig {
    pub fn name_basics_path(&self) -> PathBuf {
        self.data_dir.join(&self.name_basics)
    }

    pub fn title_basics_path(&self) -> PathBuf {
        self.data_dir.join(&self.title_basics)
    }

    pub fn title_principals_path(&self) -> PathBuf {
        self.data_dir.join(&self.title_principals)
    }
}

impl Config {
    /// Load configuration. An explicitly named file must exist; the implicit
    /// default `config.toml` falls back to built-in defaults when absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new("config.toml");
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IndexerError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_destination_and_dump_conventions() {
        let config = Config::default();
        assert_eq!(config.destination.base_url(), "http://localhost:9200");
        assert_eq!(config.ingest.batch_size, 10_000);
        assert_eq!(config.ingest.title_span, SpanSchema::Years);
        assert_eq!(
            config.ingest.title_basics_path(),
            PathBuf::from("./title.basics.tsv.gz")
        );
    }

    #[test]
    fn partial_toml_overrides_only_what_it_names() {
        let config: Config = toml::from_str(
            r#"
            [destination]
            host = "search.internal"

            [ingest]
            batch_size = 500
            title_span = "dates"
            "#,
        )
        .unwrap();

        assert_eq!(config.destination.host, "search.internal");
        assert_eq!(config.destination.port, 9200);
        assert_eq!(config.ingest.batch_size, 500);
        assert_eq!(config.ingest.title_span, SpanSchema::Dates);
        assert_eq!(config.ingest.name_basics, "name.basics.tsv.gz");
    }
}
