//! Load underwriting datasets from a file, a URL, or an already parsed value
//!
//! Loading is the only asynchronous boundary in the crate: it completes before
//! an engine is constructed and the engine itself never performs I/O.

use crate::error::LoadError;
use log::info;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

/// Default underwriting file looked up relative to the working directory
pub const DEFAULT_DATA_PATH: &str = "carrier_underwriting.json";

/// Where an underwriting dataset comes from
#[derive(Debug, Clone)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
    /// Already parsed, passed through unchanged
    Inline(Value),
}

impl DatasetSource {
    /// Classify a CLI/config string: `http(s)://` is a URL, anything else a path
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            DatasetSource::Url(arg.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(arg))
        }
    }

    /// Fetch and parse the raw dataset
    pub async fn load(self) -> Result<Value, LoadError> {
        match self {
            DatasetSource::Path(path) => load_dataset_from_path(path),
            DatasetSource::Url(url) => load_dataset_from_url(&url).await,
            DatasetSource::Inline(value) => Ok(value),
        }
    }
}

/// Load a dataset from a JSON file
pub fn load_dataset_from_path<P: AsRef<Path>>(path: P) -> Result<Value, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }
    let value = load_dataset_from_reader(BufReader::new(File::open(path)?))?;
    info!("Loaded underwriting data from {}", path.display());
    Ok(value)
}

/// Load a dataset from any reader (e.g., string buffer, network stream)
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Value, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_dataset_from_str(json: &str) -> Result<Value, LoadError> {
    Ok(serde_json::from_str(json)?)
}

/// Fetch a dataset over HTTP(S)
pub async fn load_dataset_from_url(url: &str) -> Result<Value, LoadError> {
    let response = reqwest::Client::new()
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        });
    }

    let value = response.json::<Value>().await?;
    info!("Loaded underwriting data from {}", url);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(DEFAULT_DATA_PATH)
    }

    #[test]
    fn test_load_fixture_dataset() {
        let value = load_dataset_from_path(fixture_path()).expect("Failed to load fixture");
        assert!(value.is_object());
        assert!(value["carriers"].as_array().map_or(false, |c| !c.is_empty()));
    }

    #[test]
    fn test_missing_file() {
        let err = load_dataset_from_path("does/not/exist.json").unwrap_err();
        assert!(matches!(err, LoadError::NotFound(_)));
        assert!(err.to_string().starts_with("Cannot find underwriting file"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(load_dataset_from_str("{ not json"), Err(LoadError::Json(_))));
        let value = load_dataset_from_reader("{\"carriers\": []}".as_bytes()).unwrap();
        assert!(value["carriers"].is_array());
    }

    #[test]
    fn test_source_classification() {
        assert!(matches!(DatasetSource::from_arg("https://example.com/data.json"), DatasetSource::Url(_)));
        assert!(matches!(DatasetSource::from_arg("./data.json"), DatasetSource::Path(_)));
    }

    #[tokio::test]
    async fn test_inline_source_passthrough() {
        let value = serde_json::json!({ "carriers": [] });
        let loaded = DatasetSource::Inline(value.clone()).load().await.unwrap();
        assert_eq!(loaded, value);
    }
}
