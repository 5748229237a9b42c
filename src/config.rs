use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://opendart.fss.or.kr/api";

/// Runtime settings for talking to OpenDart.
///
/// Fields are public so tests can build a `Config` pointing at a scratch
/// directory without touching the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenDart API key, sent as the `crtfc_key` query parameter.
    pub api_key: String,
    /// Endpoint root, no trailing slash required.
    pub base_url: String,
    /// Where the downloaded ZIP, extracted XML and CSV cache live.
    pub data_dir: PathBuf,
}

impl Config {
    /// Read configuration from `OPENDART_API_KEY`, `OPENDART_BASE_URL`
    /// and `OPENDART_DATA_DIR`. The binary loads `.env` first via
    /// dotenvy; the library only looks at the environment.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENDART_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config("OPENDART_API_KEY is not set; see .env.example".into())
            })?;
        let base_url =
            env::var("OPENDART_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let data_dir = env::var("OPENDART_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        Ok(Self {
            api_key,
            base_url,
            data_dir,
        })
    }

    /// Downloaded archive path.
    pub fn corp_index_zip(&self) -> PathBuf {
        self.data_dir.join("corp_code.zip")
    }

    /// Extracted XML index path.
    pub fn corp_index_xml(&self) -> PathBuf {
        self.data_dir.join(crate::extract::CORP_INDEX_ENTRY)
    }

    /// CSV cache path, the read-through artifact.
    pub fn corp_index_csv(&self) -> PathBuf {
        self.data_dir.join("corp_code.csv")
    }
}
