// src/fetch.rs
use std::path::{Path, PathBuf};

use reqwest::Client;
use tokio::fs;
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{Error, Result};

/// Vendor endpoint serving the full corp-code index as a ZIP body.
pub const CORP_INDEX_ENDPOINT: &str = "corpCode.xml";

/// Build `{base}/{endpoint}` with the API key and extra query
/// parameters attached. The key never appears in logs.
pub(crate) fn endpoint_url(cfg: &Config, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
    let raw = format!("{}/{}", cfg.base_url.trim_end_matches('/'), endpoint);
    let mut url = Url::parse(&raw)
        .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", cfg.base_url)))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("crtfc_key", &cfg.api_key);
        for (k, v) in params {
            query.append_pair(k, v);
        }
    }
    Ok(url)
}

/// Download the corp-code index archive and save it at `dest`, creating
/// parent directories as needed. Returns the path written.
///
/// One attempt only; a transport failure or non-success status surfaces
/// as `Error::Network` and the caller decides whether to try again.
pub async fn download_corp_index(client: &Client, cfg: &Config, dest: &Path) -> Result<PathBuf> {
    let url = endpoint_url(cfg, CORP_INDEX_ENDPOINT, &[])?;
    debug!(endpoint = CORP_INDEX_ENDPOINT, "downloading corp index");

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).await?;
    }

    let resp = client.get(url).send().await?.error_for_status()?;
    let bytes = resp.bytes().await?;
    fs::write(dest, &bytes).await?;

    info!(bytes = bytes.len(), dest = %dest.display(), "corp index downloaded");
    Ok(dest.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cfg(base: &str) -> Config {
        Config {
            api_key: "secret-key".into(),
            base_url: base.into(),
            data_dir: PathBuf::from("data"),
        }
    }

    #[test]
    fn url_carries_key_and_params() {
        let url = endpoint_url(
            &cfg("https://opendart.fss.or.kr/api"),
            "company.json",
            &[("corp_code", "00126380")],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://opendart.fss.or.kr/api/company.json?crtfc_key=secret-key&corp_code=00126380"
        );
    }

    #[test]
    fn trailing_slash_on_base_is_tolerated() {
        let url = endpoint_url(
            &cfg("https://opendart.fss.or.kr/api/"),
            CORP_INDEX_ENDPOINT,
            &[],
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "https://opendart.fss.or.kr/api/corpCode.xml?crtfc_key=secret-key"
        );
    }

    #[test]
    fn bad_base_url_is_a_config_error() {
        let err = endpoint_url(&cfg("not a url"), CORP_INDEX_ENDPOINT, &[]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
