// src/lookup.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::table::{CorpRecord, CorpTable};
use crate::{extract, fetch, parse, store};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Process-wide cache state for the corp table.
enum CacheState {
    Empty,
    Loading,
    Ready(Arc<CorpTable>),
}

/// Read-through lookup over the vendor's corp-code index.
///
/// The first `list_all` loads the on-disk CSV artifact if one exists,
/// otherwise it runs the fetch→extract→parse→save chain exactly once
/// and leaves the artifact behind for future runs. The in-memory table
/// then serves every later call for the process lifetime.
///
/// The cache mutex is held across the whole refresh, so a caller that
/// arrives while a refresh is in flight blocks until it finishes and
/// then sees the ready table; a second fetch can never start. A failed
/// refresh resets the state to empty, making the next call retry from
/// scratch.
pub struct CorpDirectory {
    client: Client,
    cfg: Config,
    cache: Mutex<CacheState>,
    fetches: AtomicU64,
}

impl CorpDirectory {
    /// Build a directory with its own HTTP client. The client carries a
    /// bounded request timeout so a stalled vendor cannot wedge the
    /// cache in `Loading` forever.
    pub fn new(cfg: Config) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(cfg, client))
    }

    /// Build a directory around an existing client.
    pub fn with_client(cfg: Config, client: Client) -> Self {
        Self {
            client,
            cfg,
            cache: Mutex::new(CacheState::Empty),
            fetches: AtomicU64::new(0),
        }
    }

    /// The full corp table, cached for the process lifetime.
    pub async fn list_all(&self) -> Result<Arc<CorpTable>> {
        let mut state = self.cache.lock().await;
        if let CacheState::Ready(table) = &*state {
            return Ok(Arc::clone(table));
        }

        *state = CacheState::Loading;
        match self.refresh().await {
            Ok(table) => {
                let table = Arc::new(table);
                *state = CacheState::Ready(Arc::clone(&table));
                Ok(table)
            }
            Err(e) => {
                *state = CacheState::Empty;
                Err(e)
            }
        }
    }

    async fn refresh(&self) -> Result<CorpTable> {
        let csv_path = self.cfg.corp_index_csv();
        if csv_path.is_file() {
            debug!(path = %csv_path.display(), "reusing cached corp table");
            return store::load(&csv_path);
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let zip_path = fetch::download_corp_index(
            &self.client,
            &self.cfg,
            &self.cfg.corp_index_zip(),
        )
        .await?;
        let xml_path = extract::extract_corp_index(&zip_path, &self.cfg.data_dir)?;
        let table = parse::parse_corp_index(&xml_path)?;
        store::save(&table, &csv_path)?;
        info!(records = table.len(), "corp table refreshed from vendor");
        Ok(table)
    }

    /// Case-insensitive substring search over company names, in table
    /// order. An empty query returns the whole table.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<CorpRecord>> {
        let table = self.list_all().await?;
        Ok(table.search_by_name(query).into_iter().cloned().collect())
    }

    /// Exact lookup by corp code.
    pub async fn get_by_code(&self, corp_code: &str) -> Result<CorpRecord> {
        let table = self.list_all().await?;
        table
            .get_by_code(corp_code)
            .cloned()
            .ok_or_else(|| Error::NotFound(corp_code.to_string()))
    }

    /// How many times this instance has gone to the network. Lets tests
    /// prove the artifact short-circuits the fetch.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::sample_table;
    use std::path::Path;
    use tempfile::tempdir;

    // Nothing listens on the discard port, so any accidental fetch
    // fails fast instead of leaving the test hanging.
    fn directory(data_dir: &Path) -> CorpDirectory {
        let cfg = Config {
            api_key: "test-key".into(),
            base_url: "http://127.0.0.1:9".into(),
            data_dir: data_dir.to_path_buf(),
        };
        CorpDirectory::new(cfg).unwrap()
    }

    fn seed_artifact(data_dir: &Path) {
        store::save(&sample_table(), &data_dir.join("corp_code.csv")).unwrap();
    }

    #[tokio::test]
    async fn cached_artifact_short_circuits_the_network() {
        let dir = tempdir().unwrap();
        seed_artifact(dir.path());
        let directory = directory(dir.path());

        let first = directory.list_all().await.unwrap();
        let second = directory.list_all().await.unwrap();
        assert_eq!(*first, sample_table());
        assert_eq!(first, second);
        assert_eq!(directory.fetch_count(), 0);
    }

    #[tokio::test]
    async fn search_and_get_scenarios() {
        let dir = tempdir().unwrap();
        seed_artifact(dir.path());
        let directory = directory(dir.path());

        let hits = directory.search_by_name("Samsung").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].corp_code, "00126380");

        let hynix = directory.get_by_code("00164779").await.unwrap();
        assert_eq!(hynix.corp_name, "SK Hynix");

        let err = directory.get_by_code("99999999").await.unwrap_err();
        assert!(matches!(err, Error::NotFound(code) if code == "99999999"));
    }

    #[tokio::test]
    async fn empty_query_returns_everything() {
        let dir = tempdir().unwrap();
        seed_artifact(dir.path());
        let directory = directory(dir.path());

        let all = directory.search_by_name("").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].corp_code, "00126380");
        assert_eq!(all[1].corp_code, "00164779");
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_load() {
        let dir = tempdir().unwrap();
        seed_artifact(dir.path());
        let directory = Arc::new(directory(dir.path()));

        let a = tokio::spawn({
            let d = Arc::clone(&directory);
            async move { d.list_all().await }
        });
        let b = tokio::spawn({
            let d = Arc::clone(&directory);
            async move { d.list_all().await }
        });

        let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());
        assert_eq!(a, b);
        assert_eq!(directory.fetch_count(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_resets_to_empty_and_retries() {
        let dir = tempdir().unwrap();
        // No artifact, unreachable vendor: every call should attempt
        // one fetch, fail, and leave the cache retryable.
        let directory = directory(dir.path());

        assert!(directory.list_all().await.is_err());
        assert_eq!(directory.fetch_count(), 1);
        assert!(directory.list_all().await.is_err());
        assert_eq!(directory.fetch_count(), 2);
    }

    #[tokio::test]
    async fn corrupt_artifact_surfaces_as_format_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("corp_code.csv"), "not,our,header\n1,2,3\n").unwrap();
        let directory = directory(dir.path());

        let err = directory.list_all().await.unwrap_err();
        assert!(matches!(err, Error::Format(_)));
        assert_eq!(directory.fetch_count(), 0);
    }
}
