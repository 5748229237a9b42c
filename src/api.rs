// src/api.rs
//! JSON endpoints of the vendor API: company profiles and single-company
//! financial statements. The corp-code index pipeline lives in `fetch`/
//! `extract`/`parse`; this module covers the per-company queries layered
//! on top of it.

use std::ops::RangeInclusive;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::endpoint_url;

pub const STATUS_OK: &str = "000";
pub const STATUS_NO_DATA: &str = "013";

const COMPANY_ENDPOINT: &str = "company.json";
const FNLTT_ENDPOINT: &str = "fnlttSinglAcnt.json";

/// Registration profile returned by `company.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub corp_code: String,
    pub corp_name: String,
    #[serde(default)]
    pub corp_name_eng: Option<String>,
    #[serde(default)]
    pub stock_name: Option<String>,
    #[serde(default)]
    pub stock_code: Option<String>,
    #[serde(default)]
    pub ceo_nm: Option<String>,
    #[serde(default)]
    pub corp_cls: Option<String>,
    #[serde(default)]
    pub adres: Option<String>,
    #[serde(default)]
    pub hm_url: Option<String>,
    #[serde(default)]
    pub induty_code: Option<String>,
    #[serde(default)]
    pub est_dt: Option<String>,
    #[serde(default)]
    pub acc_mt: Option<String>,
}

/// One account row from `fnlttSinglAcnt.json`. Amounts stay in the
/// vendor's comma-grouped string form; use the accessor methods for
/// numeric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FnlttAccount {
    pub rcept_no: String,
    pub reprt_code: String,
    pub bsns_year: String,
    pub corp_code: String,
    #[serde(default)]
    pub stock_code: Option<String>,
    pub fs_div: String,
    pub fs_nm: String,
    pub sj_div: String,
    pub sj_nm: String,
    pub account_nm: String,
    #[serde(default)]
    pub thstrm_nm: Option<String>,
    #[serde(default)]
    pub thstrm_dt: Option<String>,
    #[serde(default)]
    pub thstrm_amount: Option<String>,
    #[serde(default)]
    pub frmtrm_nm: Option<String>,
    #[serde(default)]
    pub frmtrm_dt: Option<String>,
    #[serde(default)]
    pub frmtrm_amount: Option<String>,
    #[serde(default)]
    pub bfefrmtrm_nm: Option<String>,
    #[serde(default)]
    pub bfefrmtrm_dt: Option<String>,
    #[serde(default)]
    pub bfefrmtrm_amount: Option<String>,
    #[serde(default)]
    pub ord: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl FnlttAccount {
    /// Current-term amount as a number, if present and parseable.
    pub fn thstrm(&self) -> Option<i64> {
        self.thstrm_amount.as_deref().and_then(parse_amount)
    }

    /// Prior-term amount.
    pub fn frmtrm(&self) -> Option<i64> {
        self.frmtrm_amount.as_deref().and_then(parse_amount)
    }

    /// Term-before-prior amount; annual reports only.
    pub fn bfefrmtrm(&self) -> Option<i64> {
        self.bfefrmtrm_amount.as_deref().and_then(parse_amount)
    }
}

/// The vendor's four periodic report kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCode {
    Annual,
    HalfYear,
    FirstQuarter,
    ThirdQuarter,
}

impl ReportCode {
    pub fn code(self) -> &'static str {
        match self {
            ReportCode::Annual => "11011",
            ReportCode::HalfYear => "11012",
            ReportCode::FirstQuarter => "11013",
            ReportCode::ThirdQuarter => "11014",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportCode::Annual => "annual report",
            ReportCode::HalfYear => "half-year report",
            ReportCode::FirstQuarter => "first-quarter report",
            ReportCode::ThirdQuarter => "third-quarter report",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "11011" => Some(ReportCode::Annual),
            "11012" => Some(ReportCode::HalfYear),
            "11013" => Some(ReportCode::FirstQuarter),
            "11014" => Some(ReportCode::ThirdQuarter),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusProbe {
    status: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    #[allow(dead_code)]
    status: String,
    #[serde(default)]
    list: Vec<T>,
}

/// Check the vendor status envelope, then deserialize the payload.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    let probe: StatusProbe = serde_json::from_str(text)
        .map_err(|e| Error::Format(format!("vendor response is not JSON: {e}")))?;
    if probe.status != STATUS_OK {
        return Err(Error::Api {
            status: probe.status,
            message: probe.message,
        });
    }
    serde_json::from_str(text).map_err(|e| Error::Format(format!("unexpected payload: {e}")))
}

async fn call(client: &Client, cfg: &Config, endpoint: &str, params: &[(&str, &str)]) -> Result<String> {
    let url = endpoint_url(cfg, endpoint, params)?;
    debug!(endpoint, "querying vendor");
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}

/// Corp codes are eight digits; shorter inputs are zero-padded the way
/// the vendor expects.
pub fn normalize_corp_code(corp_code: &str) -> String {
    format!("{:0>8}", corp_code.trim())
}

/// Fetch one company's registration profile.
pub async fn company_profile(
    client: &Client,
    cfg: &Config,
    corp_code: &str,
) -> Result<CompanyProfile> {
    let corp_code = normalize_corp_code(corp_code);
    let text = call(client, cfg, COMPANY_ENDPOINT, &[("corp_code", &corp_code)]).await?;
    decode(&text)
}

/// Fetch the single-account financial statement rows for one business
/// year. A year the vendor has no data for comes back as an `Api` error
/// with status `013`; see [`Error::is_no_data`].
pub async fn financial_statements(
    client: &Client,
    cfg: &Config,
    corp_code: &str,
    year: u16,
    report: ReportCode,
) -> Result<Vec<FnlttAccount>> {
    let corp_code = normalize_corp_code(corp_code);
    let year = year.to_string();
    let text = call(
        client,
        cfg,
        FNLTT_ENDPOINT,
        &[
            ("corp_code", &corp_code),
            ("bsns_year", &year),
            ("reprt_code", report.code()),
        ],
    )
    .await?;
    let envelope: ListEnvelope<FnlttAccount> = decode(&text)?;
    Ok(envelope.list)
}

/// Fetch a span of business years and concatenate the rows. Years the
/// vendor rejects (most commonly "no data") are skipped with a warning;
/// transport and format failures abort the whole range.
pub async fn financial_statements_range(
    client: &Client,
    cfg: &Config,
    corp_code: &str,
    years: RangeInclusive<u16>,
    report: ReportCode,
) -> Result<Vec<FnlttAccount>> {
    let mut all = Vec::new();
    for year in years {
        match financial_statements(client, cfg, corp_code, year, report).await {
            Ok(mut rows) => {
                debug!(year, rows = rows.len(), "year fetched");
                all.append(&mut rows);
            }
            Err(e @ Error::Api { .. }) => {
                warn!(year, error = %e, "skipping year");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(all)
}

/// Parse a comma-grouped vendor amount. Empty strings and the `-`
/// placeholder mean "not reported".
pub fn parse_amount(raw: &str) -> Option<i64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    cleaned.parse().ok()
}

/// Render a KRW amount with the vendor's customary units: 조 (10^12),
/// 억 (10^8), 만 (10^4), plain won below that.
pub fn format_amount(amount: i64) -> String {
    const JO: u64 = 1_0000_0000_0000;
    const EOK: u64 = 1_0000_0000;
    const MAN: u64 = 1_0000;

    let abs = amount.unsigned_abs();
    if abs >= JO {
        format!("{:.1}조", amount as f64 / JO as f64)
    } else if abs >= EOK {
        format!("{:.1}억", amount as f64 / EOK as f64)
    } else if abs >= MAN {
        format!("{:.1}만", amount as f64 / MAN as f64)
    } else {
        amount.to_string()
    }
}
