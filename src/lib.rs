//! Client for the OpenDart financial-disclosure API.
//!
//! The core is the corp-code index pipeline: download the vendor's ZIP,
//! extract the XML index, parse it into a [`CorpTable`], and cache it as
//! CSV. [`CorpDirectory`] answers lookups from that cache and only goes
//! to the network when no artifact exists. The `api` module adds the
//! per-company JSON endpoints (profiles, financial statements).

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod lookup;
pub mod parse;
pub mod store;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};
pub use lookup::CorpDirectory;
pub use table::{CorpRecord, CorpTable};
