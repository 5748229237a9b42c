use serde::{Deserialize, Serialize};

/// One row of the vendor's corp-code index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpRecord {
    /// Vendor-assigned stable identifier, eight digits.
    pub corp_code: String,
    /// Display name as registered with the vendor.
    pub corp_name: String,
    /// Last-change date (`YYYYMMDD`), when the vendor supplies one.
    pub modify_date: Option<String>,
}

/// Ordered corp-code table. Rows keep the order they appeared in the
/// source document; `corp_code` values are unique within a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpTable {
    records: Vec<CorpRecord>,
}

impl CorpTable {
    pub fn new(records: Vec<CorpRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[CorpRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CorpRecord> {
        self.records.iter()
    }

    pub(crate) fn push(&mut self, record: CorpRecord) {
        self.records.push(record);
    }

    /// Case-insensitive substring match over `corp_name`, in table
    /// order. An empty query matches every row.
    pub fn search_by_name(&self, query: &str) -> Vec<&CorpRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(|r| r.corp_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Exact match on `corp_code`. Linear scan; the table tops out at
    /// tens of thousands of rows and this is not a hot path.
    pub fn get_by_code(&self, corp_code: &str) -> Option<&CorpRecord> {
        self.records.iter().find(|r| r.corp_code == corp_code)
    }
}

impl IntoIterator for CorpTable {
    type Item = CorpRecord;
    type IntoIter = std::vec::IntoIter<CorpRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
pub(crate) fn sample_table() -> CorpTable {
    CorpTable::new(vec![
        CorpRecord {
            corp_code: "00126380".into(),
            corp_name: "Samsung Electronics".into(),
            modify_date: Some("20230102".into()),
        },
        CorpRecord {
            corp_code: "00164779".into(),
            corp_name: "SK Hynix".into(),
            modify_date: None,
        },
    ])
}
