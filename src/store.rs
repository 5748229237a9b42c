// src/store.rs
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::table::{CorpRecord, CorpTable};

const HEADER: [&str; 3] = ["corp_code", "corp_name", "modify_date"];

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write the table as UTF-8 CSV at `path`: header row first, one record
/// per line, fields quoted by the writer whenever they contain the
/// delimiter. The file is written to a `.tmp` sibling and renamed into
/// place, so a failed save never leaves a partial table behind.
pub fn save(table: &CorpTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = tmp_path(path);
    {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&tmp)?;
        writer.write_record(HEADER)?;
        for record in table.iter() {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    fs::rename(&tmp, path)?;

    info!(records = table.len(), path = %path.display(), "corp table saved");
    Ok(())
}

/// Read a table previously written by [`save`]. A header row that does
/// not match the expected field set, or a duplicated `corp_code`, is a
/// `Format` error: only this crate writes the artifact, so either
/// means the file is not ours or was mangled.
pub fn load(path: &Path) -> Result<CorpTable> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let headers = reader.headers()?.clone();
    if headers.iter().collect::<Vec<_>>() != HEADER {
        return Err(Error::Format(format!(
            "unexpected header {:?} in {}",
            headers,
            path.display()
        )));
    }

    let mut table = CorpTable::default();
    let mut seen: HashSet<String> = HashSet::new();
    for row in reader.deserialize::<CorpRecord>() {
        let record = row?;
        if !seen.insert(record.corp_code.clone()) {
            return Err(Error::Format(format!(
                "duplicate corp_code {:?} in {}",
                record.corp_code,
                path.display()
            )));
        }
        table.push(record);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::sample_table;
    use tempfile::tempdir;

    #[test]
    fn round_trips_a_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");
        let table = sample_table();

        save(&table, &path).unwrap();
        assert_eq!(load(&path).unwrap(), table);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn round_trips_delimiters_and_quotes_in_names() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");
        let table = CorpTable::new(vec![CorpRecord {
            corp_code: "00000001".into(),
            corp_name: "Foo, \"Bar\" & Sons\nHoldings".into(),
            modify_date: None,
        }]);

        save(&table, &path).unwrap();
        assert_eq!(load(&path).unwrap(), table);
    }

    #[test]
    fn round_trips_an_empty_table() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");

        save(&CorpTable::default(), &path).unwrap();
        let loaded = load(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn header_row_is_written_first() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");
        save(&sample_table(), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("corp_code,corp_name,modify_date\n"));
    }

    #[test]
    fn wrong_header_is_a_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");
        std::fs::write(&path, "code,name,date\n1,Foo,\n").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn duplicate_code_in_file_is_a_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("corp_code.csv");
        std::fs::write(
            &path,
            "corp_code,corp_name,modify_date\n00000001,Foo,\n00000001,Bar,\n",
        )
        .unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
