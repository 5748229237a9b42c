// src/extract.rs
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::info;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// The one entry the vendor puts inside the corp-code archive.
pub const CORP_INDEX_ENTRY: &str = "CORPCODE.xml";

/// Extract `CORPCODE.xml` from the downloaded archive into `out_dir`,
/// overwriting any previous extraction. Returns the extracted path.
///
/// A ZIP that cannot be opened, or one without the expected entry, is a
/// `Format` error; the vendor serves exactly one layout.
pub fn extract_corp_index(zip_path: &Path, out_dir: &Path) -> Result<PathBuf> {
    let file = File::open(zip_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::Format(format!("cannot open {}: {e}", zip_path.display())))?;

    let mut entry = archive.by_name(CORP_INDEX_ENTRY).map_err(|e| {
        Error::Format(format!(
            "entry {CORP_INDEX_ENTRY:?} missing from {}: {e}",
            zip_path.display()
        ))
    })?;

    std::fs::create_dir_all(out_dir)?;
    let out_path = out_dir.join(CORP_INDEX_ENTRY);
    let mut out = File::create(&out_path)?;
    io::copy(&mut entry, &mut out)?;

    info!(path = %out_path.display(), "corp index extracted");
    Ok(out_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::{ExtendedFileOptions, FileOptions};
    use zip::CompressionMethod;

    fn write_zip(dir: &Path, entry_name: &str, body: &[u8]) -> PathBuf {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            let options = FileOptions::<ExtendedFileOptions>::default()
                .compression_method(CompressionMethod::Stored);
            zip.start_file(entry_name, options).unwrap();
            zip.write_all(body).unwrap();
            zip.finish().unwrap();
        }
        let path = dir.join("corp_code.zip");
        std::fs::write(&path, &buf).unwrap();
        path
    }

    #[test]
    fn extracts_the_index_entry() {
        let dir = tempdir().unwrap();
        let zip_path = write_zip(dir.path(), CORP_INDEX_ENTRY, b"<result></result>");

        let out = extract_corp_index(&zip_path, dir.path()).unwrap();
        assert_eq!(out, dir.path().join(CORP_INDEX_ENTRY));
        assert_eq!(std::fs::read(&out).unwrap(), b"<result></result>");
    }

    #[test]
    fn overwrites_a_previous_extraction() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(CORP_INDEX_ENTRY), b"stale").unwrap();
        let zip_path = write_zip(dir.path(), CORP_INDEX_ENTRY, b"fresh");

        let out = extract_corp_index(&zip_path, dir.path()).unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"fresh");
    }

    #[test]
    fn missing_entry_is_a_format_error() {
        let dir = tempdir().unwrap();
        let zip_path = write_zip(dir.path(), "OTHER.xml", b"nope");

        let err = extract_corp_index(&zip_path, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }

    #[test]
    fn garbage_archive_is_a_format_error() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("corp_code.zip");
        std::fs::write(&zip_path, b"this is not a zip file").unwrap();

        let err = extract_corp_index(&zip_path, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Format(_)));
    }
}
