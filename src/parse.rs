// src/parse.rs
use std::collections::HashSet;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::table::{CorpRecord, CorpTable};

/// Which child of a `<list>` record the cursor is currently inside.
#[derive(Clone, Copy)]
enum Field {
    Code,
    Name,
    Date,
}

/// Parse the extracted corp-code XML into a table.
pub fn parse_corp_index(path: &Path) -> Result<CorpTable> {
    let xml = std::fs::read_to_string(path)?;
    let table = parse_corp_index_str(&xml)?;
    info!(records = table.len(), path = %path.display(), "corp index parsed");
    Ok(table)
}

/// Scan the document for `<list>` records and pull out the three child
/// fields, trimming surrounding whitespace. Records without a
/// `corp_code` are dropped rather than aborting the parse; a code seen
/// twice keeps its first record. Output is a deterministic function of
/// the input bytes.
pub fn parse_corp_index_str(xml: &str) -> Result<CorpTable> {
    let mut reader = Reader::from_str(xml);

    let mut table = CorpTable::default();
    let mut seen: HashSet<String> = HashSet::new();

    let mut in_record = false;
    let mut field: Option<Field> = None;
    let mut code = String::new();
    let mut name = String::new();
    let mut date = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"list" => {
                    in_record = true;
                    code.clear();
                    name.clear();
                    date.clear();
                }
                b"corp_code" if in_record => field = Some(Field::Code),
                b"corp_name" if in_record => field = Some(Field::Name),
                b"modify_date" if in_record => field = Some(Field::Date),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(f) = field {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::Format(format!("bad character data: {e}")))?;
                    match f {
                        Field::Code => code.push_str(&text),
                        Field::Name => name.push_str(&text),
                        Field::Date => date.push_str(&text),
                    }
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(f) = field {
                    let text = String::from_utf8_lossy(&t.into_inner()).into_owned();
                    match f {
                        Field::Code => code.push_str(&text),
                        Field::Name => name.push_str(&text),
                        Field::Date => date.push_str(&text),
                    }
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"corp_code" | b"corp_name" | b"modify_date" => field = None,
                b"list" => {
                    in_record = false;
                    let corp_code = code.trim().to_string();
                    if corp_code.is_empty() {
                        debug!("dropping record with empty corp_code");
                        continue;
                    }
                    if !seen.insert(corp_code.clone()) {
                        debug!(%corp_code, "dropping duplicate corp_code");
                        continue;
                    }
                    let modify_date = date.trim();
                    table.push(CorpRecord {
                        corp_code,
                        corp_name: name.trim().to_string(),
                        modify_date: if modify_date.is_empty() {
                            None
                        } else {
                            Some(modify_date.to_string())
                        },
                    });
                }
                _ => {}
            },
            Ok(Event::Eof) => {
                if in_record {
                    return Err(Error::Format("document truncated inside a record".into()));
                }
                break;
            }
            Ok(_) => {}
            Err(e) => return Err(Error::Format(format!("not well-formed XML: {e}"))),
        }
    }

    Ok(table)
}
