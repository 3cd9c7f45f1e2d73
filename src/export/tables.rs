// src/export/tables.rs
// CSV tables of valid and invalid channels. A UTF-8 BOM goes first so that
// spreadsheet programs pick the right encoding for non-ASCII channel names.

use std::io::Write;

use crate::checker::ProbeOutcome;
use crate::error::ExportError;

const BOM: &[u8] = "\u{feff}".as_bytes();

pub(super) fn write_valid<W: Write>(out: &mut W, outcomes: &[ProbeOutcome]) -> Result<(), ExportError> {
    let mut writer = start_table(out, &["name", "url", "group"])?;
    for outcome in outcomes {
        let endpoint = &outcome.endpoint;
        writer.write_record([&endpoint.name, &endpoint.url, &endpoint.group])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub(super) fn write_invalid<W: Write>(out: &mut W, outcomes: &[ProbeOutcome]) -> Result<(), ExportError> {
    let mut writer = start_table(out, &["name", "url", "group", "error"])?;
    for outcome in outcomes {
        let endpoint = &outcome.endpoint;
        let error = outcome.error.as_deref().unwrap_or("unknown error");
        writer.write_record([
            endpoint.name.as_str(),
            endpoint.url.as_str(),
            endpoint.group.as_str(),
            error,
        ])?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn start_table<'w, W: Write>(
    out: &'w mut W,
    header: &[&str],
) -> Result<csv::Writer<&'w mut W>, ExportError> {
    out.write_all(BOM).map_err(csv::Error::from)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(header)?;
    Ok(writer)
}
