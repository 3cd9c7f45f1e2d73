// src/export/m3u.rs
// Writes valid channels back out as a playlist any player can open.

use std::io::Write;

use crate::checker::ProbeOutcome;

pub(super) fn write_playlist<W: Write>(out: &mut W, outcomes: &[ProbeOutcome]) -> std::io::Result<()> {
    writeln!(out, "#EXTM3U")?;
    for outcome in outcomes {
        let endpoint = &outcome.endpoint;
        writeln!(out, "#EXTINF:-1 group-title=\"{}\",{}", endpoint.group, endpoint.name)?;
        writeln!(out, "{}", endpoint.url)?;
    }
    Ok(())
}
