// src/playlist/mod.rs
// =============================================================================
// This module turns a channel list file into Endpoints.
//
// Three formats are recognised:
// - M3U playlists (#EXTM3U / #EXTINF lines)
// - CSV-ish text, one `name,url` per line
// - Plain lists of URLs
//
// The format is sniffed from the first ten lines rather than the file
// extension, because .txt files in the wild hold all three.
// =============================================================================

mod m3u;
mod text;

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::LoadError;

/// How many leading lines are looked at when sniffing the format
const SNIFF_LINES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    M3u,
    Csv,
    PlainUrls,
}

impl fmt::Display for ListFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListFormat::M3u => "M3U playlist",
            ListFormat::Csv => "CSV",
            ListFormat::PlainUrls => "URL list",
        };
        f.write_str(name)
    }
}

/// Guesses the list format from its content
pub fn detect_format(content: &str) -> ListFormat {
    let head: Vec<&str> = content.trim().lines().take(SNIFF_LINES).collect();

    if content.starts_with("#EXTM3U") || head.iter().any(|line| line.starts_with("#EXTINF:")) {
        ListFormat::M3u
    } else if head.iter().any(|line| line.contains(',')) {
        ListFormat::Csv
    } else {
        ListFormat::PlainUrls
    }
}

/// Parses a channel list, returning the endpoints in file order
pub fn parse_endpoints(content: &str) -> (Vec<Endpoint>, ListFormat) {
    // A UTF-8 BOM would hide the #EXTM3U marker
    let content = content.trim_start_matches('\u{feff}');
    let format = detect_format(content);

    let endpoints = match format {
        ListFormat::M3u => m3u::parse(content),
        ListFormat::Csv => text::parse_csv(content),
        ListFormat::PlainUrls => text::parse_plain(content),
    };

    (endpoints, format)
}

/// Reads and parses a channel list file
pub fn load_endpoints(path: &Path) -> Result<(Vec<Endpoint>, ListFormat), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let (endpoints, format) = parse_endpoints(&content);
    debug!(path = %path.display(), %format, count = endpoints.len(), "loaded channel list");

    if endpoints.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    Ok((endpoints, format))
}

// Name given to channels that have none
fn fallback_name(number: usize) -> String {
    format!("channel_{number}")
}

fn is_http(line: &str) -> bool {
    line.starts_with("http")
}
