// src/playlist/text.rs
// =============================================================================
// Line-based list formats: `name,url` CSV and bare URL lists.
//
// Channels without a name are called `channel_<line number>`, counting lines
// from 1 after leading and trailing blank space is trimmed off the file.
// =============================================================================

use super::{fallback_name, is_http};
use crate::endpoint::Endpoint;

pub(super) fn parse_csv(content: &str) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();

    for (index, line) in content.trim().lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Only the first comma separates; URLs may contain more
        match line.split_once(',') {
            Some((name, url)) => {
                let name = name.trim();
                let url = url.trim();
                if is_http(url) {
                    let name = if name.is_empty() {
                        fallback_name(line_number)
                    } else {
                        name.to_string()
                    };
                    endpoints.push(Endpoint::new(name, url));
                }
            }
            None if is_http(line) => {
                endpoints.push(Endpoint::new(fallback_name(line_number), line));
            }
            None => {}
        }
    }

    endpoints
}

pub(super) fn parse_plain(content: &str) -> Vec<Endpoint> {
    content
        .trim()
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| is_http(line))
        .map(|(line_number, line)| Endpoint::new(fallback_name(line_number), line))
        .collect()
}
