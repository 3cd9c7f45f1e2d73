// src/playlist/m3u.rs
// =============================================================================
// M3U playlist parsing.
//
//   #EXTM3U
//   #EXTINF:-1 tvg-name="..." group-title="News",Channel Name
//   http://example.com/stream.m3u8
//
// An #EXTINF line names the next URL line. A URL line with no #EXTINF before
// it still counts, under a generated name.
// =============================================================================

use std::sync::OnceLock;

use regex::Regex;

use super::{fallback_name, is_http};
use crate::endpoint::{Endpoint, DEFAULT_GROUP};

// Everything after the first comma is the display name
fn extinf_name() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"#EXTINF:.*?,(.+)$").expect("valid EXTINF regex"))
}

fn group_title() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"group-title="([^"]*)""#).expect("valid group regex"))
}

/// (name, group) waiting for its URL line
struct Pending {
    name: String,
    group: String,
}

pub(super) fn parse(content: &str) -> Vec<Endpoint> {
    let mut endpoints = Vec::new();
    let mut pending: Option<Pending> = None;

    for line in content.trim().lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("#EXTM3U") {
            continue;
        }

        if line.starts_with("#EXTINF:") {
            if let Some(name) = extinf_name().captures(line).and_then(|caps| caps.get(1)) {
                let group = group_title()
                    .captures(line)
                    .and_then(|caps| caps.get(1))
                    .map_or(DEFAULT_GROUP, |m| m.as_str());

                pending = Some(Pending {
                    name: name.as_str().trim().to_string(),
                    group: group.to_string(),
                });
            }
        } else if is_http(line) {
            let endpoint = match pending.take() {
                Some(Pending { name, group }) => Endpoint::new(name, line).with_group(group),
                None => Endpoint::new(fallback_name(endpoints.len() + 1), line),
            };
            endpoints.push(endpoint);
        }
    }

    endpoints
}
