//! Merging fetched stats with the catalog's static fallbacks.
//!
//! A video shows its fetched snapshot when one exists, otherwise its
//! fallback, otherwise no numbers at all. The snapshot is picked whole; a
//! fetched snapshot never borrows fields from the fallback.

use serde::Serialize;
use showcase_core::{StatSnapshot, VideoExample, format_count};
use std::collections::BTreeMap;

/// Which snapshot a displayed video's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatOrigin {
    Fetched,
    Fallback,
}

/// Counters rendered for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedStats {
    pub views: String,
    pub likes: String,
    pub comments: String,
}

impl From<&StatSnapshot> for FormattedStats {
    fn from(snapshot: &StatSnapshot) -> Self {
        Self {
            views: format_count(snapshot.views),
            likes: format_count(snapshot.likes),
            comments: format_count(snapshot.comments),
        }
    }
}

/// One video as the showcase presents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayStats {
    pub source_url: Option<String>,
    pub title: String,
    pub media_url: String,
    pub origin: Option<StatOrigin>,
    pub views: Option<u64>,
    pub likes: Option<u64>,
    pub comments: Option<u64>,
    pub formatted: Option<FormattedStats>,
}

impl DisplayStats {
    pub fn for_example(example: &VideoExample, stats: &BTreeMap<String, StatSnapshot>) -> Self {
        let resolved = resolve(example, stats);

        let title = [resolved.map(|(s, _)| s.title.as_str()), example.fallback.as_ref().map(|f| f.title.as_str())]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .unwrap_or(example.title.as_str())
            .to_string();

        Self {
            source_url: example.source_url.clone(),
            title,
            media_url: example.media_url.clone(),
            origin: resolved.map(|(_, origin)| origin),
            views: resolved.map(|(s, _)| s.views),
            likes: resolved.map(|(s, _)| s.likes),
            comments: resolved.map(|(s, _)| s.comments),
            formatted: resolved.map(|(s, _)| FormattedStats::from(s)),
        }
    }
}

/// The snapshot to show for `example`, and where it came from.
pub fn resolve<'a>(
    example: &'a VideoExample, stats: &'a BTreeMap<String, StatSnapshot>,
) -> Option<(&'a StatSnapshot, StatOrigin)> {
    if let Some(snapshot) = example.stats_key().and_then(|key| stats.get(key)) {
        return Some((snapshot, StatOrigin::Fetched));
    }
    example.fallback.as_ref().map(|f| (f, StatOrigin::Fallback))
}

/// Display rows for every example, in catalog order.
pub fn display_all(examples: &[VideoExample], stats: &BTreeMap<String, StatSnapshot>) -> Vec<DisplayStats> {
    examples.iter().map(|e| DisplayStats::for_example(e, stats)).collect()
}
