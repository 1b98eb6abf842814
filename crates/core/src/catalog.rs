//! Showcased videos and their statistics snapshots.

use serde::{Deserialize, Serialize};

/// One point-in-time measurement of a video's social statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    pub views: u64,
    pub likes: u64,
    pub comments: u64,
    #[serde(default)]
    pub shares: u64,
    #[serde(default)]
    pub title: String,
}

/// A statically configured video shown on the landing page.
///
/// `source_url` is the identifier on the source platform and the key of the
/// stats map. Examples without one are never queried and always render
/// their fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoExample {
    #[serde(default)]
    pub source_url: Option<String>,
    pub title: String,
    pub media_url: String,
    #[serde(default)]
    pub fallback: Option<StatSnapshot>,
}

impl VideoExample {
    /// The identifier to query stats for, if any.
    pub fn stats_key(&self) -> Option<&str> {
        self.source_url.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

fn example(source_url: &str, media_url: &str, title: &str, views: u64, likes: u64, comments: u64) -> VideoExample {
    VideoExample {
        source_url: Some(source_url.to_string()),
        title: title.to_string(),
        media_url: media_url.to_string(),
        fallback: Some(StatSnapshot { views, likes, comments, shares: 0, title: title.to_string() }),
    }
}

/// The built-in showcase catalog.
pub fn default_examples() -> Vec<VideoExample> {
    vec![
        example(
            "https://www.tiktok.com/@texty.stories.daily/video/7597578004876856598",
            "https://br-max.s3.ap-south-1.amazonaws.com/ExampleVideo1_v2.mp4",
            "@RIZZ APP they betrayed him... link in bio #textstories…",
            465_000,
            17_000,
            48,
        ),
        example(
            "https://www.tiktok.com/@texty.stories.daily/video/7599790603211214102",
            "https://br-max.s3.ap-south-1.amazonaws.com/ExampleVideo2_v2.mp4",
            "@RIZZ APP she got it right back... link in bio #textstories",
            291_450,
            10_450,
            54,
        ),
        example(
            "https://www.tiktok.com/@speakingtexts/video/7600204876609686786",
            "https://br-max.s3.ap-south-1.amazonaws.com/ExampleVideo3_v2.mp4",
            "part 2 anyone?... link in bio #textstories",
            183_785,
            9_950,
            59,
        ),
        example(
            "https://www.tiktok.com/@speakingtexts/video/7598697536353832214",
            "https://br-max.s3.ap-south-1.amazonaws.com/ExampleVideo4_v2.mp4",
            "@RIZZ APP pick a side... link in bio #textstories",
            150_545,
            7_600,
            185,
        ),
    ]
}
