//! Which requests the media cache is responsible for.

use reqwest::Url;

/// Matches URLs on one host whose path ends with one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    host: String,
    extension: String,
}

impl MediaFilter {
    pub fn new(host: impl Into<String>, extension: impl Into<String>) -> Self {
        Self { host: host.into(), extension: extension.into() }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Host compares ASCII case-insensitively; the path suffix is exact.
    pub fn matches(&self, url: &Url) -> bool {
        let host_matches = url.host_str().is_some_and(|h| h.eq_ignore_ascii_case(&self.host));
        host_matches && url.path().ends_with(&self.extension)
    }
}
