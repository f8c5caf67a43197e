pub mod anidb;
pub mod anilist;
pub mod anime_lists;
pub mod tvdb;

pub use anidb::AniDbClient;
pub use anilist::AniListClient;
pub use anime_lists::AnimeListsClient;
pub use tvdb::TvDbClient;

use crate::constants::USER_AGENT;
use crate::domain::Source;
use reqwest::Client;
use std::time::Duration;

pub(crate) fn http_client() -> Client {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| Client::new())
}

pub(crate) fn record_request(source: Source) {
    metrics::counter!("animeta_upstream_requests_total", "source" => source.as_str()).increment(1);
}

/// `base/segment` without doubling or dropping the slash.
pub(crate) fn join_url(base: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_normalises_slashes() {
        assert_eq!(join_url("http://x/", "/login"), "http://x/login");
        assert_eq!(join_url("http://x", "series/1"), "http://x/series/1");
    }
}
