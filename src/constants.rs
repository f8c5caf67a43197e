/// Mapping-file marker for series whose TvDB episodes are addressed by absolute number.
pub const ABSOLUTE_SEASON_MARKER: &str = "a";

pub const USER_AGENT: &str = "animeta/0.1";

pub mod urls {

    pub const ANIME_LIST: &str =
        "https://raw.githubusercontent.com/Anime-Lists/anime-lists/master/anime-list.xml";

    pub const ANIDB_API: &str = "http://api.anidb.net:9001/httpapi";

    pub const ANIDB_IMAGES: &str = "https://cdn.anidb.net/images/main";

    pub const TVDB_API: &str = "https://api.thetvdb.com";

    pub const ANILIST_API: &str = "https://graphql.anilist.co";
}

pub mod cache {

    pub const MAPPING_LIST_MAX_AGE_HOURS: u64 = 24;

    pub const ANIDB_MAX_AGE_HOURS: u64 = 24 * 7;

    pub const TVDB_MAX_AGE_HOURS: u64 = 24;
}

pub mod provider_ids {

    pub const ANIDB: &str = "AniDB";

    pub const TVDB: &str = "Tvdb";

    pub const IMDB: &str = "Imdb";

    pub const TMDB: &str = "Tmdb";

    pub const ANILIST: &str = "AniList";
}

pub mod limits {

    /// AniDB bans clients that request more often than once every two seconds.
    pub const ANIDB_RATE_LIMIT_MS: u64 = 2000;

    pub const TVDB_MAX_PAGES: u32 = 50;
}
