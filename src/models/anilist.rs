use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListTitle {
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub native: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListStaff {
    pub name: String,
    pub role: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AniListSeries {
    pub id: i32,
    pub title: AniListTitle,
    /// 0-100.
    pub average_score: Option<i32>,
    pub genres: Vec<String>,
    pub studios: Vec<String>,
    pub staff: Vec<AniListStaff>,
}
