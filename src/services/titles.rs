//! Picks one display title out of AniDB's multilingual title list.

use crate::models::anidb::AniDbTitle;
use crate::models::anilist::AniListTitle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitlePreference {
    /// Official title in the given AniDB language code, e.g. `en` or `de`.
    Localized(String),
    /// Kanji/kana title.
    Japanese,
    /// Transliterated Japanese (`x-jat`).
    JapaneseRomaji,
}

impl TitlePreference {
    #[must_use]
    pub fn language(&self) -> &str {
        match self {
            Self::Localized(language) => language,
            Self::Japanese => "ja",
            Self::JapaneseRomaji => "x-jat",
        }
    }
}

impl Default for TitlePreference {
    fn default() -> Self {
        Self::Localized("en".to_string())
    }
}

fn is_kind(title: &AniDbTitle, kind: &str) -> bool {
    title.kind.as_deref() == Some(kind)
}

/// Official title in the preferred language, then the main title, then the first title.
///
/// Episode titles carry no kind, so for them a title in the preferred
/// language is enough.
#[must_use]
pub fn select_title<'a>(titles: &'a [AniDbTitle], preference: &TitlePreference) -> Option<&'a str> {
    let language = preference.language();
    let in_language = |t: &&AniDbTitle| t.language.eq_ignore_ascii_case(language);

    titles
        .iter()
        .filter(in_language)
        .find(|t| is_kind(t, "official") || t.kind.is_none())
        .or_else(|| titles.iter().filter(in_language).find(|t| is_kind(t, "main")))
        .or_else(|| titles.iter().find(|t| is_kind(t, "main")))
        .or_else(|| titles.first())
        .map(|t| t.value.as_str())
}

/// The AniDB main title, used as the original title.
#[must_use]
pub fn main_title(titles: &[AniDbTitle]) -> Option<&str> {
    titles
        .iter()
        .find(|t| is_kind(t, "main"))
        .or_else(|| titles.first())
        .map(|t| t.value.as_str())
}

#[must_use]
pub fn select_anilist_title<'a>(title: &'a AniListTitle, preference: &TitlePreference) -> Option<&'a str> {
    let preferred = match preference {
        TitlePreference::Japanese => title.native.as_deref(),
        TitlePreference::JapaneseRomaji => title.romaji.as_deref(),
        TitlePreference::Localized(_) => title.english.as_deref(),
    };
    preferred
        .or(title.romaji.as_deref())
        .or(title.english.as_deref())
        .or(title.native.as_deref())
}
