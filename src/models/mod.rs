pub mod anidb;
pub mod anilist;
pub mod data;
pub mod tvdb;
