//! Alloha API response types.
//!
//! Nullable integers are `Option<i32>`: JSON `null` or a missing key decodes
//! to `None`, any integer to `Some`, anything else is a decode error.
//! Other fields decode `null` or a missing key to their zero value.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::Result;

/// Decodes a JSON response body.
///
/// Unknown fields are ignored.
///
/// # Errors
///
/// Returns `Decode` if `body` is not valid JSON for `T`.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(body)?)
}

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Envelope ---

/// Value of the envelope `status` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// The request was served, `data` is set.
    Success,
    /// The service rejected the request, see `error_info`.
    Error,
    /// Any other status string, or none at all.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Top-level response wrapper.
///
/// An `Error` status is data, not a client failure: check
/// [`Response::is_success`] before reading `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response<T> {
    /// Request status.
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: ResponseStatus,
    /// Error description (only for the `error` status).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<String>,
    /// Payload (only for the `success` status).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Next page number of a list response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<i32>,
    /// Previous page number of a list response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<i32>,
}

impl<T> Response<T> {
    /// Returns `true` if the service reported `success`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Returns `true` if the service reported `error`.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == ResponseStatus::Error
    }
}

/// Response to a lookup by id or a single-title search.
#[allow(clippy::module_name_repetitions)]
pub type FindOneResponse = Response<MovieData>;

/// Response to a paginated title search.
#[allow(clippy::module_name_repetitions)]
pub type FindListResponse = Response<Vec<MovieSearchData>>;

/// Response to the latest-series-episodes listing.
#[allow(clippy::module_name_repetitions)]
pub type LatestSeriesResponse = Response<Vec<SeriesData>>;

// --- Records ---

/// A movie or series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieData {
    /// Localized title.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Original title.
    pub original_name: Option<String>,
    /// Alternative title.
    pub alternative_name: Option<String>,
    /// Release year.
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    /// Category id.
    #[serde(deserialize_with = "null_as_default")]
    pub category: i32,
    /// KP id.
    #[serde(deserialize_with = "null_as_default")]
    pub id_kp: i32,
    /// Alternative KP id.
    pub alternative_id_kp: Option<i32>,
    /// IMDb id (`tt...`).
    pub id_imdb: Option<String>,
    /// TMDb id.
    pub id_tmdb: Option<i32>,
    /// World Art id.
    pub id_world_art: Option<i32>,
    /// Service-side content token.
    #[serde(deserialize_with = "null_as_default")]
    pub token_movie: String,
    /// Countries, comma separated.
    pub country: Option<String>,
    /// Genres, comma separated.
    pub genre: Option<String>,
    /// Cast, comma separated.
    pub actors: Option<String>,
    /// Directors, comma separated.
    pub directors: Option<String>,
    /// Producers, comma separated.
    pub producers: Option<String>,
    /// Russian premiere date.
    pub premiere_ru: Option<String>,
    /// World premiere date.
    pub premiere: Option<String>,
    /// Minimum viewer age.
    pub age_restrictions: Option<i32>,
    /// MPAA rating.
    pub rating_mpaa: Option<String>,
    /// KP rating.
    pub rating_kp: Option<f64>,
    /// IMDb rating.
    pub rating_imdb: Option<f64>,
    /// Runtime as displayed by the service.
    pub time: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Poster URL.
    pub poster: Option<String>,
    /// Synopsis.
    pub description: Option<String>,
    /// Number of seasons (series only).
    #[serde(deserialize_with = "null_as_default")]
    pub seasons_count: i32,
    /// Seasons by number (series only).
    #[serde(deserialize_with = "null_as_default")]
    pub seasons: BTreeMap<u32, Season>,
    /// Best available quality.
    pub quality: Option<String>,
    /// Default translation name.
    pub translation: Option<String>,
    /// Player per translation (movies only).
    #[serde(deserialize_with = "null_as_default")]
    pub translation_iframe: BTreeMap<String, Translation>,
    /// Player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Trailer player URL.
    pub iframe_trailer: Option<String>,
    /// LGBT content flag.
    #[serde(deserialize_with = "null_as_default")]
    pub lgbt: bool,
    /// 4K availability.
    #[serde(deserialize_with = "null_as_default")]
    pub uhd: bool,
    /// Director's cut availability.
    #[serde(deserialize_with = "null_as_default")]
    pub available_directors_cut: bool,
}

impl MovieData {
    /// Returns `true` if the record describes a series.
    #[must_use]
    pub fn is_series(&self) -> bool {
        !self.seasons.is_empty()
    }

    /// Looks up an episode by season and episode number.
    #[must_use]
    pub fn episode(&self, season: u32, episode: u32) -> Option<&Episode> {
        self.seasons.get(&season)?.episodes.get(&episode)
    }
}

/// An item of a title search result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovieSearchData {
    /// Last released season (series only).
    pub last_season: Option<i32>,
    /// Last released episode (series only).
    pub last_episode: Option<i32>,
    /// Localized title.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Original title.
    pub original_name: Option<String>,
    /// Alternative title.
    pub alternative_name: Option<String>,
    /// Release year.
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    /// Category id.
    #[serde(deserialize_with = "null_as_default")]
    pub category_id: i32,
    /// KP id.
    #[serde(deserialize_with = "null_as_default")]
    pub id_kp: i32,
    /// Alternative KP id.
    pub alternative_id_kp: Option<i32>,
    /// IMDb id.
    pub id_imdb: Option<String>,
    /// TMDb id.
    pub id_tmdb: Option<i32>,
    /// World Art id.
    pub id_world_art: Option<i32>,
    /// Service-side content token.
    #[serde(deserialize_with = "null_as_default")]
    pub token_movie: String,
    /// Countries.
    pub country: Option<String>,
    /// Genres.
    pub genre: Option<String>,
    /// Cast.
    pub actors: Option<String>,
    /// Directors.
    pub directors: Option<String>,
    /// Producers.
    pub producers: Option<String>,
    /// Russian premiere date.
    pub premiere_ru: Option<String>,
    /// World premiere date.
    pub premiere: Option<String>,
    /// Minimum viewer age.
    pub age_restrictions: Option<i32>,
    /// MPAA rating.
    pub rating_mpaa: Option<String>,
    /// KP rating.
    pub rating_kp: Option<f64>,
    /// IMDb rating.
    pub rating_imdb: Option<f64>,
    /// Runtime.
    pub time: Option<String>,
    /// Tagline.
    pub tagline: Option<String>,
    /// Poster URL.
    pub poster: Option<String>,
    /// Synopsis.
    pub description: Option<String>,
    /// Number of seasons.
    #[serde(deserialize_with = "null_as_default")]
    pub seasons_count: i32,
    /// Seasons by number.
    #[serde(deserialize_with = "null_as_default")]
    pub seasons: BTreeMap<u32, Season>,
    /// Best available quality.
    pub quality: Option<String>,
    /// Default translation name.
    pub translation: Option<String>,
    /// Player per translation.
    #[serde(deserialize_with = "null_as_default")]
    pub translation_iframe: BTreeMap<String, Translation>,
    /// Player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Trailer player URL.
    pub iframe_trailer: Option<String>,
    /// LGBT content flag.
    #[serde(deserialize_with = "null_as_default")]
    pub lgbt: bool,
    /// 4K availability.
    #[serde(deserialize_with = "null_as_default")]
    pub uhd: bool,
    /// Director's cut availability.
    #[serde(deserialize_with = "null_as_default")]
    pub available_directors_cut: bool,
}

/// A freshly released series episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesData {
    /// Season number.
    #[serde(deserialize_with = "null_as_default")]
    pub season: i32,
    /// Episode number.
    #[serde(deserialize_with = "null_as_default")]
    pub episode: i32,
    /// Translation id.
    #[serde(deserialize_with = "null_as_default")]
    pub translation: i32,
    /// Quality.
    pub quality: Option<String>,
    /// Advertising presence marker.
    #[serde(deserialize_with = "null_as_default")]
    pub adv_presence: i32,
    /// Localized title.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Service-side item id.
    #[serde(deserialize_with = "null_as_default")]
    pub id_item: i32,
    /// Original title.
    pub original_name: Option<String>,
    /// Category name.
    pub category: Option<String>,
    /// Alternative title.
    pub alternative_name: Option<String>,
    /// Release year.
    #[serde(deserialize_with = "null_as_default")]
    pub year: i32,
    /// KP id.
    #[serde(deserialize_with = "null_as_default")]
    pub id_kp: i32,
    /// Alternative KP id.
    pub alternative_id_kp: Option<i32>,
    /// IMDb id.
    pub id_imdb: Option<String>,
    /// TMDb id.
    pub id_tmdb: Option<i32>,
    /// World Art id.
    pub id_world_art: Option<i32>,
    /// Service-side content token.
    #[serde(deserialize_with = "null_as_default")]
    pub token_movie: String,
    /// Release timestamp.
    pub date: Option<String>,
    /// Player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Contains advertising.
    #[serde(deserialize_with = "null_as_default")]
    pub adv: bool,
    /// Category id.
    #[serde(deserialize_with = "null_as_default")]
    pub category_id: i32,
    /// Player URL of the released episode.
    pub iframe_last: Option<String>,
    /// Trailer player URL.
    pub iframe_trailer: Option<String>,
    /// LGBT content flag.
    #[serde(deserialize_with = "null_as_default")]
    pub lgbt: bool,
    /// 4K availability.
    #[serde(deserialize_with = "null_as_default")]
    pub uhd: bool,
}

/// A season of a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Season {
    /// Season player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Season number.
    #[serde(deserialize_with = "null_as_default")]
    pub season: u32,
    /// Episodes by number.
    #[serde(deserialize_with = "null_as_default")]
    pub episodes: BTreeMap<u32, Episode>,
}

/// An episode of a season.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Episode {
    /// Episode player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Episode number.
    #[serde(deserialize_with = "null_as_default")]
    pub episode: u32,
    /// Players by translation name.
    #[serde(deserialize_with = "null_as_default")]
    pub translation: BTreeMap<String, Translation>,
}

/// A translation (dub or subtitles) player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    /// Translation name.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Player URL.
    #[serde(deserialize_with = "null_as_default")]
    pub iframe: String,
    /// Quality.
    pub quality: Option<String>,
    /// Contains advertising.
    #[serde(deserialize_with = "null_as_default")]
    pub adv: bool,
    /// Release timestamp.
    pub date: Option<String>,
    /// LGBT content flag.
    #[serde(deserialize_with = "null_as_default")]
    pub lgbt: bool,
    /// 4K availability.
    #[serde(deserialize_with = "null_as_default")]
    pub uhd: bool,
}
