//! `AllohaApi` trait definition.
#![allow(clippy::future_not_send)]

use super::error::Result;
use super::types::{FindListResponse, FindOneResponse, LatestSeriesResponse};

/// Alloha API trait.
///
/// Abstracts lookup operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
///
/// Every method returns the decoded envelope even when the service
/// reports `"error"`; only local, transport and decode failures are `Err`.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(AllohaApi: Send)]
pub trait LocalAllohaApi {
    /// Finds a movie or series by IMDb id.
    ///
    /// # Errors
    ///
    /// `EmptyImdbId` if `imdb_id` is empty, otherwise an error if the
    /// HTTP request fails, the status is not 200 or JSON parsing fails.
    async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<FindOneResponse>;

    /// Finds a movie or series by KP id.
    ///
    /// # Errors
    ///
    /// `InvalidKpId` if `kp_id` is not positive, otherwise an error if the
    /// HTTP request fails, the status is not 200 or JSON parsing fails.
    async fn find_by_kp_id(&self, kp_id: i64) -> Result<FindOneResponse>;

    /// Finds a movie or series by TMDb id.
    ///
    /// # Errors
    ///
    /// `InvalidTmdbId` if `tmdb_id` is not positive, otherwise an error if
    /// the HTTP request fails, the status is not 200 or JSON parsing fails.
    async fn find_by_tmdb_id(&self, tmdb_id: i64) -> Result<FindOneResponse>;

    /// Searches for the single best match by title.
    ///
    /// # Errors
    ///
    /// `EmptyMovieName` if `name` is empty, otherwise an error if the HTTP
    /// request fails, the status is not 200 or JSON parsing fails.
    async fn search_one_by_name(&self, name: &str) -> Result<FindOneResponse>;

    /// Searches for all matches by title, one page at a time.
    ///
    /// # Errors
    ///
    /// `EmptyMovieName` if `name` is empty, `InvalidPageNumber` if `page`
    /// is below 1, otherwise an error if the HTTP request fails, the
    /// status is not 200 or JSON parsing fails.
    async fn search_by_name(&self, name: &str, page: i64) -> Result<FindListResponse>;

    /// Lists recently released series episodes.
    ///
    /// # Errors
    ///
    /// `InvalidPageNumber` if `page` is below 1, otherwise an error if the
    /// HTTP request fails, the status is not 200 or JSON parsing fails.
    async fn latest_series(&self, page: i64) -> Result<LatestSeriesResponse>;
}
