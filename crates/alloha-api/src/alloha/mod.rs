//! Alloha API client module.
//!
//! Looks up movies and series by IMDb, KP or TMDb id or by title, and
//! decodes the JSON envelope the service answers with.

mod api;
mod client;
mod config;
mod endpoint;
mod error;
mod transport;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{AllohaApi, LocalAllohaApi};
#[allow(clippy::module_name_repetitions)]
pub use client::{AllohaClient, AllohaClientBuilder, DEFAULT_BASE_URL};
#[allow(clippy::module_name_repetitions)]
pub use config::AllohaConfig;
pub use endpoint::build_api_url;
#[allow(clippy::module_name_repetitions)]
pub use error::{AllohaError, ErrorKind, Result};
pub use transport::{
    ACCEPT_ENCODINGS, ACCEPT_JSON, CONTENT_TYPE_JSON, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_TIMEOUT,
    DEFAULT_USER_AGENT, HttpTransport, LocalHttpTransport, RawResponse, RequestProfile,
};
pub use types::{
    Episode, FindListResponse, FindOneResponse, LatestSeriesResponse, MovieData, MovieSearchData,
    Response, ResponseStatus, Season, SeriesData, Translation, decode,
};
