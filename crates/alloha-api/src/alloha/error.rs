//! Error types for the Alloha API client.

use thiserror::Error;

/// Result alias used throughout the Alloha client.
pub type Result<T> = std::result::Result<T, AllohaError>;

/// Broad category of an [`AllohaError`].
///
/// A remote `"error"` status is not represented here: it is decoded data
/// that the caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Empty or invalid token, base URL, header value or proxy.
    Configuration,
    /// Empty or out-of-range per-call argument.
    Validation,
    /// Network failure, timeout or non-200 status.
    Transport,
    /// Malformed JSON, empty body or broken compressed stream.
    Decode,
}

/// Errors returned by the Alloha client.
#[derive(Debug, Error)]
#[non_exhaustive]
#[allow(clippy::module_name_repetitions)]
pub enum AllohaError {
    /// The API token is empty.
    #[error("api token is empty")]
    TokenEmpty,

    /// The base API URL is empty.
    #[error("base api url is empty")]
    BaseUrlEmpty,

    /// A URL could not be parsed.
    #[error("failed to parse url: {0}")]
    UrlParse(#[from] url::ParseError),

    /// The base API URL has no host component.
    #[error("base api url host is invalid")]
    InvalidHost,

    /// A header override is not a valid HTTP header value.
    #[error("invalid value for header {name}")]
    InvalidHeader {
        /// Header name
        name: &'static str,
    },

    /// The proxy URL was rejected by the HTTP client.
    #[error("invalid proxy: {0}")]
    InvalidProxy(#[source] reqwest::Error),

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    HttpClientBuild(#[source] reqwest::Error),

    /// The IMDb id argument is empty.
    #[error("imdb id param is empty")]
    EmptyImdbId,

    /// The movie name argument is empty.
    #[error("movie name param is empty")]
    EmptyMovieName,

    /// The KP id argument is not strictly positive.
    #[error("kp id param is invalid: {0}")]
    InvalidKpId(i64),

    /// The TMDb id argument is not strictly positive.
    #[error("tmdb id param is invalid: {0}")]
    InvalidTmdbId(i64),

    /// The page number argument is not strictly positive.
    #[error("page number param is invalid: {0}")]
    InvalidPageNumber(i64),

    /// The request endpoint URL is empty.
    #[error("endpoint api url is empty")]
    EmptyEndpointUrl,

    /// The HTTP exchange failed (connect, timeout, body read).
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The server answered with a status other than 200.
    #[error("unexpected server response with a status code: {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
    },

    /// The compressed response body could not be decoded.
    #[error("failed to decompress response body: {0}")]
    Decompress(#[source] std::io::Error),

    /// The server answered 200 with an empty body.
    #[error("empty response body, with status code: {status}")]
    EmptyResponseBody {
        /// HTTP status code
        status: u16,
    },

    /// The response body is not the expected JSON.
    #[error("failed to decode JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl AllohaError {
    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::TokenEmpty
            | Self::BaseUrlEmpty
            | Self::UrlParse(_)
            | Self::InvalidHost
            | Self::InvalidHeader { .. }
            | Self::InvalidProxy(_)
            | Self::HttpClientBuild(_) => ErrorKind::Configuration,
            Self::EmptyImdbId
            | Self::EmptyMovieName
            | Self::InvalidKpId(_)
            | Self::InvalidTmdbId(_)
            | Self::InvalidPageNumber(_)
            | Self::EmptyEndpointUrl => ErrorKind::Validation,
            Self::Http(_) | Self::UnexpectedStatus { .. } => ErrorKind::Transport,
            Self::Decompress(_) | Self::EmptyResponseBody { .. } | Self::Decode(_) => {
                ErrorKind::Decode
            }
        }
    }

    /// Returns the HTTP status code carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status } | Self::EmptyResponseBody { status } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Classifies a `reqwest` error raised while reading a response body.
    pub(crate) fn from_body_error(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decompress(std::io::Error::other(err))
        } else {
            Self::Http(err)
        }
    }
}
