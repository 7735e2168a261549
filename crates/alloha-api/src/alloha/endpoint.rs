//! Base endpoint construction and query parameter injection.

use url::{ParseError, Url};

use super::error::{AllohaError, Result};

/// Query parameter that carries the API token.
pub(crate) const TOKEN_PARAM: &str = "token";

/// Builds the base endpoint URL for `api_token` and `base_api_url`.
///
/// The path is forced to `/`, every existing query parameter and the
/// fragment are dropped, and `token` is set to `api_token`.
///
/// # Errors
///
/// - `TokenEmpty` if `api_token` is empty.
/// - `BaseUrlEmpty` if `base_api_url` is empty.
/// - `UrlParse` if `base_api_url` is not a URL.
/// - `InvalidHost` if the URL has no host.
pub fn build_api_url(api_token: &str, base_api_url: &str) -> Result<Url> {
    if api_token.is_empty() {
        return Err(AllohaError::TokenEmpty);
    }
    if base_api_url.is_empty() {
        return Err(AllohaError::BaseUrlEmpty);
    }

    let mut url = match Url::parse(base_api_url) {
        Ok(url) => url,
        Err(ParseError::EmptyHost) => return Err(AllohaError::InvalidHost),
        Err(err) => return Err(AllohaError::UrlParse(err)),
    };
    if url.host_str().is_none_or(str::is_empty) {
        return Err(AllohaError::InvalidHost);
    }

    url.set_path("/");
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair(TOKEN_PARAM, api_token);

    Ok(url)
}

/// Returns a copy of `base` with each `(key, value)` pair set, replacing
/// any previous occurrence of the key.
pub(crate) fn with_query_params(base: &Url, params: &[(&str, &str)]) -> Url {
    let kept: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(key, _)| k == key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.extend_pairs(kept);
        pairs.extend_pairs(params.iter().copied());
    }
    url
}

/// Renders `url` for diagnostics with the token value masked.
pub(crate) fn redacted(url: &Url) -> String {
    if !url.query_pairs().any(|(k, _)| k == TOKEN_PARAM) {
        return url.to_string();
    }
    let masked: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == TOKEN_PARAM {
                String::from("***")
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();

    let mut copy = url.clone();
    copy.set_query(None);
    copy.query_pairs_mut().extend_pairs(masked);
    copy.to_string()
}
