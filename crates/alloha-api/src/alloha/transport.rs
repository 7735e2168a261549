//! HTTP exchange with the Alloha service.
#![allow(clippy::future_not_send)]

use std::io::Read;
use std::time::Duration;

use flate2::read::{DeflateDecoder, GzDecoder, ZlibDecoder};
use reqwest::header::{
    ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, CONTENT_ENCODING, CONTENT_TYPE, HeaderMap,
    HeaderValue, USER_AGENT,
};
use reqwest::{Body, Method, Request, Response, StatusCode};
use tracing::instrument;
use url::Url;

use super::endpoint::redacted;
use super::error::{AllohaError, Result};

/// Value of the `Accept` header.
pub const ACCEPT_JSON: &str = "application/json";

/// Value of the `Accept-Encoding` header.
pub const ACCEPT_ENCODINGS: &str = "gzip, deflate";

/// Value of the `Content-Type` header for requests with a body.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Default `Accept-Language` header value.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "ru-RU,ru;q=0.9,en-US;q=0.8,en;q=0.7";

/// Default `User-Agent` header value. The service rejects non-browser agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/89.0.4389.90 Safari/537.36";

/// Default per-request deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes prepared HTTP requests.
///
/// This is the integration seam of the client: the default implementation
/// is a pooled [`reqwest::Client`], tests and embedders may substitute
/// their own (proxying, recording, custom TLS).
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(HttpTransport: Send)]
pub trait LocalHttpTransport {
    /// Sends `request` and returns the response with its body unread.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails before a response arrives.
    async fn send(&self, request: Request) -> reqwest::Result<Response>;
}

impl HttpTransport for reqwest::Client {
    async fn send(&self, request: Request) -> reqwest::Result<Response> {
        self.execute(request).await
    }
}

/// Header values and deadline applied to every outbound request.
#[derive(Debug, Clone)]
pub struct RequestProfile {
    accept_language: HeaderValue,
    user_agent: HeaderValue,
    timeout: Option<Duration>,
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self {
            accept_language: HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE),
            user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT),
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

impl RequestProfile {
    /// Overrides the `Accept-Language` header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if `value` is not a valid header value.
    pub fn with_accept_language(mut self, value: &str) -> Result<Self> {
        self.accept_language = HeaderValue::from_str(value).map_err(|_| {
            AllohaError::InvalidHeader {
                name: "accept-language",
            }
        })?;
        Ok(self)
    }

    /// Overrides the `User-Agent` header.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHeader` if `value` is not a valid header value.
    pub fn with_user_agent(mut self, value: &str) -> Result<Self> {
        self.user_agent = HeaderValue::from_str(value)
            .map_err(|_| AllohaError::InvalidHeader { name: "user-agent" })?;
        Ok(self)
    }

    /// Sets the per-request deadline (`None` disables it).
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Per-request deadline.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Headers sent with every request.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(5);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_JSON));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPT_ENCODINGS));
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers
    }

    /// Builds a request for `endpoint` with the fixed headers.
    ///
    /// A non-empty `body` is attached with a JSON `Content-Type`.
    ///
    /// # Errors
    ///
    /// - `EmptyEndpointUrl` if `endpoint` is empty.
    /// - `UrlParse` if `endpoint` is not a URL.
    pub(crate) fn prepare(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Request> {
        if endpoint.is_empty() {
            return Err(AllohaError::EmptyEndpointUrl);
        }
        let url = Url::parse(endpoint)?;

        let mut request = Request::new(method, url);
        *request.headers_mut() = self.headers();
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_JSON));
            *request.body_mut() = Some(Body::from(body));
        }
        *request.timeout_mut() = self.timeout;
        Ok(request)
    }
}

/// Content codings decoded after the transport returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentCoding {
    Gzip,
    Deflate,
}

impl ContentCoding {
    /// Reads the coding a response body is still wrapped in.
    ///
    /// `reqwest` removes `Content-Encoding` once it has decoded the body
    /// itself, so only undecoded bodies match here.
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_ENCODING)?.to_str().ok()?.trim();
        if value.eq_ignore_ascii_case("gzip") || value.eq_ignore_ascii_case("x-gzip") {
            Some(Self::Gzip)
        } else if value.eq_ignore_ascii_case("deflate") {
            Some(Self::Deflate)
        } else {
            None
        }
    }

    /// Decompresses `body`.
    ///
    /// `deflate` is tried as zlib first, then as a raw DEFLATE stream.
    fn decode(self, body: &[u8]) -> Result<Vec<u8>> {
        match self {
            Self::Gzip => read_all(GzDecoder::new(body)),
            Self::Deflate => read_all(ZlibDecoder::new(body))
                .or_else(|_| read_all(DeflateDecoder::new(body))),
        }
    }
}

fn read_all(mut reader: impl Read) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(AllohaError::Decompress)?;
    Ok(out)
}

/// Raw outcome of an HTTP exchange.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Fully read, decompressed body.
    pub body: Vec<u8>,
}

/// Performs one HTTP exchange and reads the whole body into memory.
///
/// The status code is returned as-is; interpreting it is up to the caller.
/// A `gzip` or `deflate` body is decoded here unless the transport already
/// did. The response is dropped, and its connection released, on every
/// return path.
///
/// # Errors
///
/// - `Http` if the exchange or the body read fails.
/// - `Decompress` if the compressed body is malformed.
#[instrument(skip_all)]
pub(crate) async fn do_request<T>(transport: &T, request: Request) -> Result<RawResponse>
where
    T: HttpTransport + ?Sized,
{
    tracing::debug!(
        method = %request.method(),
        url = %redacted(request.url()),
        "Alloha API request"
    );

    let response = HttpTransport::send(transport, request)
        .await
        .map_err(AllohaError::Http)?;

    let status = response.status();
    let coding = ContentCoding::from_headers(response.headers());
    let body = response
        .bytes()
        .await
        .map_err(AllohaError::from_body_error)?;

    let body = match coding {
        Some(coding) if !body.is_empty() => coding.decode(&body)?,
        _ => body.into(),
    };

    tracing::debug!(
        status = status.as_u16(),
        len = body.len(),
        ?coding,
        "Alloha API response"
    );

    Ok(RawResponse { status, body })
}
