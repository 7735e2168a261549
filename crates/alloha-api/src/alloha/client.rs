//! `AllohaClient` - Alloha API client implementation.

use std::fmt;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::api::AllohaApi;
use super::config::AllohaConfig;
use super::endpoint::{build_api_url, redacted, with_query_params};
use super::error::{AllohaError, Result};
use super::transport::{HttpTransport, RawResponse, RequestProfile, do_request};
use super::types::{FindListResponse, FindOneResponse, LatestSeriesResponse, decode};

/// Default base URL of the Alloha API.
pub const DEFAULT_BASE_URL: &str = "https://api.alloha.tv";

/// Alloha API client.
///
/// Lookups take `&self` and may run concurrently when the transport
/// allows it. The setters take `&mut self`, so reconfiguring a shared
/// client needs external synchronization.
#[allow(clippy::module_name_repetitions)]
pub struct AllohaClient<T = reqwest::Client> {
    /// HTTP transport.
    transport: T,
    /// API token.
    api_token: String,
    /// Base endpoint URL with the token embedded.
    base_url: Url,
    /// Headers and deadline for every request.
    profile: RequestProfile,
}

impl<T> fmt::Debug for AllohaClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllohaClient")
            .field("base_url", &redacted(&self.base_url))
            .field("profile", &self.profile)
            .finish_non_exhaustive()
    }
}

/// Builder for a `reqwest`-backed `AllohaClient`.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct AllohaClientBuilder {
    base_url: Option<String>,
    api_token: Option<String>,
    timeout: Option<Duration>,
    proxy: Option<String>,
    accept_language: Option<String>,
    user_agent: Option<String>,
}

impl AllohaClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_token: None,
            timeout: None,
            proxy: None,
            accept_language: None,
            user_agent: None,
        }
    }

    /// Creates a builder from deserialized settings.
    #[must_use]
    pub fn from_config(config: &AllohaConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            api_token: Some(config.api_token.clone()),
            timeout: config.timeout(),
            proxy: config.proxy.clone(),
            accept_language: config.accept_language.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Overrides the base URL (for wiremock in tests).
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the API token (required).
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes all requests through `proxy`.
    #[must_use]
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Overrides the `Accept-Language` header.
    #[must_use]
    pub fn accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = Some(value.into());
        self
    }

    /// Overrides the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = Some(value.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `TokenEmpty` if `api_token` is not set or empty.
    /// - Any URL Builder error for the base URL.
    /// - `InvalidHeader` for a bad header override.
    /// - `InvalidProxy` or `HttpClientBuild` if `reqwest::Client` build fails.
    pub fn build(self) -> Result<AllohaClient> {
        let api_token = self.api_token.unwrap_or_default();
        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        let mut profile = RequestProfile::default();
        if let Some(timeout) = self.timeout {
            profile = profile.with_timeout(Some(timeout));
        }
        if let Some(ref value) = self.accept_language {
            profile = profile.with_accept_language(value)?;
        }
        if let Some(ref value) = self.user_agent {
            profile = profile.with_user_agent(value)?;
        }

        let mut http_builder = reqwest::Client::builder().gzip(true).deflate(true);
        if let Some(ref proxy) = self.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(AllohaError::InvalidProxy)?;
            http_builder = http_builder.proxy(proxy);
        }

        let http_client = http_builder.build().map_err(AllohaError::HttpClientBuild)?;

        Ok(AllohaClient::with_transport(http_client, &api_token, base_url)?.with_profile(profile))
    }
}

impl AllohaClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> AllohaClientBuilder {
        AllohaClientBuilder::new()
    }
}

impl<T> AllohaClient<T> {
    /// Creates a client over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Any URL Builder error for `api_token` and `base_api_url`.
    pub fn with_transport(transport: T, api_token: &str, base_api_url: &str) -> Result<Self> {
        let base_url = build_api_url(api_token, base_api_url)?;

        Ok(Self {
            transport,
            api_token: String::from(api_token),
            base_url,
            profile: RequestProfile::default(),
        })
    }

    /// Replaces the request headers and deadline.
    #[must_use]
    pub fn with_profile(mut self, profile: RequestProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Sets a new API token.
    ///
    /// The client is left unchanged on error.
    ///
    /// # Errors
    ///
    /// Any URL Builder error, e.g. `TokenEmpty`.
    pub fn set_api_token(&mut self, api_token: &str) -> Result<()> {
        let base_url = build_api_url(api_token, self.base_url.as_str())?;

        self.api_token = String::from(api_token);
        self.base_url = base_url;
        Ok(())
    }

    /// Sets a new base API URL.
    ///
    /// The client is left unchanged on error.
    ///
    /// # Errors
    ///
    /// Any URL Builder error, e.g. `BaseUrlEmpty` or `InvalidHost`.
    pub fn set_base_api_url(&mut self, base_api_url: &str) -> Result<()> {
        self.base_url = build_api_url(&self.api_token, base_api_url)?;
        Ok(())
    }

    /// Current API token.
    #[must_use]
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Base endpoint URL, token included.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request headers and deadline.
    #[must_use]
    pub const fn profile(&self) -> &RequestProfile {
        &self.profile
    }

    /// Underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: HttpTransport + Sync> AllohaClient<T> {
    /// Sends a raw request with the client's headers and deadline.
    ///
    /// The status code is not interpreted.
    ///
    /// # Errors
    ///
    /// - `EmptyEndpointUrl` or `UrlParse` for a bad `endpoint`.
    /// - `Http` or `Decompress` if the exchange fails.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Vec<u8>>,
    ) -> Result<RawResponse> {
        let request = self.profile.prepare(method, endpoint, body)?;
        do_request(&self.transport, request).await
    }

    /// Sends a GET with `params` added to the base URL and decodes a
    /// 200 response.
    #[instrument(skip_all)]
    async fn get_json<R: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<R> {
        let url = with_query_params(&self.base_url, params);
        let raw = self.request(Method::GET, url.as_str(), None).await?;

        if raw.status != StatusCode::OK {
            return Err(AllohaError::UnexpectedStatus {
                status: raw.status.as_u16(),
            });
        }
        if raw.body.is_empty() {
            return Err(AllohaError::EmptyResponseBody {
                status: raw.status.as_u16(),
            });
        }

        decode(&raw.body)
    }
}

impl<T: HttpTransport + Sync> AllohaApi for AllohaClient<T> {
    #[instrument(skip_all)]
    async fn find_by_imdb_id(&self, imdb_id: &str) -> Result<FindOneResponse> {
        if imdb_id.is_empty() {
            return Err(AllohaError::EmptyImdbId);
        }
        self.get_json(&[("imdb", imdb_id)]).await
    }

    #[instrument(skip_all)]
    async fn find_by_kp_id(&self, kp_id: i64) -> Result<FindOneResponse> {
        if kp_id <= 0 {
            return Err(AllohaError::InvalidKpId(kp_id));
        }
        let kp_id = kp_id.to_string();
        self.get_json(&[("kp", kp_id.as_str())]).await
    }

    #[instrument(skip_all)]
    async fn find_by_tmdb_id(&self, tmdb_id: i64) -> Result<FindOneResponse> {
        if tmdb_id <= 0 {
            return Err(AllohaError::InvalidTmdbId(tmdb_id));
        }
        let tmdb_id = tmdb_id.to_string();
        self.get_json(&[("tmdb", tmdb_id.as_str())]).await
    }

    #[instrument(skip_all)]
    async fn search_one_by_name(&self, name: &str) -> Result<FindOneResponse> {
        if name.is_empty() {
            return Err(AllohaError::EmptyMovieName);
        }
        self.get_json(&[("name", name)]).await
    }

    #[instrument(skip_all)]
    async fn search_by_name(&self, name: &str, page: i64) -> Result<FindListResponse> {
        if name.is_empty() {
            return Err(AllohaError::EmptyMovieName);
        }
        if page < 1 {
            return Err(AllohaError::InvalidPageNumber(page));
        }
        let page = page.to_string();
        self.get_json(&[("name", name), ("list", ""), ("page", page.as_str())])
            .await
    }

    #[instrument(skip_all)]
    async fn latest_series(&self, page: i64) -> Result<LatestSeriesResponse> {
        if page < 1 {
            return Err(AllohaError::InvalidPageNumber(page));
        }
        let page = page.to_string();
        self.get_json(&[("list", "serial"), ("page", page.as_str())]).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use reqwest::{Request, Response};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::alloha::error::ErrorKind;
    use crate::alloha::types::ResponseStatus;

    /// Transport that counts the requests it forwards.
    #[derive(Debug, Default)]
    struct CountingTransport {
        inner: reqwest::Client,
        calls: AtomicUsize,
    }

    impl CountingTransport {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HttpTransport for CountingTransport {
        async fn send(&self, request: Request) -> reqwest::Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(request).await
        }
    }

    fn test_client(mock_server: &MockServer) -> AllohaClient {
        AllohaClient::builder()
            .base_url(mock_server.uri())
            .api_token("test-api-key")
            .build()
            .unwrap()
    }

    fn error_body() -> &'static str {
        include_str!("../../../../fixtures/alloha/find_one_error.json")
    }

    fn success_body() -> &'static str {
        include_str!("../../../../fixtures/alloha/find_one_success.json")
    }

    #[test]
    fn test_builder_requires_api_token() {
        // Act
        let result = AllohaClient::builder().build();

        // Assert
        assert!(matches!(result, Err(AllohaError::TokenEmpty)));
    }

    #[test]
    fn test_builder_uses_default_base_url() {
        // Act
        let client = AllohaClient::builder().api_token("t").build().unwrap();

        // Assert
        assert_eq!(client.base_url().as_str(), "https://api.alloha.tv/?token=t");
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        // Act
        let result = AllohaClient::builder()
            .api_token("t")
            .base_url("http://")
            .build();

        // Assert
        assert!(matches!(result, Err(AllohaError::InvalidHost)));
    }

    #[test]
    fn test_builder_applies_overrides() {
        // Act
        let client = AllohaClient::builder()
            .api_token("t")
            .timeout(Duration::from_secs(5))
            .proxy("http://127.0.0.1:3128")
            .user_agent("alloha-api/0.1")
            .build()
            .unwrap();

        // Assert
        assert_eq!(client.profile().timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_builder_rejects_invalid_header_override() {
        // Act
        let result = AllohaClient::builder()
            .api_token("t")
            .accept_language("ru\r\n")
            .build();

        // Assert
        assert!(matches!(result, Err(AllohaError::InvalidHeader { .. })));
    }

    #[test]
    fn test_builder_from_config() {
        // Arrange
        let config = AllohaConfig {
            api_token: String::from("from-config"),
            base_url: Some(String::from("http://localhost:8080/api")),
            timeout_secs: Some(3),
            ..AllohaConfig::default()
        };

        // Act
        let client = AllohaClientBuilder::from_config(&config).build().unwrap();

        // Assert
        assert_eq!(client.api_token(), "from-config");
        assert_eq!(
            client.base_url().as_str(),
            "http://localhost:8080/?token=from-config"
        );
        assert_eq!(client.profile().timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_debug_hides_token() {
        // Arrange
        let client = AllohaClient::builder().api_token("secret").build().unwrap();

        // Act
        let rendered = format!("{client:?}");

        // Assert
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_set_api_token_rebuilds_url() {
        // Arrange
        let mut client = AllohaClient::builder().api_token("old").build().unwrap();

        // Act
        client.set_api_token("new").unwrap();

        // Assert
        assert_eq!(client.api_token(), "new");
        assert_eq!(client.base_url().as_str(), "https://api.alloha.tv/?token=new");
    }

    #[test]
    fn test_set_base_api_url_keeps_token() {
        // Arrange
        let mut client = AllohaClient::builder().api_token("t").build().unwrap();

        // Act
        client
            .set_base_api_url("https://mirror.example.com/v2?x=1")
            .unwrap();

        // Assert
        assert_eq!(
            client.base_url().as_str(),
            "https://mirror.example.com/?token=t"
        );
    }

    #[test]
    fn test_failed_setters_leave_client_unchanged() {
        // Arrange
        let mut client = AllohaClient::builder().api_token("old").build().unwrap();
        let before = client.base_url().clone();

        // Act
        let token_result = client.set_api_token("");
        let url_result = client.set_base_api_url("http://");
        let empty_result = client.set_base_api_url("");

        // Assert
        assert!(matches!(token_result, Err(AllohaError::TokenEmpty)));
        assert!(matches!(url_result, Err(AllohaError::InvalidHost)));
        assert!(matches!(empty_result, Err(AllohaError::BaseUrlEmpty)));
        assert_eq!(client.api_token(), "old");
        assert_eq!(client.base_url(), &before);
    }

    #[tokio::test]
    async fn test_invalid_arguments_make_no_request() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(0)
            .mount(&mock_server)
            .await;
        let client =
            AllohaClient::with_transport(CountingTransport::default(), "t", &mock_server.uri())
                .unwrap();

        // Act & Assert
        assert!(matches!(
            client.find_by_imdb_id("").await,
            Err(AllohaError::EmptyImdbId)
        ));
        assert!(matches!(
            client.find_by_kp_id(0).await,
            Err(AllohaError::InvalidKpId(0))
        ));
        assert!(matches!(
            client.find_by_kp_id(-7).await,
            Err(AllohaError::InvalidKpId(-7))
        ));
        assert!(matches!(
            client.find_by_tmdb_id(0).await,
            Err(AllohaError::InvalidTmdbId(0))
        ));
        assert!(matches!(
            client.find_by_tmdb_id(-1).await,
            Err(AllohaError::InvalidTmdbId(-1))
        ));
        assert!(matches!(
            client.search_one_by_name("").await,
            Err(AllohaError::EmptyMovieName)
        ));
        assert!(matches!(
            client.search_by_name("", 1).await,
            Err(AllohaError::EmptyMovieName)
        ));
        assert!(matches!(
            client.search_by_name("Преступники", 0).await,
            Err(AllohaError::InvalidPageNumber(0))
        ));
        assert!(matches!(
            client.latest_series(-1).await,
            Err(AllohaError::InvalidPageNumber(-1))
        ));
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_find_by_imdb_id_status_response_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("imdb", "tt-id"))
            .and(query_param("token", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.find_by_imdb_id("tt-id").await.unwrap();

        // Assert
        assert!(response.is_error());
        assert_eq!(response.error_info.as_deref(), Some("not found"));
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_find_by_imdb_id_status_response_success() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("imdb", "tt9849888"))
            .and(query_param("token", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(success_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.find_by_imdb_id("tt9849888").await.unwrap();

        // Assert
        assert!(response.is_success());
        let movie = response.data.unwrap();
        assert_eq!(movie.id_imdb.as_deref(), Some("tt9849888"));
        assert_eq!(movie.seasons_count, 1);
    }

    #[tokio::test]
    async fn test_find_by_kp_id_status_response_success() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("kp", "1229734"))
            .and(query_param("token", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(success_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.find_by_kp_id(1_229_734).await.unwrap();

        // Assert
        assert_eq!(response.data.unwrap().id_kp, 1_229_734);
    }

    #[tokio::test]
    async fn test_find_by_tmdb_id_status_response_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("tmdb", "21029674"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.find_by_tmdb_id(21_029_674).await.unwrap();

        // Assert
        assert!(response.is_error());
    }

    #[tokio::test]
    async fn test_search_one_by_name_sends_cyrillic_title() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("name", "Преступники"))
            .and(query_param("token", "test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(success_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.search_one_by_name("Преступники").await.unwrap();

        // Assert
        assert_eq!(response.data.unwrap().name, "Преступники");
    }

    #[tokio::test]
    async fn test_search_by_name_pages() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/alloha/find_list_success.json");
        Mock::given(method("GET"))
            .and(query_param("name", "Преступники"))
            .and(query_param("list", ""))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.search_by_name("Преступники", 1).await.unwrap();

        // Assert
        assert_eq!(response.next_page, Some(2));
        assert_eq!(response.data.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_latest_series() {
        // Arrange
        let mock_server = MockServer::start().await;
        let json_body = include_str!("../../../../fixtures/alloha/latest_series_success.json");
        Mock::given(method("GET"))
            .and(query_param("list", "serial"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.latest_series(2).await.unwrap();

        // Assert
        assert_eq!(response.prev_page, Some(1));
        assert_eq!(response.data.unwrap()[0].id_kp, 1_229_734);
    }

    #[tokio::test]
    async fn test_non_200_status_is_transport_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(success_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let err = client.find_by_kp_id(1).await.unwrap_err();

        // Assert
        assert!(matches!(err, AllohaError::UnexpectedStatus { status: 500 }));
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_non_200_status_is_checked_before_decoding() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<html>nope</html>"))
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let err = client.find_by_imdb_id("tt0110912").await.unwrap_err();

        // Assert
        assert!(matches!(err, AllohaError::UnexpectedStatus { status: 404 }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"#))
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let err = client.find_by_tmdb_id(57_532).await.unwrap_err();

        // Assert
        assert!(matches!(err, AllohaError::Decode(_)));
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_empty_body_is_reported() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let err = client.find_by_tmdb_id(57_532).await.unwrap_err();

        // Assert
        assert!(matches!(err, AllohaError::EmptyResponseBody { status: 200 }));
    }

    #[tokio::test]
    async fn test_gzip_response_is_decoded() {
        // Arrange
        let mock_server = MockServer::start().await;
        let gzipped = include_bytes!("../../../../fixtures/alloha/find_one_error.json.gz");
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Encoding", "gzip")
                    .set_body_bytes(gzipped.to_vec()),
            )
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let response = client.find_by_imdb_id("tt-id").await.unwrap();

        // Assert
        assert_eq!(response.error_info.as_deref(), Some("not found"));
    }

    #[tokio::test]
    async fn test_failed_set_api_token_keeps_old_token_on_the_wire() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("token", "old-token"))
            .and(query_param("kp", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(1)
            .mount(&mock_server)
            .await;
        let mut client = AllohaClient::builder()
            .base_url(mock_server.uri())
            .api_token("old-token")
            .build()
            .unwrap();

        // Act
        let set_result = client.set_api_token("");
        let response = client.find_by_kp_id(1).await;

        // Assert
        assert!(set_result.is_err());
        assert!(response.is_ok());
    }

    #[tokio::test]
    async fn test_custom_transport_is_used() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(2)
            .mount(&mock_server)
            .await;
        let client =
            AllohaClient::with_transport(CountingTransport::default(), "t", &mock_server.uri())
                .unwrap();

        // Act
        client.find_by_kp_id(1).await.unwrap();
        client.find_by_tmdb_id(2).await.unwrap();

        // Assert
        assert_eq!(client.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_transport_compressed_body_is_decoded() {
        // Arrange
        let mock_server = MockServer::start().await;
        let gzipped = include_bytes!("../../../../fixtures/alloha/find_one_error.json.gz");
        Mock::given(method("GET"))
            .and(query_param("imdb", "tt-id"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Content-Encoding", "gzip")
                    .set_body_bytes(gzipped.to_vec()),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let transport = CountingTransport {
            inner: reqwest::Client::builder()
                .gzip(false)
                .deflate(false)
                .build()
                .unwrap(),
            calls: AtomicUsize::new(0),
        };
        let client = AllohaClient::with_transport(transport, "t", &mock_server.uri()).unwrap();

        // Act
        let response = client.find_by_imdb_id("tt-id").await.unwrap();

        // Assert
        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.error_info.as_deref(), Some("not found"));
        assert_eq!(client.transport().calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_client() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(error_body()))
            .expect(4)
            .mount(&mock_server)
            .await;
        let client = Arc::new(test_client(&mock_server));

        // Act
        let handles: Vec<_> = (1..=4)
            .map(|kp_id| {
                let client = Arc::clone(&client);
                tokio::spawn(async move { client.find_by_kp_id(kp_id).await })
            })
            .collect();

        // Assert
        for handle in handles {
            assert!(handle.await.unwrap().unwrap().is_error());
        }
    }

    #[tokio::test]
    async fn test_dropped_future_cancels_request() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(error_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let start = std::time::Instant::now();
        let result =
            tokio::time::timeout(Duration::from_millis(100), client.find_by_kp_id(1)).await;

        // Assert
        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_client_timeout_is_transport_error() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(error_body())
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&mock_server)
            .await;
        let client = AllohaClient::builder()
            .base_url(mock_server.uri())
            .api_token("t")
            .timeout(Duration::from_millis(100))
            .build()
            .unwrap();

        // Act
        let err = client.find_by_kp_id(1).await.unwrap_err();

        // Assert
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert!(matches!(err, AllohaError::Http(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_raw_request_returns_status_unjudged() {
        // Arrange
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .expect(1)
            .mount(&mock_server)
            .await;
        let client = test_client(&mock_server);

        // Act
        let raw = client
            .request(Method::POST, &mock_server.uri(), Some(b"{}".to_vec()))
            .await
            .unwrap();

        // Assert
        assert_eq!(raw.status.as_u16(), 418);
        assert_eq!(raw.body, b"teapot");
    }
}
