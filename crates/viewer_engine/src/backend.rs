use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use url::Url;
use viewer_logging::viewer_debug;

use crate::{EntitiesPayload, FailureKind, FetchError};

#[derive(Debug, Clone)]
pub struct BackendSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_image_bytes: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/".to_string(),
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            max_image_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Request/response surface of the analysis backend.
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    async fn save_source(&self, code: &str) -> Result<(), FetchError>;
    async fn delete_source(&self) -> Result<(), FetchError>;
    async fn get_ast(&self) -> Result<serde_json::Value, FetchError>;
    /// Raw encoded tree visualization.
    async fn get_tree(&self) -> Result<Bytes, FetchError>;
    async fn get_entities(&self) -> Result<EntitiesPayload, FetchError>;
    async fn run_pipeline(&self) -> Result<(), FetchError>;
    async fn end_session(&self) -> Result<(), FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: reqwest::Client,
    base: Url,
    max_image_bytes: u64,
}

impl ReqwestBackend {
    pub fn new(settings: BackendSettings) -> Result<Self, FetchError> {
        let base = parse_base_url(&settings.base_url)?;
        // Submitting answers with a 303 to an HTML page we have no use for.
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            client,
            base,
            max_image_bytes: settings.max_image_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn send(&self, request: RequestBuilder, allow_redirect: bool) -> Result<Response, FetchError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        viewer_debug!("{} -> {}", response.url(), status);
        if status.is_success() || (allow_redirect && status.is_redirection()) {
            Ok(response)
        } else {
            Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ))
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.get(url), false).await?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::Decode, err.to_string()))
    }

    async fn post_empty(&self, path: &str) -> Result<(), FetchError> {
        let url = self.endpoint(path)?;
        self.send(self.client.post(url), false).await.map(drop)
    }
}

#[async_trait::async_trait]
impl Backend for ReqwestBackend {
    async fn save_source(&self, code: &str) -> Result<(), FetchError> {
        let url = self.endpoint("submit")?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("code", code)
            .finish();
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body);
        self.send(request, true).await.map(drop)
    }

    async fn delete_source(&self) -> Result<(), FetchError> {
        let url = self.endpoint("source")?;
        self.send(self.client.delete(url), false).await.map(drop)
    }

    async fn get_ast(&self) -> Result<serde_json::Value, FetchError> {
        self.get_json("ast_json").await
    }

    async fn get_tree(&self) -> Result<Bytes, FetchError> {
        let url = self.endpoint("tree_img")?;
        let response = self.send(self.client.get(url), false).await?;

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !is_image_content_type(content_type) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: content_type.to_string(),
                    },
                    "expected an image",
                ));
            }
        }

        read_limited(response, self.max_image_bytes).await
    }

    async fn get_entities(&self) -> Result<EntitiesPayload, FetchError> {
        self.get_json("entities").await
    }

    async fn run_pipeline(&self) -> Result<(), FetchError> {
        self.post_empty("generate").await
    }

    async fn end_session(&self) -> Result<(), FetchError> {
        self.post_empty("end").await
    }
}

/// Parses `raw` so that relative endpoint paths join beneath it.
fn parse_base_url(raw: &str) -> Result<Url, FetchError> {
    let mut url = Url::parse(raw.trim())
        .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::new(
            FailureKind::InvalidUrl,
            format!("not an http(s) base url: {raw}"),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn is_image_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    essence
        .get(..6)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}

async fn read_limited(response: Response, max_bytes: u64) -> Result<Bytes, FetchError> {
    if let Some(content_len) = response.content_length() {
        if content_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(content_len),
                },
                "response too large",
            ));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(map_reqwest_error)?;
        let next_len = bytes.len() as u64 + chunk.len() as u64;
        if next_len > max_bytes {
            return Err(FetchError::new(
                FailureKind::TooLarge {
                    max_bytes,
                    actual: Some(next_len),
                },
                "response too large",
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(bytes))
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return FetchError::new(FailureKind::Decode, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
