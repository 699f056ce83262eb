//! REST client for the framemark API.
//!
//! [`ApiClient`] wraps the HTTP endpoints with [`reqwest`];
//! [`HttpAnnotationStore`] and [`HttpVideoCatalog`] adapt it to the store
//! and catalog traits so a session can run against a remote server.

use async_trait::async_trait;
use framemark_core::annotation::{validate_video_id, Annotation, AnnotationPatch, NewAnnotation};
use framemark_core::error::StoreError;
use framemark_core::store::AnnotationStore;
use framemark_core::video::{Video, VideoCatalog};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// `{ "data": T }` response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// `{ "error": ..., "code": ... }` error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    code: String,
}

/// HTTP client for one framemark server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// * `base_url` - server root, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` extended by `segments`, each percent-encoded as a single
    /// path segment. Video ids are file stems and may contain `#`, `?`,
    /// `%` or spaces.
    fn endpoint<I>(&self, segments: I) -> Result<Url, StoreError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            StoreError::Transport(format!("Invalid base URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::Transport(format!("Base URL '{}' cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn annotations_url(&self, video_id: &str) -> Result<Url, StoreError> {
        validate_video_id(video_id)?;
        self.endpoint(["api", "annotations", video_id])
    }

    fn annotation_url(&self, video_id: &str, id: &str) -> Result<Url, StoreError> {
        validate_video_id(video_id)?;
        if id.is_empty() {
            return Err(StoreError::Validation("annotation id must not be empty".to_string()));
        }
        self.endpoint(["api", "annotations", video_id, id])
    }

    /// GET /api/videos
    pub async fn list_videos(&self) -> Result<Vec<Video>, StoreError> {
        let response = self
            .client
            .get(self.endpoint(["api", "videos"])?)
            .send()
            .await
            .map_err(transport)?;
        parse_data(response, None).await
    }

    /// GET /api/annotations/{video_id}
    pub async fn list_annotations(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError> {
        let response = self
            .client
            .get(self.annotations_url(video_id)?)
            .send()
            .await
            .map_err(transport)?;
        parse_data(response, None).await
    }

    /// POST /api/annotations/{video_id}
    pub async fn create_annotation(
        &self,
        video_id: &str,
        input: &NewAnnotation,
    ) -> Result<Annotation, StoreError> {
        let response = self
            .client
            .post(self.annotations_url(video_id)?)
            .json(input)
            .send()
            .await
            .map_err(transport)?;
        parse_data(response, None).await
    }

    /// PUT /api/annotations/{video_id}/{id}
    pub async fn update_annotation(
        &self,
        video_id: &str,
        id: &str,
        patch: &AnnotationPatch,
    ) -> Result<Annotation, StoreError> {
        let response = self
            .client
            .put(self.annotation_url(video_id, id)?)
            .json(patch)
            .send()
            .await
            .map_err(transport)?;
        parse_data(response, Some((video_id, id))).await
    }

    /// DELETE /api/annotations/{video_id}/{id}
    pub async fn delete_annotation(&self, video_id: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.annotation_url(video_id, id)?)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response, Some((video_id, id))).await?;
        Ok(())
    }
}

// ---- private helpers ----

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

/// Map a non-2xx response to a [`StoreError`].
///
/// A 404 `NOT_FOUND` for a single `record` (video id, annotation id) and
/// 400s come back as `NotFound` and `Validation`, so callers see the same
/// errors as with a local store.
async fn ensure_success(
    response: reqwest::Response,
    record: Option<(&str, &str)>,
) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().clone();
    let text = response.text().await.unwrap_or_default();
    let body = serde_json::from_str::<ErrorBody>(&text).ok();
    let message = body
        .as_ref()
        .map(|b| b.error.clone())
        .unwrap_or_else(|| text.clone());

    tracing::debug!(%url, status = status.as_u16(), code = ?body.as_ref().map(|b| &b.code), "API request failed");

    let not_found = body.as_ref().is_some_and(|b| b.code == "NOT_FOUND");
    match (status, record) {
        (StatusCode::NOT_FOUND, Some((video_id, id))) if not_found => Err(StoreError::NotFound {
            video_id: video_id.to_string(),
            id: id.to_string(),
        }),
        (StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY, _) => {
            Err(StoreError::Validation(message))
        }
        _ => Err(StoreError::Status {
            status: status.as_u16(),
            message,
        }),
    }
}

async fn parse_data<T: DeserializeOwned>(
    response: reqwest::Response,
    record: Option<(&str, &str)>,
) -> Result<T, StoreError> {
    let response = ensure_success(response, record).await?;
    let envelope: Envelope<T> = response.json().await.map_err(transport)?;
    Ok(envelope.data)
}

// ---------------------------------------------------------------------------
// Trait adapters
// ---------------------------------------------------------------------------

/// [`AnnotationStore`] backed by a remote framemark server.
#[derive(Debug, Clone)]
pub struct HttpAnnotationStore {
    api: ApiClient,
}

impl HttpAnnotationStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AnnotationStore for HttpAnnotationStore {
    async fn list(&self, video_id: &str) -> Result<Vec<Annotation>, StoreError> {
        self.api.list_annotations(video_id).await
    }

    async fn create(&self, video_id: &str, input: NewAnnotation) -> Result<Annotation, StoreError> {
        self.api.create_annotation(video_id, &input).await
    }

    async fn update(
        &self,
        video_id: &str,
        id: &str,
        patch: AnnotationPatch,
    ) -> Result<Annotation, StoreError> {
        self.api.update_annotation(video_id, id, &patch).await
    }

    async fn delete(&self, video_id: &str, id: &str) -> Result<(), StoreError> {
        self.api.delete_annotation(video_id, id).await
    }
}

/// [`VideoCatalog`] backed by a remote framemark server.
#[derive(Debug, Clone)]
pub struct HttpVideoCatalog {
    api: ApiClient,
}

impl HttpVideoCatalog {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl VideoCatalog for HttpVideoCatalog {
    async fn list_videos(&self) -> Result<Vec<Video>, StoreError> {
        self.api.list_videos().await
    }
}
