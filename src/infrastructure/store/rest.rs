//! Hosted backend adapter (Supabase-compatible REST API)
//!
//! Media goes to object storage, rows go through the PostgREST endpoint.

use std::fmt;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{ListFilter, NewTestimonial, SubmissionError, TestimonialStore};
use crate::domain::capture::CapturedArtifact;
use crate::domain::config::{DEFAULT_BUCKET, DEFAULT_TABLE};
use crate::domain::testimonial::{MediaType, Testimonial};

// Request types

#[derive(Debug, Serialize)]
struct InsertRow<'a> {
    name: &'a str,
    email: &'a str,
    company: Option<&'a str>,
    position: Option<&'a str>,
    text: &'a str,
    rating: u8,
    media_type: MediaType,
    media_url: Option<&'a str>,
    approved: bool,
}

#[derive(Debug, Serialize)]
struct ApprovalPatch {
    approved: bool,
}

// Response types

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    error: Option<String>,
}

/// REST client for the hosted testimonial backend
pub struct RestTestimonialStore {
    base_url: String,
    api_key: String,
    bucket: String,
    table: String,
    client: reqwest::Client,
}

// The API key stays out of debug output
impl fmt::Debug for RestTestimonialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestTestimonialStore")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl RestTestimonialStore {
    /// Create a store using the default bucket and table
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn rows_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn upload_url(&self, object: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, object)
    }

    /// Public URL of an uploaded object
    pub fn public_url(&self, object: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn returning(&self, request: RequestBuilder) -> RequestBuilder {
        self.authorized(request)
            .header("Prefer", "return=representation")
    }

    async fn send(request: RequestBuilder) -> Result<Response, SubmissionError> {
        let response = request
            .send()
            .await
            .map_err(|e| SubmissionError::Network(e.to_string()))?;
        Self::check_status(response).await
    }

    /// Map non-2xx statuses onto the failure taxonomy
    async fn check_status(response: Response) -> Result<Response, SubmissionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = Self::error_message(&body, status);
        tracing::warn!(status = status.as_u16(), "backend rejected request: {}", message);

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SubmissionError::Unauthorized,
            StatusCode::PAYLOAD_TOO_LARGE => SubmissionError::StorageQuota(message),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                SubmissionError::Validation(message)
            }
            _ => SubmissionError::Api {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn error_message(body: &str, status: StatusCode) -> String {
        serde_json::from_str::<ApiError>(body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    status.to_string()
                } else {
                    body.trim().to_string()
                }
            })
    }

    async fn rows(response: Response) -> Result<Vec<Testimonial>, SubmissionError> {
        response
            .json()
            .await
            .map_err(|e| SubmissionError::Parse(e.to_string()))
    }

    async fn upload(&self, artifact: &CapturedArtifact) -> Result<String, SubmissionError> {
        let object = artifact.object_name();
        tracing::debug!(%object, bytes = artifact.size_bytes(), "uploading media");

        let request = self
            .authorized(self.client.post(self.upload_url(&object)))
            .header(reqwest::header::CONTENT_TYPE, artifact.mime_type().as_str())
            .body(artifact.data().clone());
        Self::send(request).await?;

        Ok(self.public_url(&object))
    }

    fn id_filter(id: &str) -> Vec<(&'static str, String)> {
        vec![("select", "*".to_string()), ("id", format!("eq.{}", id))]
    }
}

#[async_trait]
impl TestimonialStore for RestTestimonialStore {
    async fn submit(&self, testimonial: &NewTestimonial) -> Result<Testimonial, SubmissionError> {
        let media_url = match &testimonial.media {
            Some(artifact) => Some(self.upload(artifact).await?),
            None => None,
        };

        let form = &testimonial.form;
        let row = InsertRow {
            name: &form.name,
            email: &form.email,
            company: form.company.as_deref(),
            position: form.position.as_deref(),
            text: &form.text,
            rating: form.rating,
            media_type: form.media_type,
            media_url: media_url.as_deref(),
            approved: false,
        };

        let request = self.returning(self.client.post(self.rows_url())).json(&row);
        let response = Self::send(request).await?;
        Self::rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SubmissionError::Parse("insert returned no row".to_string()))
    }

    async fn list(&self, filter: ListFilter) -> Result<Vec<Testimonial>, SubmissionError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        match filter {
            ListFilter::All => {}
            ListFilter::Approved => query.push(("approved", "eq.true".to_string())),
            ListFilter::Pending => query.push(("approved", "eq.false".to_string())),
        }

        let request = self.authorized(self.client.get(self.rows_url())).query(&query);
        let response = Self::send(request).await?;
        Self::rows(response).await
    }

    async fn get(&self, id: &str) -> Result<Option<Testimonial>, SubmissionError> {
        let request = self
            .authorized(self.client.get(self.rows_url()))
            .query(&Self::id_filter(id));
        let response = Self::send(request).await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn set_approved(
        &self,
        id: &str,
        approved: bool,
    ) -> Result<Option<Testimonial>, SubmissionError> {
        let request = self
            .returning(self.client.patch(self.rows_url()))
            .query(&Self::id_filter(id))
            .json(&ApprovalPatch { approved });
        let response = Self::send(request).await?;
        Ok(Self::rows(response).await?.into_iter().next())
    }

    async fn delete(&self, id: &str) -> Result<bool, SubmissionError> {
        let request = self
            .returning(self.client.delete(self.rows_url()))
            .query(&Self::id_filter(id));
        let response = Self::send(request).await?;
        Ok(!Self::rows(response).await?.is_empty())
    }
}
