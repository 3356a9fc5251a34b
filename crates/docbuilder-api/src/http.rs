//! HTTP implementation of the remote boundary
//!
//! Thin JSON client over the Action Center REST API. All non-2xx responses
//! map uniformly to [`ApiError::Status`]; transport failures to
//! [`ApiError::Transport`]. No retries here: the user re-triggering an
//! action is the retry policy.

use crate::client::DocbuilderApi;
use crate::error::ApiError;
use crate::types::{
    AnswerFilter, AnswerRecord, PreviewContent, RenderMode, SubmitAnswerRequest,
    SubmittableMeta, SubmittableStatus,
};
use async_trait::async_trait;
use docbuilder_model::{Document, DocumentId, OrganizationId, QuestionId, SectionId};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// REST client for the Action Center API
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    bearer_token: Option<String>,
}

impl HttpApi {
    /// Create a client against the given base URL (no trailing slash)
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            bearer_token: None,
        }
    }

    /// With a bearer token attached to every request
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        let response = self.send(self.client.get(self.url(path))).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn mode_param(mode: RenderMode) -> &'static str {
    match mode {
        RenderMode::Preview => "preview",
        RenderMode::Published => "published",
    }
}

#[async_trait]
impl DocbuilderApi for HttpApi {
    async fn fetch_document(&self, slug: &str) -> Result<Document, ApiError> {
        self.get_json(&format!("/docbuilders/{slug}")).await
    }

    async fn fetch_submittable_meta(
        &self,
        document: DocumentId,
        organization: OrganizationId,
    ) -> Result<SubmittableStatus, ApiError> {
        let meta: SubmittableMeta = self
            .get_json(&format!(
                "/docbuilders/{document}/meta?organization={organization}"
            ))
            .await?;
        Ok(meta.status)
    }

    async fn fetch_answers(&self, filter: AnswerFilter) -> Result<Vec<AnswerRecord>, ApiError> {
        let path = match filter {
            AnswerFilter::Document {
                organization,
                document,
            } => format!("/answers?organization={organization}&docbuilder={document}"),
            AnswerFilter::Subsection {
                organization,
                subsection,
            } => format!("/answers?organization={organization}&subsection={subsection}"),
        };
        self.get_json(&path).await
    }

    async fn submit_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
        value: String,
    ) -> Result<AnswerRecord, ApiError> {
        debug!(%organization, %question, "submitting answer");
        let payload = SubmitAnswerRequest {
            organization_id: organization,
            question_id: question,
            value,
        };
        let response = self
            .send(self.client.post(self.url("/answers")).json(&payload))
            .await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn delete_answer(
        &self,
        organization: OrganizationId,
        question: QuestionId,
    ) -> Result<(), ApiError> {
        debug!(%organization, %question, "deleting answer");
        self.send(self.client.delete(self.url(&format!(
            "/answers?organization={organization}&question={question}"
        ))))
        .await?;
        Ok(())
    }

    async fn fetch_preview_document(
        &self,
        slug: &str,
        organization: OrganizationId,
        mode: RenderMode,
    ) -> Result<PreviewContent, ApiError> {
        self.get_json(&format!(
            "/docbuilders/{slug}/content?organization={organization}&mode={}",
            mode_param(mode)
        ))
        .await
    }

    async fn fetch_preview_section(
        &self,
        section: SectionId,
        organization: OrganizationId,
        mode: RenderMode,
    ) -> Result<PreviewContent, ApiError> {
        self.get_json(&format!(
            "/sections/{section}/content?organization={organization}&mode={}",
            mode_param(mode)
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_base_and_path() {
        let api = HttpApi::new("https://api.example.test/v1");
        assert_eq!(
            api.url("/docbuilders/plan"),
            "https://api.example.test/v1/docbuilders/plan"
        );
    }

    #[test]
    fn mode_params() {
        assert_eq!(mode_param(RenderMode::Preview), "preview");
        assert_eq!(mode_param(RenderMode::Published), "published");
    }
}
