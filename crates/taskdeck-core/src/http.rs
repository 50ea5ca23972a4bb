use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use taskdeck_shared::{ApiErrorBody, TaskDto, TaskId, TaskPayload};
use tracing::{debug, instrument, warn};

use crate::api::{ApiError, TaskApi};
use crate::datetime::local_now;
use crate::task::Task;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/tasks";

/// [`TaskApi`] over the backend's REST endpoints.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: Client,
    base_url: String,
}

impl HttpTaskApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Transport(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self), fields(base = %self.base_url))]
    pub async fn get(&self, id: TaskId) -> Result<Task, ApiError> {
        let body = send(self.client.get(self.task_url(id))).await?;
        let dto: TaskDto = decode(&body)?;
        Ok(Task::from_dto(dto, local_now()))
    }

    /// Hits the backend's health probe and returns its text.
    #[instrument(skip(self), fields(base = %self.base_url))]
    pub async fn ping(&self) -> Result<String, ApiError> {
        let url = format!("{}/test", self.base_url);
        let body = send(self.client.get(url)).await?;
        Ok(String::from_utf8_lossy(&body).trim().to_string())
    }

    fn task_url(&self, id: TaskId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    fn with_payload(&self, request: RequestBuilder, payload: &TaskPayload) -> Result<RequestBuilder, ApiError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| ApiError::Decode(format!("failed to encode payload: {err}")))?;
        Ok(request.header(CONTENT_TYPE, "application/json").body(body))
    }
}

impl TaskApi for HttpTaskApi {
    #[instrument(skip(self), fields(base = %self.base_url))]
    async fn list(&self) -> Result<Vec<Task>, ApiError> {
        let body = send(self.client.get(&self.base_url)).await?;
        let dtos: Vec<TaskDto> = decode(&body)?;
        let now = local_now();
        debug!(count = dtos.len(), "fetched tasks");
        Ok(dtos.into_iter().map(|dto| Task::from_dto(dto, now)).collect())
    }

    #[instrument(skip(self, payload), fields(base = %self.base_url, title_len = payload.title.len()))]
    async fn create(&self, payload: TaskPayload) -> Result<Task, ApiError> {
        let request = self.with_payload(self.client.post(&self.base_url), &payload)?;
        let body = send(request).await?;
        let dto: TaskDto = decode(&body)?;
        Ok(Task::from_dto(dto, local_now()))
    }

    #[instrument(skip(self, payload), fields(base = %self.base_url, id = %id))]
    async fn update(&self, id: TaskId, payload: TaskPayload) -> Result<Task, ApiError> {
        let request = self.with_payload(self.client.put(self.task_url(id)), &payload)?;
        let body = send(request).await?;
        let dto: TaskDto = decode(&body)?;
        Ok(Task::from_dto(dto, local_now()))
    }

    #[instrument(skip(self), fields(base = %self.base_url, id = %id))]
    async fn delete(&self, id: TaskId) -> Result<(), ApiError> {
        send(self.client.delete(self.task_url(id))).await?;
        Ok(())
    }
}

async fn send(request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
    let response = request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;

    if status.is_success() {
        return Ok(body.to_vec());
    }

    let err = error_from_response(status.as_u16(), &body);
    warn!(status = status.as_u16(), error = %err, "request rejected");
    Err(err)
}

/// Non-2xx response to [`ApiError::Server`], lifting `message` out of a
/// JSON error body when there is one.
pub fn error_from_response(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.trim().is_empty());
    ApiError::Server { status, message }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Decode(err.to_string()))
}
