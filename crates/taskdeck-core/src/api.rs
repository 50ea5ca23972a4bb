use std::future::Future;

use taskdeck_shared::{TaskId, TaskPayload};

use crate::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("server responded with status {status}")]
    Server { status: u16, message: Option<String> },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn server(status: u16, message: Option<&str>) -> Self {
        ApiError::Server {
            status,
            message: message.map(str::to_string),
        }
    }

    /// Message the server meant for the user, if it sent one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            ApiError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message.as_str()),
            _ => None,
        }
    }

    pub fn user_message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.user_message().unwrap_or(fallback)
    }
}

/// Remote task store.
pub trait TaskApi {
    fn list(&self) -> impl Future<Output = Result<Vec<Task>, ApiError>> + Send;

    fn create(&self, payload: TaskPayload) -> impl Future<Output = Result<Task, ApiError>> + Send;

    fn update(
        &self,
        id: TaskId,
        payload: TaskPayload,
    ) -> impl Future<Output = Result<Task, ApiError>> + Send;

    fn delete(&self, id: TaskId) -> impl Future<Output = Result<(), ApiError>> + Send;
}
