//! Calls the proxy and records each successful interaction locally.

use crate::{
    prompt::{CodeTask, ContentTask, TaskType},
    server::{AiResponse, ChatRequest, CodeHelperRequest, SummarizerRequest},
    store::{FavoriteEntry, HistoryEntry, HistoryStore, KeyValueStore, StoreError},
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Input is empty")]
    EmptyInput,
    /// Another request from this client has not finished yet.
    #[error("A request is already in progress")]
    Busy,
    #[error("Backend error: {status} - {message}")]
    Backend { status: StatusCode, message: String },
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// One client per user. Requests are serialized by a loading flag: while a
/// call is in flight, further calls fail with [`ClientError::Busy`].
pub struct AssistantClient<S> {
    http: Client,
    base_url: String,
    history: HistoryStore<S>,
    loading: AtomicBool,
}

/// Clears the loading flag when the call finishes, however it finishes.
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: KeyValueStore> AssistantClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self::with_client(Client::new(), base_url, store)
    }

    pub fn with_client(http: Client, base_url: impl Into<String>, store: S) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            history: HistoryStore::new(store),
            loading: AtomicBool::new(false),
        }
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub async fn chat(&self, prompt: &str) -> Result<String, ClientError> {
        if prompt.trim().is_empty() {
            return Err(ClientError::EmptyInput);
        }
        let body = ChatRequest {
            prompt: Some(prompt.to_string()),
        };
        self.run(TaskType::Chat, "/chat", &body, || {
            HistoryEntry::new(TaskType::Chat, prompt, "")
        })
        .await
    }

    pub async fn analyze_code(
        &self,
        code: &str,
        task: CodeTask,
        language: &str,
    ) -> Result<String, ClientError> {
        if code.trim().is_empty() {
            return Err(ClientError::EmptyInput);
        }
        let body = CodeHelperRequest {
            code: Some(code.to_string()),
            task: Some(task.as_str().to_string()),
            language: Some(language.to_string()),
        };
        let task = TaskType::Code(task);
        self.run(task, "/code-helper", &body, || {
            HistoryEntry::new(task, code, "").with_language(language)
        })
        .await
    }

    pub async fn generate_content(&self, text: &str, task: ContentTask) -> Result<String, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyInput);
        }
        let body = SummarizerRequest {
            text: Some(text.to_string()),
            task: Some(task.as_str().to_string()),
        };
        let task = TaskType::Content(task);
        self.run(task, "/summarizer", &body, || HistoryEntry::new(task, text, ""))
            .await
    }

    pub fn add_favorite(
        &self,
        entry_type: &str,
        content: &str,
    ) -> Result<FavoriteEntry, ClientError> {
        Ok(self.history.add_favorite(entry_type, content)?)
    }

    /// Post `body`, then append exactly one history entry for `task` before
    /// releasing the loading flag. Nothing is recorded on failure.
    async fn run<B, F>(
        &self,
        task: TaskType,
        path: &str,
        body: &B,
        entry: F,
    ) -> Result<String, ClientError>
    where
        B: Serialize + ?Sized,
        F: FnOnce() -> HistoryEntry,
    {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy);
        }
        let _guard = LoadingGuard(&self.loading);

        let output = self.post(path, body).await?;

        let entry = HistoryEntry {
            output: output.clone(),
            ..entry()
        };
        self.history.record(task, entry)?;
        tracing::debug!(%task, "recorded interaction");

        Ok(output)
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String, ClientError> {
        let url = format!("{}{path}", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.error)
                .unwrap_or_else(|| "Unknown error".to_string());
            tracing::warn!(%status, %message, url = %url, "backend request failed");
            return Err(ClientError::Backend { status, message });
        }

        Ok(response.json::<AiResponse>().await?.ai_response)
    }
}
