//! HTTP client for the answer backend.
//!
//! Two endpoints: `POST /api/chat` answers a single question, and
//! `POST /api/reload` re-indexes the document corpus. Both are wrapped in
//! typed request/response structs so the rest of the app never sees JSON.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Answering can involve a full retrieval pass over a large corpus.
const ASK_TIMEOUT: Duration = Duration::from_secs(120);
/// Re-indexing re-reads every document; give it much longer.
const RELOAD_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Serialize)]
struct AskRequest {
    question: String,
}

#[derive(Deserialize)]
struct AskResponse {
    answer: String,
}

#[derive(Deserialize)]
struct ReloadResponse {
    #[serde(default)]
    chunks: u64,
}

#[derive(Deserialize)]
struct ReloadFailure {
    status: Option<String>,
}

/// Failure of a backend round-trip.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a non-success status. `detail` carries the
    /// `status` field of the failure body when the backend sent one.
    #[error("backend returned {status}")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// The request never completed, or the response body was malformed.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl BackendError {
    /// Backend-supplied failure detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            BackendError::Transport(_) => None,
        }
    }
}

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask one question; returns the backend's answer text verbatim.
    pub async fn ask(&self, question: &str) -> Result<String, BackendError> {
        let url = format!("{}/api/chat", self.base_url);

        let request = AskRequest {
            question: question.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .timeout(ASK_TIMEOUT)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            // The ask flow treats every failure alike, so the body is not
            // worth parsing here.
            return Err(BackendError::Status {
                status: response.status(),
                detail: None,
            });
        }

        let body: AskResponse = response.json().await?;
        Ok(body.answer)
    }

    /// Re-index the document corpus; returns how many text chunks the
    /// backend reports having loaded. A success body without a count reads
    /// as zero chunks.
    pub async fn reload(&self) -> Result<u64, BackendError> {
        let url = format!("{}/api/reload", self.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(RELOAD_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Failure bodies optionally carry a human-readable status line.
            let detail = response
                .json::<ReloadFailure>()
                .await
                .ok()
                .and_then(|failure| failure.status);
            return Err(BackendError::Status { status, detail });
        }

        let body: ReloadResponse = response.json().await?;
        Ok(body.chunks)
    }
}
