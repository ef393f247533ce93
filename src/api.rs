//! Summarization and translation through an OpenAI-compatible chat API.
//!
//! # Architecture
//!
//! - [`Summarize`]: core trait for condensing articles and comment threads
//!   into a target language
//! - [`OpenAiSummarizer`]: talks to a chat completions endpoint
//! - [`Summarizer`]: picks the remote client or a passthrough at runtime
//! - [`summarize_or_raw`]: the pipeline's entry point; on any failure it logs
//!   and hands back the original text so a run never stops on a summary

use crate::config::SummarizerConfig;
use crate::error::SummarizeError;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, instrument, warn};

const EDITOR_PROMPT: &str = "You are an experienced newspaper editor. Create engaging, well-written summaries in a journalistic style.";

/// What a piece of text is condensed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// A story body.
    Article,
    /// The top comments of a discussion thread.
    Discussion,
}

impl Task {
    fn prompt(self, text: &str, target_language: &str) -> String {
        match self {
            Task::Article => format!(
                "Summarize this news article in an engaging way, like a professional newspaper. \
                 Write the summary in the language with tag \"{target_language}\". \
                 Don't include any URLs or references:\n\n{text}"
            ),
            Task::Discussion => format!(
                "Analyze these top comments from the discussion. \
                 Bring out the main points of agreement and debate, \
                 in the language with tag \"{target_language}\". \
                 Don't include any URLs or references:\n\n{text}"
            ),
        }
    }
}

/// Condense text into a target language.
pub trait Summarize {
    /// Summarize `text` in `target_language`.
    ///
    /// `creativity` is the sampling temperature; `max_output_tokens` caps the
    /// length of the answer.
    async fn summarize(
        &self,
        text: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError>;

    /// Analyze the comments of a discussion thread in `target_language`.
    async fn analyze_discussion(
        &self,
        comments: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError>;
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    #[instrument(level = "debug", skip_all, fields(task = ?task, chars = text.len(), target_language = %target_language))]
    async fn complete(
        &self,
        task: Task,
        text: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: EDITOR_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: task.prompt(text, target_language),
                },
            ],
            max_tokens: max_output_tokens,
            temperature: creativity,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(SummarizeError::EmptyResponse)
    }
}

impl Summarize for OpenAiSummarizer {
    async fn summarize(
        &self,
        text: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError> {
        self.complete(Task::Article, text, target_language, max_output_tokens, creativity)
            .await
    }

    async fn analyze_discussion(
        &self,
        comments: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError> {
        self.complete(Task::Discussion, comments, target_language, max_output_tokens, creativity)
            .await
    }
}

/// Summarizer chosen from configuration.
#[derive(Debug, Clone)]
pub enum Summarizer {
    OpenAi(OpenAiSummarizer),
    /// Returns text unchanged; used when no API key is configured.
    Passthrough,
}

impl Summarizer {
    pub fn from_config(config: &SummarizerConfig, api_key: Option<&str>, client: reqwest::Client) -> Self {
        match api_key {
            Some(key) => Summarizer::OpenAi(OpenAiSummarizer::new(
                client,
                config.base_url.clone(),
                key,
                config.model.clone(),
            )),
            None => Summarizer::Passthrough,
        }
    }
}

impl Summarize for Summarizer {
    async fn summarize(
        &self,
        text: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError> {
        match self {
            Summarizer::OpenAi(client) => {
                client
                    .summarize(text, target_language, max_output_tokens, creativity)
                    .await
            }
            Summarizer::Passthrough => Ok(text.to_string()),
        }
    }

    async fn analyze_discussion(
        &self,
        comments: &str,
        target_language: &str,
        max_output_tokens: u32,
        creativity: f32,
    ) -> Result<String, SummarizeError> {
        match self {
            Summarizer::OpenAi(client) => {
                client
                    .analyze_discussion(comments, target_language, max_output_tokens, creativity)
                    .await
            }
            Summarizer::Passthrough => Ok(comments.to_string()),
        }
    }
}

/// Run `task` over `text`, falling back to the raw text on failure.
#[instrument(level = "debug", skip_all, fields(task = ?task, chars = text.len()))]
pub async fn summarize_or_raw<S: Summarize>(
    summarizer: &S,
    task: Task,
    text: &str,
    config: &SummarizerConfig,
    target_language: &str,
) -> String {
    let t0 = Instant::now();
    let (tokens, creativity) = (config.max_output_tokens, config.creativity);
    let result = match task {
        Task::Article => {
            summarizer
                .summarize(text, target_language, tokens, creativity)
                .await
        }
        Task::Discussion => {
            summarizer
                .analyze_discussion(text, target_language, tokens, creativity)
                .await
        }
    };
    match result {
        Ok(summary) => {
            debug!(elapsed_ms = t0.elapsed().as_millis(), "Summary ready");
            summary
        }
        Err(e) => {
            warn!(
                elapsed_ms = t0.elapsed().as_millis(),
                error = %e,
                "Could not summarize; using raw text"
            );
            text.to_string()
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}
