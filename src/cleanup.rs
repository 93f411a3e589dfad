//! Optional post-extraction cleanup through an external text-completion
//! service. The transformation is pure snapshot-in/snapshot-out: extraction
//! never depends on it, and callers keep the raw snapshot when it fails.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::model::CharacterData;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const MODEL: &str = "gpt-4o-mini";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Extra attempts after the first, for malformed responses only.
const MAX_RETRIES: usize = 2;

#[derive(Debug, Error)]
pub enum CleanupError {
    /// The service answered but its payload was not the expected JSON.
    /// Retried: the model is asked again with the parse error attached.
    #[error("cleanup service returned malformed data: {0}")]
    MalformedResponse(String),
    /// Transport or service-level failure. Never retried; the caller
    /// falls straight back to the uncleaned snapshot.
    #[error("cleanup service request failed: {0}")]
    Service(String),
}

pub struct CleanupClient {
    http: Client,
    api_key: String,
    endpoint: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

const SYSTEM_PROMPT: &str = "You are a helpful assistant that cleans and validates fighting game \
frame data. You MUST return only valid JSON data with the exact same structure as the input. \
Pay special attention to the different requirements for normal vs special/overdrive moves and \
keep ranges and symbolic values as strings.";

impl CleanupClient {
    pub fn new(api_key: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build cleanup http client")?;

        Ok(Self {
            http,
            api_key,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Builds a client pointed at an alternate endpoint, for tests.
    #[cfg(test)]
    fn with_endpoint(api_key: String, endpoint: String) -> Result<Self> {
        let mut client = Self::new(api_key)?;
        client.endpoint = endpoint;
        Ok(client)
    }

    /// Returns a cleaned copy of one character's data, retrying only the
    /// malformed-response failure class and surfacing the last error when
    /// retries exhaust.
    pub fn clean_character(&self, data: &CharacterData) -> Result<CharacterData, CleanupError> {
        let snapshot = serde_json::to_string_pretty(data)
            .map_err(|err| CleanupError::Service(err.to_string()))?;

        let mut last_error = String::new();
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                info!(character = %data.name, attempt = attempt + 1, "retrying cleanup");
            }

            let prompt = build_prompt(&data.name, &snapshot, &last_error);
            match self.request(&prompt) {
                Ok(cleaned) => return Ok(cleaned),
                Err(CleanupError::MalformedResponse(message)) => last_error = message,
                Err(err) => return Err(err),
            }
        }

        Err(CleanupError::MalformedResponse(last_error))
    }

    fn request(&self, prompt: &str) -> Result<CharacterData, CleanupError> {
        let request = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|err| CleanupError::Service(err.to_string()))?
            .error_for_status()
            .map_err(|err| CleanupError::Service(err.to_string()))?;

        let envelope: ChatResponse = response
            .json()
            .map_err(|err| CleanupError::Service(err.to_string()))?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CleanupError::MalformedResponse("response contained no message content".to_string())
            })?;

        serde_json::from_str(&content)
            .map_err(|err| CleanupError::MalformedResponse(err.to_string()))
    }
}

fn build_prompt(name: &str, snapshot: &str, last_error: &str) -> String {
    let mut prompt = format!(
        "Please validate and clean up this frame data for {name}.\n\
         Original data: {snapshot}\n\n\
         Please:\n\
         1. Standardize move names (for special and overdrive moves)\n\
         2. Keep clear numbers as-is, leave ranges (e.g. \"12-14\") and symbolic \
            values (e.g. \"\u{00b1}0\") as strings\n\
         3. Fix any obvious errors or inconsistencies\n\
         4. Ensure all required fields are present\n\
         5. Return ONLY valid JSON data with the exact same structure as the input."
    );

    if !last_error.is_empty() {
        prompt.push_str(&format!(
            "\n\nThe previous attempt failed with error: {last_error}\n\
             Please ensure the response is valid JSON and fix any syntax errors."
        ));
    }

    prompt
}
