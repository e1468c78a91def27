use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ureq::Agent;
use uuid::Uuid;

use crate::error::{GitguyError, Result};
use crate::generate::{CommitGenerator, LlModel, LlmResult, parse_response, system_prompt, user_prompt};

pub const ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
const REFERER: &str = "https://github.com/stormlightlabs/gitguy";
const APP_TITLE: &str = "GitGuy";
const TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct OpenRouterClient {
    agent: Agent,
    endpoint: String,
    api_key: String,
    model: LlModel,
    pr_template: Option<String>,
}

impl OpenRouterClient {
    pub fn new(api_key: impl Into<String>, model: LlModel) -> Self {
        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(TIMEOUT))
            .build()
            .into();

        Self {
            agent,
            endpoint: ENDPOINT.to_string(),
            api_key: api_key.into(),
            model,
            pr_template: None,
        }
    }

    /// Read a PR template file to guide the description's structure.
    pub fn with_pr_template(mut self, path: &Path) -> Result<Self> {
        let template = std::fs::read_to_string(path).map_err(|e| {
            GitguyError::Config(format!(
                "failed to read PR template file {}: {}",
                path.display(),
                e
            ))
        })?;
        self.pr_template = Some(template);
        Ok(self)
    }

    pub fn model(&self) -> LlModel {
        self.model
    }

    fn request_body(&self, diff: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.model.id(),
            messages: vec![
                Message {
                    role: "system".into(),
                    content: system_prompt(self.pr_template.as_deref()),
                },
                Message {
                    role: "user".into(),
                    content: user_prompt(diff),
                },
            ],
        };
        Ok(serde_json::to_string(&request)?)
    }
}

impl CommitGenerator for OpenRouterClient {
    fn generate(&self, diff: &str) -> Result<LlmResult> {
        let request_id = Uuid::new_v4();
        let body = self.request_body(diff)?;

        let started = Instant::now();
        let sent = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", REFERER)
            .header("X-Title", APP_TITLE)
            .send(body.as_bytes());

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!(%request_id, model = self.model.id(), error = %e, "openrouter request failed");
                return Err(e.into());
            }
        };
        let status = response.status().as_u16();
        let text = response.into_body().read_to_string()?;

        info!(
            %request_id,
            model = self.model.id(),
            status,
            duration_ms = started.elapsed().as_millis() as u64,
            "openrouter call"
        );

        decode_response(status, &text)
    }
}

/// Turn an HTTP status and body into a result, surfacing API errors.
fn decode_response(status: u16, body: &str) -> Result<LlmResult> {
    if status != 200 {
        let detail = serde_json::from_str::<ChatResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .map(|e| e.message)
            .unwrap_or_else(|| body.to_string());
        return Err(GitguyError::Api(format!(
            "request failed with status {}: {}",
            status, detail
        )));
    }

    let parsed: ChatResponse = serde_json::from_str(body)?;
    if let Some(error) = parsed.error {
        return Err(GitguyError::Api(error.message));
    }

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GitguyError::Api("no choices in API response".into()))?;

    parse_response(&choice.message.content)
}
