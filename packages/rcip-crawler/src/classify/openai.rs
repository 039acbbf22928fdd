//! OpenAI-backed occupation classifier.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ClassifyError, ClassifyResult};
use crate::traits::classifier::Classifier;
use crate::types::posting::{Classification, SkillTier};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Upper bound on one chat-completions round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str =
    "You are an expert in Canadian NOC (National Occupational Classification) codes.";

/// Classifies postings with an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct OpenAIClassifier {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    request_timeout: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAIClassifier {
    /// Create a classifier with the given API key and default model.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: build_client(DEFAULT_REQUEST_TIMEOUT),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> ClassifyResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ClassifyError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Bound each request; an elapsed request is `ClassifyError::Timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.http_client = build_client(timeout);
        self.request_timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    fn user_prompt(title: &str, description: &str) -> String {
        format!(
            "Analyze this job posting and determine the most likely NOC code and TEER level.\n\n\
             Job Title: {}\n\
             Description: {}\n\n\
             Return ONLY a JSON object with:\n\
             {{\"noc\": \"5-digit NOC code\", \"teerLevel\": number from 0-5}}",
            title, description
        )
    }
}

#[async_trait]
impl Classifier for OpenAIClassifier {
    async fn classify(&self, title: &str, description: &str) -> ClassifyResult<Classification> {
        let start = std::time::Instant::now();
        let prompt = Self::user_prompt(title, description);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat { kind: "json_object" },
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Classification request failed");
                if e.is_timeout() {
                    ClassifyError::Timeout {
                        millis: self.request_timeout.as_millis() as u64,
                    }
                } else {
                    ClassifyError::Service(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Classification API error");
            return Err(ClassifyError::Service(format!("HTTP {}: {}", status, error_text)));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ClassifyError::InvalidResponse("empty completion".into()))?;

        let classification = parse_classification(&content)?;

        debug!(
            title = %title,
            noc = %classification.occupation_code,
            teer = classification.skill_tier.level(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Posting classified"
        );

        Ok(classification)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

fn build_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_default()
}

/// Validate a `{"noc": ..., "teerLevel": ...}` completion.
///
/// The code may arrive as a string or a number; numbers are zero-padded to
/// five digits. Anything that is not a five-digit code with a tier of 0-5 is
/// rejected.
pub fn parse_classification(content: &str) -> ClassifyResult<Classification> {
    let value: Value = serde_json::from_str(content.trim())
        .map_err(|e| ClassifyError::InvalidResponse(format!("not JSON: {}", e)))?;

    let code = match value.get("noc") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => match n.as_u64() {
            Some(n) if n <= 99_999 => format!("{:05}", n),
            _ => return Err(ClassifyError::InvalidResponse(format!("bad noc: {}", n))),
        },
        _ => return Err(ClassifyError::InvalidResponse("missing noc".into())),
    };

    let tier = value
        .get("teerLevel")
        .and_then(|t| match t {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .and_then(|t| u8::try_from(t).ok())
        .and_then(SkillTier::new)
        .ok_or_else(|| ClassifyError::InvalidResponse("missing or out-of-range teerLevel".into()))?;

    Classification::new(code.clone(), tier)
        .ok_or_else(|| ClassifyError::InvalidResponse(format!("bad noc: {}", code)))
}
