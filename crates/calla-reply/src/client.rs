//! Completion API client with persona fallbacks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::GeneratorConfig;
use crate::error::{ReplyError, Result};

/// Fixed timeout for completion requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// System instruction establishing the bot's persona.
const PERSONA_PROMPT: &str = "你叫马蹄小莲，25岁温柔治愈系姐姐。用生活经验给予心理疏导，\
     结尾随机添加日式可爱颜文字，例如：(◕‿◕✿)／(=^･ω･^=)＼(≧▽≦)♪";

/// Reply for inputs too short to be a real question.
const SHORT_INPUT_REPLY: &str = "有什么我可以帮你的吗？(◕‿◕✿)";

/// How many characters of an error to surface in the fallback reply.
const ERROR_EXCERPT_CHARS: usize = 30;

/// Generates a reply for extracted user text.
///
/// Implementations always return a postable string; upstream failures
/// become fallback replies rather than errors.
#[async_trait]
pub trait ReplyGenerator: Send + Sync {
    /// Produces the reply for `user_text`.
    async fn generate(&self, user_text: &str) -> String;
}

/// Client for an OpenAI-compatible chat-completion endpoint.
pub struct ReplyClient {
    http: reqwest::Client,
    config: GeneratorConfig,
    api_key: String,
}

impl ReplyClient {
    /// Creates a client with the given config and bearer key.
    pub fn new(config: GeneratorConfig, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            config,
            api_key: api_key.into(),
        })
    }

    async fn complete(&self, user_text: &str) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system(PERSONA_PROMPT),
                ChatMessage::user(user_text),
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };
        trace!(model = %request.model, "sending completion request");

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReplyError::Api {
                status: status.as_u16(),
            });
        }

        let response: ChatResponse = response.json().await?;
        if let Some(usage) = &response.usage {
            debug!(total_tokens = usage.total_tokens, "completion received");
        }
        response.text().ok_or(ReplyError::EmptyChoice)
    }
}

#[async_trait]
impl ReplyGenerator for ReplyClient {
    async fn generate(&self, user_text: &str) -> String {
        let text = user_text.trim();
        if text.chars().count() < 2 {
            return SHORT_INPUT_REPLY.to_string();
        }
        match self.complete(text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "completion failed, using fallback reply");
                fallback_reply(&e)
            }
        }
    }
}

/// Persona-consistent reply for a failed completion.
///
/// A non-success API status gets the "busy" voice with the status code;
/// anything else gets the "confused" voice with a bounded error excerpt.
pub fn fallback_reply(error: &ReplyError) -> String {
    match error {
        ReplyError::Api { status } => {
            format!("抱歉，我现在有点忙，稍后再聊好吗？(；′⌒`) [错误: {status}]")
        }
        other => {
            let excerpt: String = other.to_string().chars().take(ERROR_EXCERPT_CHARS).collect();
            format!("啊啦，我的小脑袋有点混乱了...请再说一次好吗？(>_<) [错误: {excerpt}]")
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// A message in the completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

impl ChatMessage {
    fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion response body.
#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

impl ChatResponse {
    /// Content of the first choice, if any.
    fn text(&self) -> Option<String> {
        self.choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatUsage {
    total_tokens: u32,
}
