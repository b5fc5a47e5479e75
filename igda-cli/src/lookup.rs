//! Country dimensions from an OpenAI-compatible chat-completions endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use igda_core::{
    Dimensions, LOOKUP_SYSTEM_PROMPT, LOOKUP_TIMEOUT_SECS, ReplyParseError, lookup_prompt,
    parse_dimensions_reply,
};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
const USER_AGENT: &str = concat!("igda/", env!("CARGO_PKG_VERSION"));

/// Geography lookup errors
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("OPENAI_API_KEY is not set; export it or add it to a .env file")]
    MissingCredential,

    #[error("a country name is required for the lookup")]
    MissingCountry,

    #[error("network error: {0}")]
    Network(String),

    #[error("lookup timed out after {0}s")]
    Timeout(u64),

    #[error("the API key was rejected")]
    Unauthorized,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("the reply contained no answer")]
    EmptyReply,

    #[error("could not read dimensions from reply '{reply}': {source}")]
    Reply {
        reply: String,
        #[source]
        source: ReplyParseError,
    },
}

impl LookupError {
    /// Whether the user can carry on by entering the dimensions manually.
    /// A missing credential or country stops the stage instead.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::MissingCredential | Self::MissingCountry)
    }
}

/// External source of country dimensions.
#[async_trait]
pub trait GeographyLookup {
    async fn lookup(&self, country: &str) -> Result<Dimensions, LookupError>;
}

#[derive(Debug, Clone)]
pub struct LookupSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_base: String,
}

impl Default for LookupSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client
pub struct ChatCompletionsLookup {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsLookup {
    pub fn new(settings: LookupSettings) -> Result<Self, LookupError> {
        let api_key = settings
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(LookupError::MissingCredential)?;

        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(LOOKUP_TIMEOUT_SECS))
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: format!("{}/chat/completions", settings.api_base.trim_end_matches('/')),
            api_key,
            model: settings.model,
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn ask(&self, country: &str) -> Result<String, LookupError> {
        let prompt = lookup_prompt(country);
        let request = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: LOOKUP_SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        log::debug!("querying {} with model {}", self.endpoint(), self.model);

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LookupError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(LookupError::EmptyReply)
    }
}

fn classify_transport_error(err: reqwest::Error) -> LookupError {
    if err.is_timeout() {
        LookupError::Timeout(LOOKUP_TIMEOUT_SECS)
    } else {
        LookupError::Network(err.to_string())
    }
}

#[async_trait]
impl GeographyLookup for ChatCompletionsLookup {
    async fn lookup(&self, country: &str) -> Result<Dimensions, LookupError> {
        let country = country.trim();
        if country.is_empty() {
            return Err(LookupError::MissingCountry);
        }
        let reply = self.ask(country).await?;
        log::info!("lookup reply for {country}: {reply}");
        parse_dimensions_reply(&reply).map_err(|source| LookupError::Reply { reply, source })
    }
}
