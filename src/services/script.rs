//! Narration script generation

use async_trait::async_trait;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::error::{ReelError, Result};
use crate::services::OPENAI_API_BASE;

static PARENTHESIZED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());

/// Something that turns a prompt into a narration script
#[async_trait]
pub trait ScriptWriter: Send + Sync {
    async fn write_script(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

/// Chat completions client
pub struct OpenAiScriptWriter {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiScriptWriter {
    pub fn new(api_key: String, model: &str) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ReelError::Configuration("OpenAI API key is required for script generation".to_string()));
        }
        Ok(Self {
            client: Client::new(),
            api_key,
            model: model.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

fn chat_request(model: &str, system_prompt: &str, user_prompt: &str) -> serde_json::Value {
    json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_prompt},
            {"role": "user", "content": user_prompt},
        ],
    })
}

fn first_message(body: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(body)?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ReelError::Api("Chat completion returned no message".to_string()))
}

#[async_trait]
impl ScriptWriter for OpenAiScriptWriter {
    async fn write_script(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        info!("Generating script with {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", OPENAI_API_BASE))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&chat_request(&self.model, system_prompt, user_prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ReelError::Api(format!("Script generation failed (HTTP {}): {}", status, body)));
        }

        let script = first_message(&body)?;
        debug!("Script is {} characters long", script.len());
        Ok(script)
    }
}

/// Strip what should not be read aloud
///
/// Single quotes become double quotes, `*` emphasis marks go, and so do
/// parenthesized stage directions.
pub fn clean_script(script: &str) -> String {
    let script = script.replace('\'', "\"").replace('*', "");
    PARENTHESIZED.replace_all(&script, "").into_owned()
}
