use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::translator::{TranslatedItem, TranslationProvider, TranslationRequest};

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    response_format: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct TranslationsReply {
    translations: Vec<TranslatedItem>,
}

/// Translation provider backed by the OpenAI chat completions API.
#[derive(Debug)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(config: &Config) -> Result<OpenAiProvider> {
        let api_key = match &config.openai_api_key {
            Some(key) => key.clone(),
            None => anyhow::bail!("OpenAI API key is not configured"),
        };

        Ok(OpenAiProvider {
            client: reqwest::Client::new(),
            api_url: config.openai_api_url.clone(),
            api_key,
            model: config.openai_model.clone(),
        })
    }

    fn build_request(&self, request: &TranslationRequest) -> ChatRequest {
        let (temperature, reasoning_effort) = if is_reasoning_model(&self.model) {
            (None, Some("low".to_string()))
        } else {
            (Some(0.2), None)
        };

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: build_instructions(request),
                },
                Message {
                    role: "user".to_string(),
                    content: build_input(request),
                },
            ],
            response_format: response_format(),
            temperature,
            reasoning_effort,
        }
    }
}

impl TranslationProvider for OpenAiProvider {
    async fn translate_batch(&self, request: &TranslationRequest) -> Result<Vec<TranslatedItem>> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, body);
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let content = chat_response
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .unwrap_or_default();

        let reply: TranslationsReply = serde_json::from_str(content)
            .context("Failed to parse translations from OpenAI reply")?;

        Ok(reply.translations)
    }
}

fn is_reasoning_model(model: &str) -> bool {
    ["gpt-5", "o1", "o3", "o4"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
}

fn build_instructions(request: &TranslationRequest) -> String {
    let mut lines = vec![
        format!(
            "You are a professional translator. Translate the given items from {} to {}.",
            request.source_language.name(),
            request.target_language.name()
        ),
        "The items are key/text pairs from an application's translation files.".to_string(),
        "Translate only the text; keep every key exactly as given.".to_string(),
        "Preserve placeholders, markup and interpolation syntax verbatim.".to_string(),
        "Use the CONTEXT section only to disambiguate; do not translate it.".to_string(),
    ];

    if let Some(purpose) = &request.purpose {
        lines.push(format!(
            "The purpose of the application is defined as: {}.",
            purpose
        ));
    }
    if !request.notes.is_empty() {
        lines.push("Translation notes:".to_string());
        for note in &request.notes {
            lines.push(format!("- {}", note));
        }
    }

    lines.join("\n")
}

fn build_input(request: &TranslationRequest) -> String {
    let mut lines = vec!["ITEMS TO TRANSLATE".to_string()];
    for item in &request.items {
        lines.push(format!("{}: {}", item.key, item.text));
    }
    lines.push(String::new());
    lines.push("CONTEXT".to_string());
    for item in &request.context {
        lines.push(format!("{}: {}", item.key, item.text));
    }
    lines.push(String::new());
    lines.join("\n")
}

fn response_format() -> serde_json::Value {
    serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": "translations",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "translations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "key": {"type": "string"},
                                "translation": {"type": "string"}
                            },
                            "required": ["key", "translation"],
                            "additionalProperties": false
                        }
                    }
                },
                "required": ["translations"],
                "additionalProperties": false
            }
        }
    })
}
