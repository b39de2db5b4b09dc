use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::format::ResourceFormat;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub locales_dir: PathBuf,
    pub source_language: String,
    pub default_format: ResourceFormat,

    // OpenAI
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_api_url: String,

    // Translation
    pub batch_size: Option<usize>,
    pub purpose: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // Storage
            locales_dir: std::env::var("LOCALES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("locales")),
            source_language: std::env::var("SOURCE_LANGUAGE")
                .unwrap_or_else(|_| "en".to_string()),
            default_format: match std::env::var("DEFAULT_FORMAT") {
                Ok(name) => name.parse().context("Invalid DEFAULT_FORMAT")?,
                Err(_) => ResourceFormat::Yaml,
            },

            // OpenAI
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_api_url: std::env::var("OPENAI_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),

            // Translation
            batch_size: std::env::var("TRANSLATE_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok()),
            purpose: std::env::var("TRANSLATE_PURPOSE").ok(),
        })
    }
}
