use anyhow::{Context, Result};
use tracing::info;

use i18n_llm::{Bundle, Config, Language, OpenAiProvider, TranslateFromOptions, TranslateOptions};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production/CI)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("i18n_llm=info".parse()?),
        )
        .init();

    info!("Starting translation run");

    // Load configuration from environment
    let config = Config::from_env()?;
    let source_language = Language::from_code(&config.source_language)
        .context("SOURCE_LANGUAGE is not a known language code")?;
    let provider = OpenAiProvider::new(&config)?;

    // Load every language bundle found under the locales directory
    let bundles = Bundle::load_many(&config.locales_dir, config.default_format).await?;
    info!("Loaded {} language bundles from {}", bundles.len(), config.locales_dir.display());

    let source = bundles
        .iter()
        .find(|bundle| bundle.language() == source_language)
        .with_context(|| format!("No bundle found for source language '{}'", source_language))?;

    for target in &bundles {
        if target.language() == source_language {
            continue;
        }

        info!("Translating {} -> {}", source.language(), target.language());
        let options = TranslateFromOptions {
            translate: TranslateOptions {
                purpose: config.purpose.clone(),
                batch_size: config.batch_size,
                ..Default::default()
            },
            ..Default::default()
        };
        let translated = target.translate_from(source, &provider, options).await?;
        translated.write().await?;
        info!("Wrote {} keys for {}", translated.flat_keys().len(), translated.language());
    }

    info!("Translation run complete");
    Ok(())
}
