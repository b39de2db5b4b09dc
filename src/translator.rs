//! Translator: computes the incremental translation workload, batches it to
//! an external provider, and assembles the replies into a patch.
//!
//! Batches run strictly sequentially; each is fully awaited before the next
//! begins. Any batch failure aborts the whole call with no partial patch.

use std::collections::{HashMap, HashSet};

use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

use crate::bundle::Bundle;
use crate::language::Language;
use crate::patch::Patch;

/// One key/text pair sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationItem {
    pub key: String,
    pub text: String,
}

/// One batch request to the external translation provider.
///
/// `context` carries same-root key/text pairs purely to give the provider
/// disambiguating context; they are not translated.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_language: Language,
    pub target_language: Language,
    pub purpose: Option<String>,
    pub notes: Vec<String>,
    pub items: Vec<TranslationItem>,
    pub context: Vec<TranslationItem>,
}

/// One translated pair in a provider reply.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranslatedItem {
    pub key: String,
    pub translation: String,
}

/// The external translation capability.
///
/// Implementations may return a subset of the requested keys; absent keys
/// are simply never patched.
#[allow(async_fn_in_trait)]
pub trait TranslationProvider {
    async fn translate_batch(&self, request: &TranslationRequest) -> Result<Vec<TranslatedItem>>;
}

/// A value that is either uniform across languages or keyed by language
/// code, with `"*"` as the fallback key.
#[derive(Debug, Clone)]
pub enum PerLanguage<T> {
    Uniform(T),
    ByCode(HashMap<String, T>),
}

impl<T> PerLanguage<T> {
    /// Resolve the value for a language, falling back to the `"*"` entry.
    pub fn resolve(&self, language: Language) -> Option<&T> {
        match self {
            PerLanguage::Uniform(value) => Some(value),
            PerLanguage::ByCode(map) => map.get(language.code()).or_else(|| map.get("*")),
        }
    }
}

/// Options for [`Translator::translate`].
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Free-text description of the application, passed to the provider.
    pub purpose: Option<String>,

    /// Guidance notes for the provider, optionally varying per language.
    pub notes: Option<PerLanguage<Vec<String>>>,

    /// Keys per provider request. Unset means one batch holding all keys.
    pub batch_size: Option<usize>,
}

/// Assembles a patch that brings a target bundle up to date with a source
/// bundle, one provider batch at a time.
pub struct Translator<'a, P> {
    source: &'a Bundle,
    target: &'a Bundle,
    provider: &'a P,
}

impl<'a, P: TranslationProvider> Translator<'a, P> {
    pub fn new(source: &'a Bundle, target: &'a Bundle, provider: &'a P) -> Translator<'a, P> {
        Translator {
            source,
            target,
            provider,
        }
    }

    /// Translate `keys` and assemble the replies into a patch.
    ///
    /// Keys are partitioned into ordered batches of `options.batch_size`
    /// (default: one batch holding all keys). One `Set` is appended per
    /// returned pair, in reply order; requested keys the provider did not
    /// return are recorded as diagnostic `Translate` modifications.
    pub async fn translate(&self, keys: &[String], options: &TranslateOptions) -> Result<Patch> {
        let mut patch = Patch::new();
        if keys.is_empty() {
            return Ok(patch);
        }

        let batch_size = options.batch_size.unwrap_or(keys.len()).max(1);
        for batch in keys.chunks(batch_size) {
            self.translate_batch(batch, &mut patch, options).await?;
        }
        Ok(patch)
    }

    async fn translate_batch(
        &self,
        keys: &[String],
        patch: &mut Patch,
        options: &TranslateOptions,
    ) -> Result<()> {
        let items: Vec<TranslationItem> = keys
            .iter()
            .filter_map(|key| {
                self.source.get(key).map(|text| TranslationItem {
                    key: key.clone(),
                    text,
                })
            })
            .collect();

        let requested: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let roots: HashSet<&str> = keys.iter().filter_map(|key| key.split('.').next()).collect();
        let context: Vec<TranslationItem> = self
            .source
            .flat_entries()
            .into_iter()
            .filter(|(key, _)| !requested.contains(key.as_str()))
            .filter(|(key, _)| key.split('.').next().is_some_and(|root| roots.contains(root)))
            .map(|(key, text)| TranslationItem { key, text })
            .collect();

        let notes = options
            .notes
            .as_ref()
            .and_then(|notes| notes.resolve(self.target.language()))
            .cloned()
            .unwrap_or_default();

        let request = TranslationRequest {
            source_language: self.source.language(),
            target_language: self.target.language(),
            purpose: options.purpose.clone(),
            notes,
            items,
            context,
        };

        debug!(
            "Translating batch of {} keys to {} ({} context items)",
            keys.len(),
            self.target.language(),
            request.context.len()
        );
        let translated = self.provider.translate_batch(&request).await?;

        let returned: HashSet<&str> = translated.iter().map(|item| item.key.as_str()).collect();
        for item in &translated {
            patch.set(item.key.clone(), item.translation.clone());
        }
        // Diagnostic trace for requested keys the provider left out.
        for key in keys {
            if !returned.contains(key.as_str()) {
                if let Some(text) = self.source.get(key) {
                    patch.translate(key.clone(), self.source.language(), text);
                }
            }
        }
        Ok(())
    }
}
