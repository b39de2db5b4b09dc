//! Language registry: single source of truth for all supported languages.
//!
//! The registry is a fixed, closed catalogue of language codes. Bundle
//! subdirectories are named after these codes; a directory whose name is not
//! in the catalogue is skipped (non-fatal) when loading many bundles at once.

use std::fmt;

use anyhow::{bail, Result};

/// Metadata for one supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// ISO 639-1 language code (e.g., "en", "es", "fr")
    pub code: &'static str,

    /// English name of the language (e.g., "English", "Spanish")
    pub name: &'static str,

    /// Native name of the language (e.g., "English", "Español")
    pub local_name: &'static str,
}

/// A validated language.
///
/// Can only be constructed from a code present in the static catalogue, so
/// holding a `Language` is proof the code is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    /// Look up a language by its ISO 639-1 code.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is in the catalogue
    /// * `Err` otherwise
    pub fn from_code(code: &str) -> Result<Language> {
        match LANGUAGES.iter().find(|info| info.code == code) {
            Some(info) => Ok(Language { code: info.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Check whether a code is in the catalogue without constructing a `Language`.
    pub fn is_known(code: &str) -> bool {
        LANGUAGES.iter().any(|info| info.code == code)
    }

    /// The ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// The English name of the language.
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// The native name of the language.
    pub fn local_name(&self) -> &'static str {
        self.info().local_name
    }

    /// Full metadata for this language.
    pub fn info(&self) -> &'static LanguageInfo {
        LANGUAGES
            .iter()
            .find(|info| info.code == self.code)
            .unwrap_or_else(|| unreachable!("Language constructed with unknown code"))
    }

    /// All languages in the catalogue.
    pub fn all() -> impl Iterator<Item = Language> {
        LANGUAGES.iter().map(|info| Language { code: info.code })
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// The static language catalogue.
static LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "en", name: "English", local_name: "English" },
    LanguageInfo { code: "es", name: "Spanish", local_name: "Español" },
    LanguageInfo { code: "fr", name: "French", local_name: "Français" },
    LanguageInfo { code: "de", name: "German", local_name: "Deutsch" },
    LanguageInfo { code: "it", name: "Italian", local_name: "Italiano" },
    LanguageInfo { code: "pt", name: "Portuguese", local_name: "Português" },
    LanguageInfo { code: "ru", name: "Russian", local_name: "Русский" },
    LanguageInfo { code: "ja", name: "Japanese", local_name: "日本語" },
    LanguageInfo { code: "ko", name: "Korean", local_name: "한국어" },
    LanguageInfo { code: "zh", name: "Chinese", local_name: "中文" },
    LanguageInfo { code: "ar", name: "Arabic", local_name: "العربية" },
    LanguageInfo { code: "hi", name: "Hindi", local_name: "हिन्दी" },
    LanguageInfo { code: "nl", name: "Dutch", local_name: "Nederlands" },
    LanguageInfo { code: "sv", name: "Swedish", local_name: "Svenska" },
    LanguageInfo { code: "no", name: "Norwegian", local_name: "Norsk" },
    LanguageInfo { code: "da", name: "Danish", local_name: "Dansk" },
    LanguageInfo { code: "fi", name: "Finnish", local_name: "Suomi" },
    LanguageInfo { code: "pl", name: "Polish", local_name: "Polski" },
    LanguageInfo { code: "tr", name: "Turkish", local_name: "Türkçe" },
    LanguageInfo { code: "he", name: "Hebrew", local_name: "עברית" },
    LanguageInfo { code: "th", name: "Thai", local_name: "ไทย" },
    LanguageInfo { code: "vi", name: "Vietnamese", local_name: "Tiếng Việt" },
    LanguageInfo { code: "cs", name: "Czech", local_name: "Čeština" },
    LanguageInfo { code: "hu", name: "Hungarian", local_name: "Magyar" },
    LanguageInfo { code: "ro", name: "Romanian", local_name: "Română" },
    LanguageInfo { code: "el", name: "Greek", local_name: "Ελληνικά" },
];
