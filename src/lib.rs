pub mod bundle;
pub mod config;
pub mod format;
pub mod language;
pub mod openai;
pub mod patch;
pub mod resource;
pub mod translator;

pub use bundle::{Bundle, TranslateFromOptions};
pub use config::Config;
pub use format::ResourceFormat;
pub use language::Language;
pub use openai::OpenAiProvider;
pub use patch::{Modification, Patch};
pub use resource::{Namespace, Resource, Translation};
pub use translator::{
    PerLanguage, TranslateOptions, TranslatedItem, TranslationItem, TranslationProvider,
    TranslationRequest, Translator,
};
