//! Language configuration for the judge worker.
//!
//! The table is embedded at build time from `files/languages.toml` and maps
//! each supported language to the fixed source filename the runner images
//! expect inside `/code` and to the runner image itself.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::Deserialize;
use tracing::warn;

use crate::models::Language;

/// Configuration for a supported programming language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Fixed name of the source file inside the sandbox (e.g. "main.cpp").
    pub source_file: String,
    /// Sandbox runner image for the language.
    pub image: String,
}

/// Raw TOML configuration for a language.
#[derive(Debug, Deserialize)]
struct RawLanguageConfig {
    source_file: String,
    image: String,
    #[serde(default)]
    aliases: Vec<String>,
}

static LANGUAGES: OnceLock<HashMap<String, LanguageConfig>> = OnceLock::new();

fn parse_table() -> anyhow::Result<HashMap<String, LanguageConfig>> {
    let content = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/files/languages.toml"));
    let raw_configs: HashMap<String, RawLanguageConfig> = toml::from_str(content)?;

    let mut languages = HashMap::new();
    for (name, raw) in raw_configs {
        let config = LanguageConfig {
            source_file: raw.source_file,
            image: raw.image,
        };

        languages.insert(name.to_lowercase(), config.clone());
        for alias in raw.aliases {
            languages.insert(alias.to_lowercase(), config.clone());
        }
    }

    Ok(languages)
}

fn table() -> &'static HashMap<String, LanguageConfig> {
    LANGUAGES.get_or_init(|| match parse_table() {
        Ok(table) => table,
        Err(e) => {
            warn!("embedded language table is invalid: {e}");
            HashMap::new()
        }
    })
}

/// Validate and install the embedded language table. Called once at startup
/// so a broken table fails the worker fast instead of failing submissions.
pub fn init_languages() -> anyhow::Result<()> {
    let parsed = parse_table()?;
    let _ = LANGUAGES.set(parsed);
    Ok(())
}

/// Get language configuration for a supported language.
pub fn get_language_config(language: Language) -> Option<LanguageConfig> {
    table().get(language.as_str()).cloned()
}

/// All configured language tags, including aliases.
pub fn get_supported_languages() -> Vec<String> {
    table().keys().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_table_is_valid() {
        init_languages().unwrap();
        for language in [Language::C, Language::Cpp, Language::Java, Language::Python] {
            let config = get_language_config(language)
                .unwrap_or_else(|| panic!("missing entry for {language}"));
            assert!(!config.image.is_empty());
        }
    }

    #[test]
    fn test_fixed_source_filenames() {
        let cases = [
            (Language::C, "main.c"),
            (Language::Cpp, "main.cpp"),
            (Language::Java, "Main.java"),
            (Language::Python, "main.py"),
        ];
        for (language, expected) in cases {
            assert_eq!(get_language_config(language).unwrap().source_file, expected);
        }
    }

    #[test]
    fn test_images_follow_runner_naming() {
        assert_eq!(
            get_language_config(Language::Cpp).unwrap().image,
            "seka-cpp-runner"
        );
        assert_eq!(
            get_language_config(Language::Python).unwrap().image,
            "seka-python-runner"
        );
    }

    #[test]
    fn test_aliases_resolve() {
        assert!(get_supported_languages().contains(&"c++".to_string()));
        assert!(get_supported_languages().contains(&"py".to_string()));
    }
}
