use crate::ai::client::{DEFAULT_API_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL};
use crate::error::ConfigError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "visual-vocab.toml";
pub const ENV_PREFIX: &str = "VISUAL_VOCAB_";

/// Environment variables consulted for the API key when the config has none.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub api_base_url: String,
    pub image_model: String,
    pub text_model: String,
    /// Where share cards are written.
    pub output_dir: PathBuf,
    /// Bold serif font for share cards. System fonts are tried when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_font: Option<PathBuf>,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            output_dir: PathBuf::from("."),
            card_font: None,
            log_file: PathBuf::from("visual_vocab.log"),
        }
    }
}

impl Config {
    /// Defaults, then `./visual-vocab.toml`, then `VISUAL_VOCAB_*` variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if path.exists() {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        figment.extract().map_err(|e| ConfigError::Figment(Box::new(e)))
    }

    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Like [`Config::resolve_api_key`], reading variables through `lookup`.
    pub fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|name| lookup(name))
                    .find(|key| !key.trim().is_empty())
            })
    }
}
