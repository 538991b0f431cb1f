//! Configuration loader and path helpers.
//!
//! Uses Figment to merge `config.yaml` + `config.<env>.yaml` + `APP_*` env vars
//! into an immutable [`AppConfig`]. Provides helpers to expand `~` and `${VAR}`
//! and to resolve relative paths against a known base directory.

use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::expand::Synonyms;

pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/paraphrase-multilingual-mpnet-base-v2";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub data_path: String,
    pub id_col: String,
    pub text_fields: Vec<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(rename = "chroma", alias = "store")]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub synonyms: Synonyms,
    #[serde(default)]
    pub answer: AnswerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub persist_dir: String,
    pub collection: String,
    #[serde(default)]
    pub metric: Metric,
}

/// Distance function used by the collection; names follow the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    L2,
    #[serde(alias = "dot")]
    Ip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_distance_max")]
    pub distance_max: f32,
    #[serde(default = "default_min_hits")]
    pub min_hits: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: default_k(), distance_max: default_distance_max(), min_hits: default_min_hits() }
    }
}

/// Which metadata fields feed the rendered answer bullets. Names are the
/// configured text-field names, without the `m_` prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    #[serde(default = "default_topic_field")]
    pub topic_field: String,
    #[serde(default = "default_synthesis_fields")]
    pub synthesis_fields: Vec<String>,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self { topic_field: default_topic_field(), synthesis_fields: default_synthesis_fields() }
    }
}

fn default_embedding_model() -> String { DEFAULT_EMBEDDING_MODEL.to_string() }
fn default_k() -> usize { 5 }
fn default_distance_max() -> f32 { 0.70 }
fn default_min_hits() -> usize { 1 }
fn default_topic_field() -> String { "Tema - subtema".to_string() }
fn default_synthesis_fields() -> Vec<String> { vec!["síntesis".to_string(), "sintesis".to_string()] }

impl AppConfig {
    /// Load `path` (or `APP_CONFIG`, or `config.yaml`), the `RUST_ENV` overlay
    /// next to it, then `APP_*` environment overrides.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base = match path {
            Some(p) => p.to_path_buf(),
            None => env::var("APP_CONFIG").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };
        if !base.exists() {
            return Err(Error::InvalidConfig(format!("config file {} not found", base.display())).into());
        }

        let mut figment = Figment::new().merge(Yaml::file(&base));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Yaml::file(overlay_path(&base, "dev"))),
            "prod" | "production" => figment = figment.merge(Yaml::file(overlay_path(&base, "prod"))),
            "test" | "testing" => figment = figment.merge(Yaml::file(overlay_path(&base, "test"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self::from_figment(figment)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Self::from_figment(Figment::from(Yaml::string(yaml)))
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if self.text_fields.is_empty() {
            return Err(Error::InvalidConfig("text_fields must list at least one column".into()));
        }
        if self.store.collection.trim().is_empty() {
            return Err(Error::InvalidConfig("chroma.collection must not be empty".into()));
        }
        if self.retrieval.k == 0 {
            return Err(Error::InvalidConfig("retrieval.k must be at least 1".into()));
        }
        if !self.retrieval.distance_max.is_finite() || self.retrieval.distance_max < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "retrieval.distance_max must be a non-negative number, got {}",
                self.retrieval.distance_max
            )));
        }
        Ok(())
    }

    pub fn data_path(&self) -> PathBuf { expand_path(&self.data_path) }

    /// Absolute persist directory, resolved against the working directory.
    pub fn persist_dir(&self) -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        resolve_with_base(&cwd, &self.store.persist_dir)
    }
}

/// `config.yaml` -> `config.<env>.yaml` in the same directory.
fn overlay_path(base: &Path, env_name: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("config");
    let ext = base.extension().and_then(|s| s.to_str()).unwrap_or("yaml");
    base.with_file_name(format!("{stem}.{env_name}.{ext}"))
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
