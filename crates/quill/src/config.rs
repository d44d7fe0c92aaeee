//! Layered configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from quill.toml)
//! - `~/.config/quill/quill.toml`
//! - `./quill.toml`
//! - `QUILL_*` environment variables

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use quill_error::{ConfigError, ConfigErrorKind, QuillError, QuillResult};
use quill_models::GeneratorSettings;
use quill_narrative::PipelineConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../quill.toml");

/// Environment variables read verbatim, mapped to their config key.
const GENERATOR_ENV: [(&str, &str); 3] = [
    ("QUILL_GENERATOR_BASE_URL", "generator.base_url"),
    ("QUILL_GENERATOR_MODEL", "generator.model"),
    ("QUILL_GENERATOR_API_KEY", "generator.api_key"),
];

/// Top-level Quill configuration.
///
/// Nested keys can also be set from the environment with a double
/// underscore, e.g. `QUILL_PIPELINE__MAX_STEPS=500`.
///
/// # Example
///
/// ```no_run
/// use quill::QuillConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = QuillConfig::load()?;
/// println!("model: {}", config.generator.model());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    /// Step budget, revision limits and plan sizes
    pub pipeline: PipelineConfig,
    /// Chat completions backend
    pub generator: GeneratorSettings,
}

impl QuillConfig {
    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> QuillResult<Self> {
        debug!("Loading configuration from file");
        let builder = Config::builder().add_source(File::from(path.as_ref()));
        Self::finish(builder)
    }

    /// Load configuration with every layer applied.
    ///
    /// Missing user files are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file or variable cannot be parsed, or
    /// the result fails validation.
    #[instrument]
    pub fn load() -> QuillResult<Self> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// [`QuillConfig::load`] with a custom lookup for the generator variables.
    pub(crate) fn load_with(lookup: impl Fn(&str) -> Option<String>) -> QuillResult<Self> {
        debug!("Loading configuration with precedence: env > current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/quill/quill.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("quill").required(false))
            .add_source(
                Environment::with_prefix("QUILL")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        for (var, key) in GENERATOR_ENV {
            builder = builder
                .set_override_option(key, lookup(var))
                .map_err(|e| config_error(key, e))?;
        }

        Self::finish(builder)
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> QuillResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| config_error("Failed to build configuration", e))?
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the pipeline limits.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming the invalid field.
    pub fn validate(&self) -> QuillResult<()> {
        self.pipeline
            .validate()
            .map_err(|reason| QuillError::from(ConfigError::invalid(reason)))
    }
}

fn config_error(context: &str, e: config::ConfigError) -> QuillError {
    QuillError::from(ConfigError::new(ConfigErrorKind::Load(format!(
        "{}: {}",
        context, e
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_match_code_defaults() {
        let config = QuillConfig::finish(
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)),
        )
        .unwrap();
        assert_eq!(config.pipeline, PipelineConfig::default());
        assert_eq!(config.generator.model(), "llama3.1");
    }

    #[test]
    fn generator_variables_override_files() {
        let config = QuillConfig::load_with(|name| match name {
            "QUILL_GENERATOR_MODEL" => Some("mistral-small".to_string()),
            "QUILL_GENERATOR_API_KEY" => Some("sk-test".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.generator.model(), "mistral-small");
        assert_eq!(config.generator.api_key().as_deref(), Some("sk-test"));
    }

    #[test]
    fn zero_step_budget_is_rejected() {
        let builder = Config::builder()
            .add_source(File::from_str("[pipeline]\nmax_steps = 0\n", FileFormat::Toml));
        assert!(QuillConfig::finish(builder).is_err());
    }
}
