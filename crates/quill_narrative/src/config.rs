//! Pipeline tuning knobs.

use serde::{Deserialize, Serialize};

/// Limits and sizes that shape a generation run.
///
/// # Examples
///
/// ```
/// use quill_narrative::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .max_regeneration_attempts(1u32)
///     .chapters(2u32)
///     .build()
///     .unwrap();
/// assert_eq!(*config.max_steps(), 2000);
/// assert_eq!(*config.chapters(), 2);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
    derive_setters::Setters,
)]
#[builder(setter(into), default)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct PipelineConfig {
    /// Ceiling on total node executions in one run
    max_steps: usize,
    /// Revisions allowed per scene before it is force-accepted
    max_regeneration_attempts: u32,
    /// Number of recent scenes considered for variety
    variety_window: usize,
    /// Variety score below which an alternate scene shape is requested
    variety_threshold: f64,
    /// Used phrases handed to the generator as an avoid-list
    phrase_context_limit: usize,
    /// Chapters to plan when the generator offers none
    chapters: u32,
    /// Scenes to plan per chapter when the generator offers none
    scenes_per_chapter: u32,
    /// Whether to run the continuity review after each scene
    continuity_review: bool,
    /// Per-call completion token cap, left to the backend when unset
    max_tokens: Option<u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_steps: 2000,
            max_regeneration_attempts: 2,
            variety_window: 5,
            variety_threshold: 0.5,
            phrase_context_limit: 50,
            chapters: 3,
            scenes_per_chapter: 3,
            continuity_review: true,
            max_tokens: None,
        }
    }
}

impl PipelineConfig {
    /// Creates a new config builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Checks that sizes are usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_steps == 0 {
            return Err("max_steps must be greater than 0".to_string());
        }
        if self.chapters == 0 || self.scenes_per_chapter == 0 {
            return Err("chapters and scenes_per_chapter must be greater than 0".to_string());
        }
        if self.max_tokens == Some(0) {
            return Err("max_tokens must be greater than 0 when set".to_string());
        }
        if !(0.0..=1.0).contains(&self.variety_threshold) {
            return Err(format!(
                "variety_threshold must be in [0.0, 1.0], got {}",
                self.variety_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PipelineConfig = toml_like(r#"{"max_steps": 10}"#);
        assert_eq!(config.max_steps, 10);
        assert_eq!(config.scenes_per_chapter, 3);
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let config = PipelineConfig::builder()
            .variety_threshold(1.5)
            .build()
            .unwrap();
        assert!(config.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn step_budget_override_keeps_other_fields() {
        let config = PipelineConfig::default().with_max_steps(40);
        assert_eq!(config.max_steps, 40);
        assert_eq!(config.chapters, 3);
        assert!(PipelineConfig::default().with_max_steps(0).validate().is_err());
    }

    #[test]
    fn token_cap_is_optional_but_not_zero() {
        assert_eq!(PipelineConfig::default().max_tokens, None);
        let config: PipelineConfig = toml_like(r#"{"max_tokens": 256}"#);
        assert_eq!(config.max_tokens, Some(256));
        assert!(config.validate().is_ok());
        assert!(config.with_max_tokens(Some(0)).validate().is_err());
    }

    fn toml_like(json: &str) -> PipelineConfig {
        serde_json::from_str(json).unwrap()
    }
}
