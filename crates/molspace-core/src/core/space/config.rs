use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Largest side length a periodic box may have by default. Three such sides
/// still multiply to a finite `f64` volume.
pub const DEFAULT_MAX_BOX_LENGTH: f64 = 5.0e102;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// What a periodic box does with a side longer than the configured maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxLengthPolicy {
    /// Keep the lower corner and shorten the side to the maximum.
    #[default]
    Clamp,
    /// Refuse the new dimensions.
    Reject,
}

/// Settings shared by the periodic spaces.
///
/// Every field has a default, so a configuration file only needs to name what it
/// changes:
///
/// ```toml
/// max-box-length = 1.0e6
/// length-policy = "reject"
/// warn-on-oversized-groups = true
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SpaceConfig {
    /// Upper bound on every side of a periodic box.
    pub max_box_length: f64,
    /// How sides above `max_box_length` are handled.
    pub length_policy: BoxLengthPolicy,
    /// Log a warning when a group handed to a group-pair kernel is too large for
    /// the single-wrap approximation to hold.
    pub warn_on_oversized_groups: bool,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            max_box_length: DEFAULT_MAX_BOX_LENGTH,
            length_policy: BoxLengthPolicy::default(),
            warn_on_oversized_groups: false,
        }
    }
}

impl SpaceConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SpaceConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_box_length.is_finite() || self.max_box_length <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "max_box_length",
                reason: format!("must be finite and positive, got {}", self.max_box_length),
            });
        }
        if self.max_box_length.powi(3).is_infinite() {
            return Err(ConfigError::InvalidValue {
                field: "max_box_length",
                reason: format!(
                    "{} is too large: the box volume would overflow",
                    self.max_box_length
                ),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SpaceConfigBuilder {
    max_box_length: Option<f64>,
    length_policy: Option<BoxLengthPolicy>,
    warn_on_oversized_groups: Option<bool>,
}

impl SpaceConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_box_length(mut self, length: f64) -> Self {
        self.max_box_length = Some(length);
        self
    }
    pub fn length_policy(mut self, policy: BoxLengthPolicy) -> Self {
        self.length_policy = Some(policy);
        self
    }
    pub fn warn_on_oversized_groups(mut self, enabled: bool) -> Self {
        self.warn_on_oversized_groups = Some(enabled);
        self
    }

    pub fn build(self) -> Result<SpaceConfig, ConfigError> {
        let defaults = SpaceConfig::default();
        let config = SpaceConfig {
            max_box_length: self.max_box_length.unwrap_or(defaults.max_box_length),
            length_policy: self.length_policy.unwrap_or(defaults.length_policy),
            warn_on_oversized_groups: self
                .warn_on_oversized_groups
                .unwrap_or(defaults.warn_on_oversized_groups),
        };
        config.validate()?;
        Ok(config)
    }
}
