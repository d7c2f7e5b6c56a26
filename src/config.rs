use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};

/// Tuning for pointer gestures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Pointer travel (px, either axis) that turns a press into a drag
    pub drag_threshold: f64,
    /// Distance (px) from the top or bottom viewport edge that triggers
    /// auto-scroll while dragging
    pub autoscroll_margin: f64,
    /// Pixels scrolled per pointer sample inside the auto-scroll margin
    pub autoscroll_step: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            autoscroll_margin: 80.0,
            autoscroll_step: 12.0,
        }
    }
}

impl EditorConfig {
    /// Parses a (possibly partial) JSON config. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| BoardError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("drag_threshold", self.drag_threshold),
            ("autoscroll_margin", self.autoscroll_margin),
            ("autoscroll_step", self.autoscroll_step),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BoardError::ConfigError(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.drag_threshold, 4.0);
        assert_eq!(config.autoscroll_margin, 80.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"drag_threshold": 8}"#).unwrap();
        assert_eq!(config.drag_threshold, 8.0);
        assert_eq!(config.autoscroll_step, 12.0);
    }

    #[test]
    fn test_negative_values_rejected() {
        let err = EditorConfig::from_json(r#"{"autoscroll_margin": -1}"#).unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(msg) if msg.contains("autoscroll_margin")));
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(
            EditorConfig::from_json("{"),
            Err(BoardError::ConfigError(_))
        ));
    }
}
