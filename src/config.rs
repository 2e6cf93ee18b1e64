//! Engine options.
//!
//! Hosts either construct [`EngineOptions`] directly or parse them from a
//! TOML string. Every field has a default, so a partial options file only
//! overrides what it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunable parameters for gesture handling, pixelation, and export.
///
/// All lengths are canvas units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineOptions {
    /// Pixelation block size
    #[serde(default = "default_pixelate_block")]
    pub pixelate_block: f64,

    /// Crop regions under this extent on either axis cancel the gesture
    #[serde(default = "default_min_crop_extent")]
    pub min_crop_extent: f64,

    /// Shapes under this extent on both axes are discarded on release
    #[serde(default = "default_min_shape_extent")]
    pub min_shape_extent: f64,

    /// Default stroke width for new annotations (valid range: 1.0-20.0)
    #[serde(default = "default_stroke_width")]
    pub default_stroke_width: f64,

    /// Default font size for new text annotations (valid range: 8.0-72.0)
    #[serde(default = "default_font_size")]
    pub default_font_size: f64,

    /// Arrowhead length (capped at 30% of the shaft when drawn)
    #[serde(default = "default_arrow_length")]
    pub arrow_length: f64,

    /// Arrowhead angle in degrees (valid range: 5.0-85.0)
    #[serde(default = "default_arrow_angle")]
    pub arrow_angle: f64,

    /// Minimum spacing between accumulated freehand samples
    #[serde(default = "default_freehand_spacing")]
    pub freehand_spacing: f64,

    /// Maximum number of annotations in a scene (0 = unlimited)
    #[serde(default = "default_max_objects")]
    pub max_objects: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            pixelate_block: default_pixelate_block(),
            min_crop_extent: default_min_crop_extent(),
            min_shape_extent: default_min_shape_extent(),
            default_stroke_width: default_stroke_width(),
            default_font_size: default_font_size(),
            arrow_length: default_arrow_length(),
            arrow_angle: default_arrow_angle(),
            freehand_spacing: default_freehand_spacing(),
            max_objects: default_max_objects(),
        }
    }
}

/// Errors producing [`EngineOptions`] from an options string.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to parse engine options: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("option `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("arrow angle must be between 5 and 85 degrees, got {0}")]
    ArrowAngleRange(f64),
}

impl EngineOptions {
    /// Parses options from TOML, filling missing fields with defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, OptionsError> {
        let options: EngineOptions = toml::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    /// Rejects values that would break gesture or resample math.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let positive = [
            ("pixelate_block", self.pixelate_block),
            ("min_crop_extent", self.min_crop_extent),
            ("min_shape_extent", self.min_shape_extent),
            ("default_stroke_width", self.default_stroke_width),
            ("default_font_size", self.default_font_size),
            ("arrow_length", self.arrow_length),
            ("freehand_spacing", self.freehand_spacing),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(OptionsError::NonPositive { name, value });
            }
        }
        if !(5.0..=85.0).contains(&self.arrow_angle) {
            return Err(OptionsError::ArrowAngleRange(self.arrow_angle));
        }
        Ok(())
    }
}

// ============================================================================
// Default value functions for serde
// ============================================================================

fn default_pixelate_block() -> f64 {
    10.0
}

fn default_min_crop_extent() -> f64 {
    10.0
}

fn default_min_shape_extent() -> f64 {
    2.0
}

fn default_stroke_width() -> f64 {
    3.0
}

fn default_font_size() -> f64 {
    24.0
}

fn default_arrow_length() -> f64 {
    20.0
}

fn default_arrow_angle() -> f64 {
    30.0
}

fn default_freehand_spacing() -> f64 {
    1.0
}

fn default_max_objects() -> usize {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let options = EngineOptions::default();
        assert_eq!(options.pixelate_block, 10.0);
        assert_eq!(options.min_crop_extent, 10.0);
        assert_eq!(options.min_shape_extent, 2.0);
        assert_eq!(options.max_objects, 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults_for_the_rest() {
        let options = EngineOptions::from_toml_str("pixelate_block = 16.0\n").unwrap();
        assert_eq!(options.pixelate_block, 16.0);
        assert_eq!(options.min_crop_extent, 10.0);
    }

    #[test]
    fn non_positive_values_are_rejected() {
        let result = EngineOptions::from_toml_str("min_crop_extent = 0.0\n");
        assert!(matches!(
            result,
            Err(OptionsError::NonPositive { name: "min_crop_extent", .. })
        ));
    }

    #[test]
    fn extreme_arrow_angles_are_rejected() {
        let result = EngineOptions::from_toml_str("arrow_angle = 90.0\n");
        assert!(matches!(result, Err(OptionsError::ArrowAngleRange(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            EngineOptions::from_toml_str("pixelate_block = \"big\"\n"),
            Err(OptionsError::Parse(_))
        ));
    }
}
