//! Effect configuration.
//!
//! Every tunable of the presentation layer lives here. Defaults reproduce the
//! values the invoicing UI ships with, so `FxConfig::default()` is the
//! production configuration. Overrides are read from TOML; missing keys fall
//! back to defaults.
//!
//! # Example
//!
//! ```ignore
//! use invoice_fx::config::FxConfig;
//!
//! let config = FxConfig::from_toml_str(r#"
//!     [reveal]
//!     threshold = 0.25
//!
//!     [parallax]
//!     rate = -0.3
//! "#)?;
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FxError, Result};
use crate::state::intersection::RootMargin;
use crate::types::Rgba;

// =============================================================================
// Sections
// =============================================================================

/// Scroll reveal of cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Fraction of the target that must be visible.
    pub threshold: f32,
    /// CSS margin shorthand applied to the viewport.
    pub root_margin: String,
    pub duration_ms: u64,
    /// Delay added per target index.
    pub stagger_ms: u64,
    /// Initial downward offset of hidden cards.
    pub hidden_offset_px: f32,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: "0px 0px -50px 0px".into(),
            duration_ms: 600,
            stagger_ms: 100,
            hidden_offset_px: 20.0,
        }
    }
}

impl RevealSettings {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    pub fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxSettings {
    /// Background offset per scrolled pixel.
    pub rate: f32,
}

impl Default for ParallaxSettings {
    fn default() -> Self {
        Self { rate: -0.5 }
    }
}

/// Pointer attraction of `.floating-card` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GravitySettings {
    pub radius: f32,
    pub strength: f32,
    /// Degrees of tilt per pixel of movement.
    pub tilt: f32,
}

impl Default for GravitySettings {
    fn default() -> Self {
        Self {
            radius: 200.0,
            strength: 0.1,
            tilt: 0.5,
        }
    }
}

/// Periodic icon pulse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PulseSettings {
    pub period_ms: u64,
    pub peak_scale: f32,
    pub hold_ms: u64,
}

impl Default for PulseSettings {
    fn default() -> Self {
        Self {
            period_ms: 3000,
            peak_scale: 1.2,
            hold_ms: 150,
        }
    }
}

impl PulseSettings {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn hold(&self) -> Duration {
        Duration::from_millis(self.hold_ms)
    }
}

/// Page-load cascade of `.zoom-in` elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomSettings {
    pub start_delay_ms: u64,
    pub step_ms: u64,
}

impl Default for ZoomSettings {
    fn default() -> Self {
        Self {
            start_delay_ms: 100,
            step_ms: 100,
        }
    }
}

/// How a failed registration check is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackMode {
    /// Mark the field and show the message next to it. Never blocks the page.
    #[default]
    Inline,
    /// Only report the message to the caller (who shows a dialog).
    Blocking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Mirrors the server's minimum password length. `None` disables the check.
    pub min_password_len: Option<usize>,
    pub require_all_fields: bool,
    pub feedback: FeedbackMode,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            min_password_len: Some(6),
            require_all_fields: true,
            feedback: FeedbackMode::Inline,
        }
    }
}

/// User-facing strings. `{min}` is replaced with the configured length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub password_mismatch: String,
    pub missing_field: String,
    pub password_too_short: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            password_mismatch: "كلمة المرور وتأكيد كلمة المرور غير متطابقين!".into(),
            missing_field: "الرجاء تعبئة جميع الحقول.".into(),
            password_too_short: "كلمة المرور يجب أن تكون {min} أحرف على الأقل.".into(),
        }
    }
}

// =============================================================================
// FxConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FxConfig {
    pub reveal: RevealSettings,
    pub parallax: ParallaxSettings,
    pub gravity: GravitySettings,
    pub pulse: PulseSettings,
    pub zoom: ZoomSettings,
    /// Background colours cycled across navbar links.
    pub nav_palette: Vec<Rgba>,
    /// Box shadow applied to hovered cards.
    pub card_glow: String,
    /// Seed for sparkle placement. `None` seeds from entropy.
    pub sparkle_seed: Option<u64>,
    pub validation: ValidationSettings,
    pub messages: Messages,
}

impl Default for FxConfig {
    fn default() -> Self {
        Self {
            reveal: RevealSettings::default(),
            parallax: ParallaxSettings::default(),
            gravity: GravitySettings::default(),
            pulse: PulseSettings::default(),
            zoom: ZoomSettings::default(),
            nav_palette: vec![
                Rgba::from_rgb_int(0x667eea),
                Rgba::from_rgb_int(0x764ba2),
                Rgba::from_rgb_int(0xf093fb),
                Rgba::from_rgb_int(0xf5576c),
                Rgba::from_rgb_int(0x4facfe),
                Rgba::from_rgb_int(0x00f2fe),
            ],
            card_glow: "0 30px 60px rgba(31, 38, 135, 0.4), 0 0 50px rgba(102, 126, 234, 0.6)"
                .into(),
            sparkle_seed: None,
            validation: ValidationSettings::default(),
            messages: Messages::default(),
        }
    }
}

impl FxConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| FxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded effect configuration");
        Ok(config)
    }

    /// Reject values no effect can work with.
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: String| -> Result<()> {
            warn!(%reason, "rejecting effect configuration");
            Err(FxError::InvalidConfig(reason))
        };

        if !(0.0..=1.0).contains(&self.reveal.threshold) {
            return reject(format!(
                "reveal.threshold must be within 0..=1, got {}",
                self.reveal.threshold
            ));
        }
        self.reveal.root_margin.parse::<RootMargin>()?;
        if self.pulse.period_ms == 0 {
            return reject("pulse.period_ms must be positive".into());
        }
        if self.nav_palette.is_empty() {
            return reject("nav_palette must not be empty".into());
        }
        if self.gravity.radius <= 0.0 {
            return reject(format!(
                "gravity.radius must be positive, got {}",
                self.gravity.radius
            ));
        }
        Ok(())
    }

    /// Password-too-short message with the minimum filled in.
    pub fn too_short_message(&self, min: usize) -> String {
        self.messages
            .password_too_short
            .replace("{min}", &min.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FxConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reveal.threshold, 0.1);
        assert_eq!(config.nav_palette.len(), 6);
        assert_eq!(config.reveal.stagger(), Duration::from_millis(100));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FxConfig::from_toml_str(
            r##"
            nav_palette = ["#000000", "#ffffff"]

            [reveal]
            threshold = 0.25

            [validation]
            feedback = "blocking"
            "##,
        )
        .unwrap();

        assert_eq!(config.reveal.threshold, 0.25);
        assert_eq!(config.reveal.root_margin, "0px 0px -50px 0px");
        assert_eq!(config.nav_palette, vec![Rgba::rgb(0, 0, 0), Rgba::WHITE]);
        assert_eq!(config.validation.feedback, FeedbackMode::Blocking);
        assert_eq!(config.parallax.rate, -0.5);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = FxConfig::from_toml_str("[reveal]\nthreshold = 1.5\n").unwrap_err();
        assert!(matches!(err, FxError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_root_margin() {
        let err = FxConfig::from_toml_str("[reveal]\nroot_margin = \"0px wide\"\n").unwrap_err();
        assert!(matches!(err, FxError::InvalidRootMargin(_)));
    }

    #[test]
    fn test_rejects_bad_palette_entry() {
        let err = FxConfig::from_toml_str("nav_palette = [\"#zzzzzz\"]\n").unwrap_err();
        assert!(matches!(err, FxError::ConfigParse(_)));
    }

    #[test]
    fn test_rejects_zero_pulse_period() {
        let err = FxConfig::from_toml_str("[pulse]\nperiod_ms = 0\n").unwrap_err();
        assert!(matches!(err, FxError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.toml");
        fs::write(&path, "[parallax]\nrate = -0.25\n").unwrap();

        let config = FxConfig::load(&path).unwrap();
        assert_eq!(config.parallax.rate, -0.25);

        let missing = FxConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, FxError::Io { .. }));
    }

    #[test]
    fn test_too_short_message_fills_min() {
        let config = FxConfig::default();
        assert!(config.too_short_message(8).contains('8'));
    }
}
