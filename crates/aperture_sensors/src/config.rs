//! Subsystem configuration, loaded once at startup from TOML.

use serde::Deserialize;

use aperture_core::{MaskPolicy, MaskScope, SensorError, SensorResult};

/// Configuration for the sensor rendering subsystem.
///
/// ```toml
/// engine = "ogre2"
/// mask_fraction = 0.9
/// mask_scope = "per_sensor"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorsConfig {
    /// Render engine to request from the host, by name.
    pub engine: String,
    /// Fraction of a sensor's period masked off after each schedule.
    pub mask_fraction: f64,
    /// Whether the mask window follows each sensor's own rate or the
    /// fastest sensor in the batch.
    pub mask_scope: MaskScope,
}

impl Default for SensorsConfig {
    fn default() -> Self {
        Self {
            engine: "ogre2".to_string(),
            mask_fraction: 0.9,
            mask_scope: MaskScope::PerSensor,
        }
    }
}

impl SensorsConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`SensorError::InvalidConfig`] on parse failure or an out-of-range
    /// field.
    pub fn from_toml_str(raw: &str) -> SensorResult<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| SensorError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates field ranges.
    ///
    /// # Errors
    ///
    /// [`SensorError::InvalidConfig`] if the engine name is empty or the
    /// mask fraction falls outside `(0, 1]`.
    pub fn validate(&self) -> SensorResult<()> {
        if self.engine.is_empty() {
            return Err(SensorError::InvalidConfig(
                "engine name must not be empty".to_string(),
            ));
        }
        if !self.mask_fraction.is_finite()
            || self.mask_fraction <= 0.0
            || self.mask_fraction > 1.0
        {
            return Err(SensorError::InvalidConfig(format!(
                "mask_fraction must be in (0, 1], got {}",
                self.mask_fraction
            )));
        }
        Ok(())
    }

    /// The mask policy this configuration describes.
    #[must_use]
    pub fn mask_policy(&self) -> MaskPolicy {
        MaskPolicy {
            fraction: self.mask_fraction,
            scope: self.mask_scope,
        }
    }
}
