//! Sensor identity, kind, and specification types.

use serde::Deserialize;
use std::fmt;

use crate::error::{SensorError, SensorResult};

/// Opaque sensor identifier.
///
/// Allocated by the registry from an atomic counter, starting at 1 and
/// never recycled. `0` is reserved and never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId(pub u64);

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor#{}", self.0)
    }
}

/// Concrete sensor kinds the platform knows about.
///
/// Whether a kind needs the render pass is decided here, once, at creation
/// time - the scheduler never inspects concrete sensor types per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    /// RGB camera.
    Camera,
    /// Depth camera.
    DepthCamera,
    /// Combined RGB + depth camera.
    RgbdCamera,
    /// GPU-accelerated lidar.
    GpuLidar,
    /// Inertial measurement unit. Stepped by the physics side, not rendered.
    Imu,
    /// Barometric altimeter. Stepped by the physics side, not rendered.
    Altimeter,
}

impl SensorKind {
    /// Returns true if sensors of this kind produce their output through
    /// the render pass (and therefore belong to the rendering subsystem).
    #[must_use]
    pub const fn is_rendering(self) -> bool {
        matches!(
            self,
            Self::Camera | Self::DepthCamera | Self::RgbdCamera | Self::GpuLidar
        )
    }

    /// Stable lowercase label, matching the specification file syntax.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::DepthCamera => "depth_camera",
            Self::RgbdCamera => "rgbd_camera",
            Self::GpuLidar => "gpu_lidar",
            Self::Imu => "imu",
            Self::Altimeter => "altimeter",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// External sensor specification, as handed over by the scenario loader.
///
/// `kind` is optional because specification files may carry sensor elements
/// the platform has no concrete implementation for; those fail creation
/// with [`SensorError::UnknownSensorType`] instead of aborting the load.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorSpec {
    /// Sensor name, unique within its parent.
    pub name: String,
    /// Concrete kind, if the specification names one.
    #[serde(default)]
    pub kind: Option<SensorKind>,
    /// Declared update rate in Hz. Must be finite and positive.
    pub update_rate_hz: f64,
    /// Publication topic override, if any.
    #[serde(default)]
    pub topic: Option<String>,
}

impl SensorSpec {
    /// Checks the specification for values the registry cannot work with.
    ///
    /// # Errors
    ///
    /// [`SensorError::UnknownSensorType`] when no kind is named,
    /// [`SensorError::CreationFailed`] when the update rate is not a
    /// finite positive number (the mask arithmetic divides by it).
    pub fn validate(&self) -> SensorResult<SensorKind> {
        let kind = self.kind.ok_or_else(|| SensorError::UnknownSensorType {
            name: self.name.clone(),
        })?;
        if !self.update_rate_hz.is_finite() || self.update_rate_hz <= 0.0 {
            return Err(SensorError::CreationFailed {
                name: self.name.clone(),
                reason: format!("update rate must be positive, got {}", self.update_rate_hz),
            });
        }
        Ok(kind)
    }

    /// Nominal period between updates.
    ///
    /// Only meaningful after [`SensorSpec::validate`] has accepted the rate.
    #[must_use]
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.update_rate_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn camera_spec() -> SensorSpec {
        SensorSpec {
            name: "front_camera".into(),
            kind: Some(SensorKind::Camera),
            update_rate_hz: 10.0,
            topic: None,
        }
    }

    #[test]
    fn test_validate_accepts_camera() {
        assert_eq!(camera_spec().validate(), Ok(SensorKind::Camera));
    }

    #[test]
    fn test_validate_rejects_missing_kind() {
        let spec = SensorSpec {
            kind: None,
            ..camera_spec()
        };
        assert_eq!(
            spec.validate(),
            Err(SensorError::UnknownSensorType {
                name: "front_camera".into()
            })
        );
    }

    #[test]
    fn test_validate_rejects_bad_rate() {
        for rate in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let spec = SensorSpec {
                update_rate_hz: rate,
                ..camera_spec()
            };
            assert!(matches!(
                spec.validate(),
                Err(SensorError::CreationFailed { .. })
            ));
        }
    }

    #[test]
    fn test_rendering_capability() {
        assert!(SensorKind::Camera.is_rendering());
        assert!(SensorKind::GpuLidar.is_rendering());
        assert!(!SensorKind::Imu.is_rendering());
        assert!(!SensorKind::Altimeter.is_rendering());
    }

    #[test]
    fn test_period() {
        assert_eq!(camera_spec().period(), Duration::from_millis(100));
    }

    #[test]
    fn test_spec_deserializes_from_toml_fragment() {
        let spec: SensorSpec = toml::from_str(
            r#"
            name = "roof_lidar"
            kind = "gpu_lidar"
            update_rate_hz = 20.0
            topic = "/lidar/points"
            "#,
        )
        .unwrap();
        assert_eq!(spec.kind, Some(SensorKind::GpuLidar));
        assert_eq!(spec.topic.as_deref(), Some("/lidar/points"));
    }
}
