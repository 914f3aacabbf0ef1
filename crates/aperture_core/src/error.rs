//! # Sensor Error Types
//!
//! All errors that can occur while creating and scheduling sensors.
//!
//! Sensor-level failures are isolated per sensor: a failed creation is
//! reported to the caller and never aborts scheduling for other sensors.
//! The "no scene yet" condition is deliberately *not* here - initialization
//! being deferred is a state of the synchronizer, not an error.

use thiserror::Error;

/// Errors that can occur in the sensor rendering subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    /// The specification names no concrete sensor kind.
    #[error("unable to create sensor [{name}]: specification has no sensor kind")]
    UnknownSensorType {
        /// Name carried by the offending specification.
        name: String,
    },

    /// The sensor factory returned nothing usable.
    #[error("failed to create sensor [{name}]: {reason}")]
    CreationFailed {
        /// Name carried by the specification.
        name: String,
        /// Why the factory rejected it.
        reason: String,
    },

    /// The render engine could not create a scene.
    ///
    /// Reported once from the worker's initialization step; the worker then
    /// parks until shutdown rather than retrying or crashing.
    #[error("render engine [{engine}] failed to create scene: {reason}")]
    SceneCreation {
        /// Name of the render engine that was asked.
        engine: String,
        /// Engine-provided failure description.
        reason: String,
    },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for sensor operations.
pub type SensorResult<T> = Result<T, SensorError>;
