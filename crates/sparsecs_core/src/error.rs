//! # Error Types
//!
//! Only recoverable failures live here. Logic errors such as reading a
//! component that was never attached are contract violations and panic.

use thiserror::Error;

use crate::entity::Entity;

/// Errors returned by the checked registry API and configuration loading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle refers to a destroyed entity or was never issued.
    #[error("entity {0} is not alive")]
    DeadEntity(Entity),

    /// The entity is alive but does not carry the requested component.
    #[error("entity {entity} has no component of type {component}")]
    MissingComponent {
        /// The entity that was queried.
        entity: Entity,
        /// Name of the component type.
        component: &'static str,
    },

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration text is not valid TOML for [`crate::RegistryConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(String),
}

/// Result type for fallible ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
