//! Error types shared by the address model and the sysfs views.

use thiserror::Error;

/// Errors that can occur while addressing or reading the USB topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// The coordinate is well formed but nothing is present on the filesystem.
    #[error("not found: {name}")]
    NotFound { name: String },
    /// The coordinate is malformed (negative, zero port, non-numeric, ...).
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// The attribute name is not declared for this kind of node.
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),
    /// The attribute file could not be read.
    #[error("attribute '{name}' unavailable: {source}")]
    AttributeUnavailable {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl TopologyError {
    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// True for outcomes that mean "the device is not there right now".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
