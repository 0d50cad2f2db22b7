//! Error handling for MapScope
//!
//! Provides the error taxonomy shared by every crate in the workspace:
//! - Validation errors (missing or malformed user input)
//! - Not-ready errors (render surface or collaborator not initialized)
//! - Service errors (feature, routing and raster info requests)
//! - Geometry errors (measurement and buffer computation)
//!
//! Stale async results are not errors; they are reported as a
//! discarded outcome by the caller that checked staleness.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Validation error type
///
/// Raised before any computation runs when the operator's input is
/// incomplete. Validation failures never mutate state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// No layer was chosen
    #[error("Select a layer first")]
    NoLayerSelected,

    /// No attribute field was chosen
    #[error("Select an attribute field")]
    NoFieldSelected,

    /// The query value is empty after trimming
    #[error("Enter a query value")]
    EmptyValue,

    /// The layer does not exist or is not loaded
    #[error("Layer {layer_id} does not exist or is not loaded")]
    UnknownLayer {
        /// The requested layer identifier.
        layer_id: String,
    },

    /// Comparison operator is not recognised
    #[error("Unknown operator: {operator}")]
    UnknownOperator {
        /// The operator text that failed to parse.
        operator: String,
    },

    /// Buffer distance is zero, negative or not a number
    #[error("Enter a valid buffer distance (got {distance})")]
    InvalidDistance {
        /// The rejected distance in meters.
        distance: f64,
    },

    /// The layer has no features yet
    #[error("Layer {layer_id} has no features (still loading or empty)")]
    LayerEmpty {
        /// The layer identifier.
        layer_id: String,
    },

    /// A route needs both endpoints
    #[error("Route is missing its {endpoint} point")]
    MissingRouteEndpoint {
        /// Either "start" or "end".
        endpoint: String,
    },
}

/// Not-ready error type
///
/// The map surface or a collaborator has not been initialized yet.
/// The action is aborted and retried lazily on the next user action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotReadyError {
    /// Rendering surface has not finished initializing
    #[error("Map surface is not ready")]
    Surface,

    /// A collaborator has not been configured
    #[error("{collaborator} is not available")]
    Collaborator {
        /// Name of the missing collaborator.
        collaborator: String,
    },
}

/// Service error type
///
/// Represents failures of remote HTTP collaborators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// The request could not be sent or the connection failed
    #[error("{service} request failed: {reason}")]
    RequestFailed {
        /// Name of the service.
        service: String,
        /// Transport level reason.
        reason: String,
    },

    /// The server answered with a non-success HTTP status
    #[error("{service} returned HTTP {status}")]
    HttpStatus {
        /// Name of the service.
        service: String,
        /// HTTP status code.
        status: u16,
    },

    /// The body could not be decoded
    #[error("{service} returned an invalid response: {reason}")]
    InvalidResponse {
        /// Name of the service.
        service: String,
        /// Decoding failure.
        reason: String,
    },

    /// The server answered but reported a failure in its payload
    #[error("{service} rejected the request: {code}")]
    Rejected {
        /// Name of the service.
        service: String,
        /// Application level status code.
        code: String,
    },

    /// The background task running the request was cancelled or panicked
    #[error("{service} task aborted")]
    TaskAborted {
        /// Name of the service.
        service: String,
    },
}

/// Geometry error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Geometry has no coordinates
    #[error("Geometry is empty")]
    Empty,

    /// Geometry is malformed (e.g. ring with fewer than three vertices)
    #[error("Invalid geometry: {reason}")]
    Invalid {
        /// The reason the geometry is invalid.
        reason: String,
    },

    /// GeoJSON geometry type is not handled
    #[error("Unsupported geometry type: {geometry_type}")]
    Unsupported {
        /// The unsupported type name.
        geometry_type: String,
    },

    /// Buffer computation produced nothing usable
    #[error("Buffer failed: {reason}")]
    BufferFailed {
        /// The reason the buffer failed.
        reason: String,
    },
}

/// Main error type for MapScope
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Not-ready error
    #[error(transparent)]
    NotReady(#[from] NotReadyError),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is a not-ready error
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Error::NotReady(_))
    }

    /// Check if this is a remote service error
    pub fn is_service_error(&self) -> bool {
        matches!(self, Error::Service(_))
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
