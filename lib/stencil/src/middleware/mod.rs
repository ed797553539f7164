//! Tower middleware for [`HyperConnector`](crate::HyperConnector).
//!
//! Layers wrap the connector's inner service and see every assembled request
//! and its response:
//!
//! ```ignore
//! use stencil::HyperConnector;
//! use stencil::middleware::LoggingLayer;
//!
//! let connector = HyperConnector::builder()
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod logging;

pub use logging::{LogLevel, Logging, LoggingLayer};

// Re-export tower types for convenience
pub use tower::{Layer, ServiceBuilder};
