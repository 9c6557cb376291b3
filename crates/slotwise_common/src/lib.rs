// --- File: crates/slotwise_common/src/lib.rs ---

// Declare modules within this crate
pub mod models;    // Shared data structures
pub mod error;     // Error handling
pub mod http;      // HTTP utilities
pub mod services;  // Service abstractions
pub mod logging;   // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    SlotwiseError,
    HttpStatusCode,
    config_error,
    validation_error,
    external_service_error,
    timeout_error,
};

// Re-export HTTP utilities for easier access
pub use http::{error_body, client::create_client};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_result};

pub use models::{InvalidCoordinates, Location};
pub use services::BoxFuture;
