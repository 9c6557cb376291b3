// --- File: crates/slotwise_common/src/http.rs ---
use serde_json::{json, Value};

use crate::error::{HttpStatusCode, SlotwiseError};

// Include the client module
pub mod client;

/// Builds the JSON error body an HTTP layer returns for a `SlotwiseError`.
///
/// ```
/// use slotwise_common::{error_body, validation_error};
///
/// let body = error_body(&validation_error("duration must be positive"));
/// assert_eq!(body["error"]["code"], 400);
/// ```
pub fn error_body(err: &SlotwiseError) -> Value {
    json!({
        "error": {
            "message": err.to_string(),
            "code": err.status_code(),
        }
    })
}
