use serde::{Deserialize, Serialize};

/// A student sign-in request: the kiosk submits the school ID typed or
/// scanned at the login screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentLoginRequest {
    pub school_id: String,
}
