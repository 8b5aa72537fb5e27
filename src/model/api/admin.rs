use serde::{Deserialize, Serialize};

use crate::model::db::admin::{AdminCore, NewAdmin};

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Raw admin credentials, received from a user. These are never stored
/// directly, since the password is in plaintext.
#[derive(Clone, Deserialize, Serialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl TryFrom<AdminCredentials> for NewAdmin {
    type Error = ();

    /// Convert [`AdminCredentials`] to a new [`Admin`](crate::model::db::Admin)
    /// by hashing the password. This enforces that the username is non-empty
    /// and the password meets the minimum length.
    fn try_from(credentials: AdminCredentials) -> Result<Self, Self::Error> {
        if credentials.username.is_empty() || credentials.password.len() < MIN_PASSWORD_LENGTH {
            return Err(());
        }
        Ok(AdminCore::new(credentials.username, &credentials.password))
    }
}
