use std::ops::{Deref, DerefMut};

use mongodb::error::Error as DbError;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::model::mongodb::{Coll, Id};

/// Username of the admin account created on first launch.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// Core admin user data.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    pub password_hash: String,
}

impl AdminCore {
    /// Create an admin with the given username, hashing the password.
    pub fn new(username: String, password: &str) -> Self {
        // 16 bytes of salt is the recommended baseline for argon2.
        let mut salt = [0_u8; 16];
        rand::thread_rng().fill(&mut salt);
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
                .expect("the default argon2 config is valid");
        Self {
            username,
            password_hash,
        }
    }

    /// Check whether the given password is correct.
    pub fn verify_password<T: AsRef<[u8]>>(&self, password: T) -> bool {
        // Unwrap is safe: admins are only ever constructed through
        // `AdminCore::new`, so the stored hash is always well-formed.
        argon2::verify_encoded(&self.password_hash, password.as_ref()).unwrap()
    }
}

/// An admin without an ID.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

impl DerefMut for Admin {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.admin
    }
}

/// Create the default admin account if and only if no admins exist,
/// so the dashboard is never unreachable on a fresh deployment.
pub async fn ensure_admin_exists(admins: &Coll<NewAdmin>, config: &Config) -> Result<(), DbError> {
    let count = admins.count_documents(None, None).await?;
    if count == 0 {
        let admin = AdminCore::new(
            DEFAULT_ADMIN_USERNAME.to_string(),
            config.default_admin_password(),
        );
        admins.insert_one(admin, None).await?;
        warn!("Created default admin '{DEFAULT_ADMIN_USERNAME}'; change its password");
    }
    Ok(())
}
