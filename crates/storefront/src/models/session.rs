//! Session-related types.
//!
//! Each browser session owns one cart. The session stores only an opaque
//! owner token; the cart itself lives in the durable cart store under that
//! token's namespace.

use std::fmt;

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

/// Opaque token naming the cart that belongs to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartOwner(String);

impl CartOwner {
    /// Generate a fresh owner token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fetch the owner token from the session, creating one if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read or written.
    pub async fn from_session(session: &Session) -> Result<Self, tower_sessions::session::Error> {
        if let Some(owner) = session.get::<Self>(keys::CART_OWNER).await? {
            return Ok(owner);
        }
        let owner = Self::generate();
        session.insert(keys::CART_OWNER, &owner).await?;
        tracing::debug!(owner = %owner, "Assigned cart owner to session");
        Ok(owner)
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session keys.
pub mod keys {
    /// Key for the cart owner token.
    pub const CART_OWNER: &str = "cart_owner";
}
