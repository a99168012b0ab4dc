use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::{AuthError, ClientRecord, ClientRegistry};

/// Lowercase hex SHA-256 of a shared secret, the form stored in client files.
pub fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}

/// Verifies client credentials against the registry.
#[derive(Clone)]
pub struct Authenticator {
    registry: Arc<ClientRegistry>,
}

impl Authenticator {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    pub fn authenticate(&self, client_id: &str, secret: &SecretString) -> Result<Arc<ClientRecord>, AuthError> {
        let Some(record) = self.registry.get(client_id) else {
            log::warn!("Client configuration not found: {client_id}");
            return Err(AuthError::InvalidCredentials);
        };

        let Some(stored) = record.client_secret_hash.as_deref() else {
            log::warn!("Client {client_id} has no secret configured");
            return Err(AuthError::InvalidCredentials);
        };

        let computed = hash_secret(secret.expose_secret());

        if !bool::from(computed.as_bytes().ct_eq(stored.as_bytes())) {
            log::warn!("Invalid credentials provided for client: {client_id}");
            return Err(AuthError::InvalidCredentials);
        }

        log::debug!("Client authenticated successfully: {client_id}");

        Ok(record)
    }
}
