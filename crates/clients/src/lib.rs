//! Registered API clients: loading their records from disk, checking their shared secrets and
//! answering what each of them is allowed to do.

mod auth;
pub mod authorization;
mod error;
mod record;
mod registry;

pub use auth::{Authenticator, hash_secret};
pub use authorization::{Endpoint, can_access_endpoint, can_use_provider};
pub use error::{AuthError, RegistryError};
pub use record::{ClientDefaults, ClientRecord, RateLimit};
pub use registry::ClientRegistry;
