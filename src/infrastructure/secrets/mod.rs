//! Secret Backend Implementations
//!
//! - `EnvSecretBackend` - `<SERVICE>__<KEY>` environment variables
//! - `BitwardenSecretBackend` - `bw get item <service>`
//! - `StaticSecretBackend` - fixed table for tests and embedding

mod bitwarden;
mod env;
mod static_backend;

pub use bitwarden::BitwardenSecretBackend;
pub use env::EnvSecretBackend;
pub use static_backend::StaticSecretBackend;
