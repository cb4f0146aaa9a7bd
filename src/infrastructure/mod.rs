//! Infrastructure Layer
//!
//! Concrete implementations of the domain ports:
//! - `surface` - SSH, local and in-memory remote surfaces
//! - `secrets` - environment, Bitwarden and static secret backends
//! - `events` - console and NDJSON event sinks
//! - `process` - child process runner with a hard timeout

pub mod events;
pub mod process;
pub mod secrets;
pub mod surface;

pub use events::{ConsoleEventSink, JsonEventSink};
pub use secrets::{BitwardenSecretBackend, EnvSecretBackend, StaticSecretBackend};
pub use surface::{
    DefaultSurfaceFactory, LocalSurface, MockSurface, MockSurfaceFactory, SshSurface, SurfaceCall,
};
