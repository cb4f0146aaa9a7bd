//! Value Objects
//!
//! Immutable types with no identity of their own.

mod hash;
mod service_type;

pub use hash::ContentHash;
pub use service_type::{ServiceType, UnknownServiceType};
