//! Service Type Value Object
//!
//! Distinguishes the two deployment shapes the planner knows about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of deployable unit
///
/// - `Platform`: a repository cloned and composed on the orchestrating machine
/// - `Service`: a single container pushed to a remote host over SSH
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Platform,
    Service,
}

impl ServiceType {
    pub const ALL: [ServiceType; 2] = [ServiceType::Platform, ServiceType::Service];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Platform => "platform",
            ServiceType::Service => "service",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown service type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownServiceType(pub String);

impl fmt::Display for UnknownServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid type '{}' (expected one of: platform, service)",
            self.0
        )
    }
}

impl std::error::Error for UnknownServiceType {}

impl FromStr for ServiceType {
    type Err = UnknownServiceType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Exact match, like service names
        match s {
            "platform" => Ok(ServiceType::Platform),
            "service" => Ok(ServiceType::Service),
            other => Err(UnknownServiceType(other.to_string())),
        }
    }
}
