//! Remote Surface Implementations
//!
//! - `SshSurface` - remote host via the system ssh client
//! - `LocalSurface` - the orchestrating machine
//! - `MockSurface` - in-memory recorder

mod local;
mod mock;
mod ssh;

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::entities::DeployTarget;
use crate::domain::ports::{RemoteSurface, SurfaceFactory};

pub use local::LocalSurface;
pub use mock::{MockSurface, MockSurfaceFactory, SurfaceCall};
pub use ssh::SshSurface;

/// Chooses SSH for remote targets and the local machine otherwise
#[derive(Debug, Clone)]
pub struct DefaultSurfaceFactory {
    local_root: PathBuf,
    timeout: Duration,
}

impl DefaultSurfaceFactory {
    pub fn new(local_root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            local_root: local_root.into(),
            timeout,
        }
    }
}

impl SurfaceFactory for DefaultSurfaceFactory {
    fn surface_for(&self, target: &DeployTarget) -> Box<dyn RemoteSurface> {
        match target {
            DeployTarget::Remote { .. } => {
                Box::new(SshSurface::new(target.destination(), self.timeout))
            }
            DeployTarget::Local => Box::new(LocalSurface::new(&self.local_root, self.timeout)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_target_gets_ssh_surface() {
        let factory = DefaultSurfaceFactory::new("/tmp", Duration::from_secs(1));
        let surface = factory.surface_for(&DeployTarget::Remote {
            user: "admin".to_string(),
            host: "10.0.0.5".to_string(),
        });
        assert_eq!(surface.describe(), "admin@10.0.0.5");
    }

    #[test]
    fn local_target_gets_local_surface() {
        let factory = DefaultSurfaceFactory::new("/tmp", Duration::from_secs(1));
        let surface = factory.surface_for(&DeployTarget::Local);
        assert!(surface.describe().starts_with("local"));
    }
}
