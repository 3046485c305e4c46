use tracing::debug;

use crate::docker::{ContainerId, Engine};

/// Owns the temporary container and force-removes it exactly once: through
/// [`ContainerGuard::remove`], or on drop if the build unwinds first.
///
/// Removal errors are swallowed so they can never mask a build failure.
pub struct ContainerGuard<'a, E: Engine + ?Sized> {
    engine: &'a E,
    id: ContainerId,
    removed: bool,
}

impl<'a, E: Engine + ?Sized> ContainerGuard<'a, E> {
    pub fn new(engine: &'a E, id: ContainerId) -> Self {
        Self {
            engine,
            id,
            removed: false,
        }
    }

    pub fn id(&self) -> &ContainerId {
        &self.id
    }

    pub fn remove(mut self) {
        self.remove_once();
    }

    fn remove_once(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        match self.engine.remove(&self.id) {
            Ok(()) => debug!(container = %self.id.short(), "temporary container removed"),
            Err(e) => debug!(container = %self.id.short(), error = %e, "ignoring cleanup failure"),
        }
    }
}

impl<E: Engine + ?Sized> Drop for ContainerGuard<'_, E> {
    fn drop(&mut self) {
        self.remove_once();
    }
}
