//! Scoped access to the host application's editing modes.
//!
//! Bone geometry and pose data are only reachable through the capability tokens handed out by
//! [`editing`] and [`posing`]. The scope restores the previously active mode when it ends,
//! whether the closure returns normally, returns an error, or panics.

pub mod scene;

pub use scene::SceneHost;

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Object,
    /// Bone head/tail/roll/parent/connection/layers are mutable.
    Edit,
    /// Per-bone constraints and generator parameters are mutable.
    Pose,
}

/// The host scene/selection service.
pub trait Host {
    fn select(&mut self, object: &str, selected: bool);
    fn current_mode(&self) -> Mode;
    /// Switching commits edits made in the previous mode.
    fn set_mode(&mut self, mode: Mode);
}

/// Capability for geometry edits; see [`crate::skeleton::Skeleton::edit_bones`].
#[derive(Debug)]
pub struct EditMode {
    _private: (),
}

/// Capability for pose-data edits; see [`crate::skeleton::Skeleton::pose_bones`].
#[derive(Debug)]
pub struct PoseMode {
    _private: (),
}

/// Guard that switches the host into a mode and switches back on drop.
pub struct ModeScope<'h, H: Host + ?Sized> {
    host: &'h mut H,
    previous: Mode,
}

impl<'h, H: Host + ?Sized> ModeScope<'h, H> {
    pub fn enter(host: &'h mut H, objects: &[&str], mode: Mode) -> Self {
        for object in objects {
            host.select(object, true);
        }
        let previous = host.current_mode();
        debug!("entering {:?} mode (was {:?}) for {:?}", mode, previous, objects);
        host.set_mode(mode);
        Self { host, previous }
    }

    pub fn previous(&self) -> Mode { self.previous }
}

impl<H: Host + ?Sized> Drop for ModeScope<'_, H> {
    fn drop(&mut self) {
        debug!("restoring {:?} mode", self.previous);
        self.host.set_mode(self.previous);
    }
}

/// Select `objects`, enter edit mode, and run `f` with the edit capability.
pub fn editing<H, R, E, F>(host: &mut H, objects: &[&str], f: F) -> Result<R, E>
where
    H: Host + ?Sized,
    F: FnOnce(&EditMode) -> Result<R, E>,
{
    let _scope = ModeScope::enter(host, objects, Mode::Edit);
    f(&EditMode { _private: () })
}

/// Select `objects`, enter pose mode, and run `f` with the pose capability.
pub fn posing<H, R, E, F>(host: &mut H, objects: &[&str], f: F) -> Result<R, E>
where
    H: Host + ?Sized,
    F: FnOnce(&PoseMode) -> Result<R, E>,
{
    let _scope = ModeScope::enter(host, objects, Mode::Pose);
    f(&PoseMode { _private: () })
}
