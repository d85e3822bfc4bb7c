//! Humanoid skeleton retargeting: position a generic rig template on an imported avatar, then
//! reconcile the generated control rig with the avatar's own bone names and extra chains.

pub mod config;
pub mod correspondence;
pub mod error;
pub mod geometry;
pub mod host;
pub mod pipeline;
pub mod reconcile;
pub mod services;
pub mod skeleton;
pub mod template;

pub use error::{Result, RigError};
pub use pipeline::{retarget, Retargeted};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
