//! Outside collaborators the pipeline drives but does not implement itself: renaming the
//! imported avatar, producing the humanoid template and generating the final rig.
//!
//! The reference implementations here are deterministic and self-contained so the whole
//! pipeline can run without a host application.

pub mod generator;
pub mod metarig;
pub mod vroid;

pub use generator::NamingGenerator;
pub use metarig::HumanMetarig;
pub use vroid::VroidNameSimplifier;

use crate::error::Result;
use crate::skeleton::Skeleton;

/// Renames avatar bones in place to the simplified convention (`Hips`, `UpperArm_L`, ...).
pub trait NameSimplifier {
    fn simplify_names(&mut self, source: &mut Skeleton) -> Result<()>;
}

/// Spawns a fresh humanoid template in the template naming convention.
pub trait TemplateFactory {
    fn spawn_humanoid_template(&mut self) -> Result<Skeleton>;
}

/// Builds a control rig from a positioned template. The template is left untouched.
pub trait RigGenerator {
    fn generate(&mut self, template: &Skeleton) -> Result<Skeleton>;
}

/// All three reference services behind one value.
#[derive(Debug, Default, Clone)]
pub struct ReferenceServices {
    pub simplifier: VroidNameSimplifier,
    pub metarig: HumanMetarig,
    pub generator: NamingGenerator,
}

impl NameSimplifier for ReferenceServices {
    fn simplify_names(&mut self, source: &mut Skeleton) -> Result<()> { self.simplifier.simplify_names(source) }
}

impl TemplateFactory for ReferenceServices {
    fn spawn_humanoid_template(&mut self) -> Result<Skeleton> { self.metarig.spawn_humanoid_template() }
}

impl RigGenerator for ReferenceServices {
    fn generate(&mut self, template: &Skeleton) -> Result<Skeleton> { self.generator.generate(template) }
}
