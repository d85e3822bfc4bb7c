//! Humanoid template factory backed by a YAML bone document.

use serde::Deserialize;

use super::TemplateFactory;
use crate::error::{Result, RigError};
use crate::geometry::mirror_x;
use crate::skeleton::{Bone, Skeleton};

const HUMAN: &str = include_str!("../../assets/metarig_human.yaml");

#[derive(Debug, Deserialize)]
struct TemplateDoc {
    name: String,
    #[serde(default)]
    mirror_left: bool,
    bones: Vec<Bone>,
}

fn to_right(name: &str) -> Option<String> { name.strip_suffix(".L").map(|stem| format!("{}.R", stem)) }

fn mirrored(bone: &Bone) -> Option<Bone> {
    let mut out = bone.clone();
    out.name = to_right(&bone.name)?;
    out.parent = bone.parent.as_deref().map(|p| to_right(p).unwrap_or_else(|| p.to_string()));
    out.head = mirror_x(bone.head);
    out.tail = mirror_x(bone.tail);
    out.roll = -bone.roll;
    Some(out)
}

/// Spawns a humanoid template from a bone document. The default document is the generic
/// human template bundled with the crate.
#[derive(Debug, Clone)]
pub struct HumanMetarig {
    document: String,
}

impl Default for HumanMetarig {
    fn default() -> Self { Self { document: HUMAN.to_string() } }
}

impl HumanMetarig {
    pub fn from_yaml(document: impl Into<String>) -> Self { Self { document: document.into() } }

    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        Ok(Self::from_yaml(std::fs::read_to_string(path)?))
    }
}

impl TemplateFactory for HumanMetarig {
    fn spawn_humanoid_template(&mut self) -> Result<Skeleton> {
        let doc: TemplateDoc =
            serde_yaml::from_str(&self.document).map_err(|e| RigError::service("template factory", e.to_string()))?;
        let mut bones = doc.bones;
        if doc.mirror_left {
            let right: Vec<Bone> = bones.iter().filter_map(mirrored).collect();
            bones.extend(right);
        }
        Skeleton::from_bones(&doc.name, bones)
    }
}
