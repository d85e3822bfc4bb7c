//! Skeleton container: an ordered forest of named bones.

pub mod bone;
pub mod edit;

pub use bone::{Bone, Constraint, ConstraintKind, Layers, PoseBone, RigParameters, RollAlignment, RotationAxis};
pub use edit::{EditBones, PoseBones};

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::Mat4;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};
use crate::host::{EditMode, PoseMode};

fn identity() -> Mat4 { Mat4::IDENTITY }

/// Deserializing goes through [`Skeleton::from_bones`], so a loaded document is always valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkeletonDoc")]
pub struct Skeleton {
    name: String,
    matrix_world: Mat4,
    bones: Vec<Bone>,
}

#[derive(Deserialize)]
struct SkeletonDoc {
    name: String,
    #[serde(default = "identity")]
    matrix_world: Mat4,
    bones: Vec<Bone>,
}

impl TryFrom<SkeletonDoc> for Skeleton {
    type Error = RigError;

    fn try_from(doc: SkeletonDoc) -> Result<Self> {
        let mut skeleton = Skeleton::from_bones(&doc.name, doc.bones)?;
        skeleton.matrix_world = doc.matrix_world;
        Ok(skeleton)
    }
}

impl Skeleton {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string(), matrix_world: Mat4::IDENTITY, bones: Vec::new() }
    }

    /// Build a skeleton, checking names are unique and parents exist.
    /// Connected bones are snapped onto their parent's tail; a connected root is disconnected.
    pub fn from_bones(name: &str, bones: Vec<Bone>) -> Result<Self> {
        let mut skeleton = Self { name: name.to_string(), matrix_world: Mat4::IDENTITY, bones };
        let mut seen = HashMap::new();
        for (i, bone) in skeleton.bones.iter().enumerate() {
            if seen.insert(bone.name.as_str(), i).is_some() {
                return Err(RigError::DuplicateBone { skeleton: name.to_string(), bone: bone.name.clone() });
            }
        }
        for bone in &skeleton.bones {
            if let Some(parent) = &bone.parent {
                if !seen.contains_key(parent.as_str()) {
                    return Err(RigError::DanglingParent {
                        skeleton: name.to_string(),
                        bone: bone.name.clone(),
                        parent: parent.clone(),
                    });
                }
            }
        }
        let order = skeleton.traversal_indices();
        if order.len() != skeleton.bones.len() {
            let mut reached = vec![false; skeleton.bones.len()];
            for &i in &order { reached[i] = true; }
            let stuck = reached.iter().position(|r| !r).unwrap_or(0);
            return Err(RigError::ParentCycle { skeleton: name.to_string(), bone: skeleton.bones[stuck].name.clone() });
        }
        for i in order {
            let parent_tail = skeleton.bones[i].parent.as_deref().and_then(|p| skeleton.get(p)).map(|p| p.tail);
            let bone = &mut skeleton.bones[i];
            match parent_tail {
                Some(tail) if bone.use_connect => bone.head = tail,
                None => bone.use_connect = false,
                _ => {}
            }
        }
        Ok(skeleton)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn set_name(&mut self, name: &str) { self.name = name.to_string(); }
    pub fn matrix_world(&self) -> Mat4 { self.matrix_world }
    pub fn set_matrix_world(&mut self, matrix: Mat4) { self.matrix_world = matrix; }

    pub fn bones(&self) -> &[Bone] { &self.bones }
    pub fn len(&self) -> usize { self.bones.len() }
    pub fn is_empty(&self) -> bool { self.bones.is_empty() }
    pub fn contains(&self, name: &str) -> bool { self.index_of(name).is_some() }
    pub fn get(&self, name: &str) -> Option<&Bone> { self.bones.iter().find(|b| b.name == name) }

    /// Direct lookup; a missing bone means the skeleton is structurally incompatible.
    pub fn bone(&self, name: &str) -> Result<&Bone> {
        self.get(name).ok_or_else(|| RigError::missing_bone(&self.name, name))
    }

    /// Bones in depth-first, parent-before-child order. Roots and siblings keep storage order.
    pub fn traversal_order(&self) -> Vec<&Bone> {
        self.traversal_indices().into_iter().map(|i| &self.bones[i]).collect()
    }

    /// Rename a bone, updating child parent links and constraint subtargets that point at it.
    /// A taken name is made unique host-style (`name.001`); the final name is returned.
    pub fn rename_bone(&mut self, old: &str, new: &str) -> Result<String> {
        let idx = self.index_of(old).ok_or_else(|| RigError::missing_bone(&self.name, old))?;
        if old == new {
            return Ok(new.to_string());
        }
        let new = self.unique_name(new);
        let own = self.name.clone();
        for bone in &mut self.bones {
            if bone.parent.as_deref() == Some(old) {
                bone.parent = Some(new.clone());
            }
            for constraint in &mut bone.pose.constraints {
                let local = constraint.target.as_deref().map_or(true, |t| t == own);
                if local && constraint.subtarget.as_deref() == Some(old) {
                    constraint.subtarget = Some(new.clone());
                }
            }
        }
        self.bones[idx].name = new.clone();
        Ok(new)
    }

    pub fn set_deform(&mut self, name: &str, deform: bool) -> Result<()> {
        let idx = self.index_of(name).ok_or_else(|| RigError::missing_bone(&self.name, name))?;
        self.bones[idx].deform = deform;
        Ok(())
    }

    pub fn edit_bones(&mut self, _mode: &EditMode) -> EditBones<'_> { EditBones::new(self) }
    pub fn pose_bones(&mut self, _mode: &PoseMode) -> PoseBones<'_> { PoseBones::new(self) }

    fn index_of(&self, name: &str) -> Option<usize> { self.bones.iter().position(|b| b.name == name) }

    fn unique_name(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        let mut n = 1;
        loop {
            let candidate = format!("{}.{:03}", base, n);
            if !self.contains(&candidate) {
                warn!("bone name '{}' taken in '{}', using '{}'", base, self.name, candidate);
                return candidate;
            }
            n += 1;
        }
    }

    fn traversal_indices(&self) -> Vec<usize> {
        let index: HashMap<&str, usize> = self.bones.iter().enumerate().map(|(i, b)| (b.name.as_str(), i)).collect();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.bones.len()];
        let mut roots = Vec::new();
        for (i, bone) in self.bones.iter().enumerate() {
            match bone.parent.as_deref().and_then(|p| index.get(p)) {
                Some(&p) => children[p].push(i),
                None => roots.push(i),
            }
        }
        let mut order = Vec::with_capacity(self.bones.len());
        let mut stack: Vec<usize> = roots.into_iter().rev().collect();
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(children[i].iter().rev());
        }
        order
    }
}

pub fn load_from_yaml_str(s: &str) -> anyhow::Result<Skeleton> {
    let skeleton: Skeleton = serde_yaml::from_str(s)?;
    Ok(skeleton)
}

pub fn load_from_json_str(s: &str) -> anyhow::Result<Skeleton> {
    let skeleton: Skeleton = serde_json::from_str(s)?;
    Ok(skeleton)
}

/// Load a skeleton document; `.json` files are read as JSON, anything else as YAML.
pub fn load_from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Skeleton> {
    let path = path.as_ref();
    let data = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = if is_json(path) { load_from_json_str(&data) } else { load_from_yaml_str(&data) };
    parsed.with_context(|| format!("loading skeleton from {}", path.display()))
}

pub fn save_to_path<P: AsRef<Path>>(skeleton: &Skeleton, path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    let data = if is_json(path) { serde_json::to_string_pretty(skeleton)? } else { serde_yaml::to_string(skeleton)? };
    std::fs::write(path, data).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()).map_or(false, |e| e.eq_ignore_ascii_case("json"))
}
