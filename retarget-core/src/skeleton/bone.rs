use glam::Vec3;
use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Display-layer membership of a bone; the host exposes 32 layers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(from = "u32", into = "u32")]
    pub struct Layers: u32 {
        const FACE = 1 << 0;
        const ROOT = 1 << 28;
        const DEF = 1 << 29;
        const MCH = 1 << 30;
        const ORG = 1 << 31;
        const _ = !0;
    }
}

impl Default for Layers {
    fn default() -> Self { Layers::empty() }
}

impl From<u32> for Layers {
    fn from(bits: u32) -> Self { Layers::from_bits_retain(bits) }
}

impl From<Layers> for u32 {
    fn from(layers: Layers) -> u32 { layers.bits() }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    StretchTo,
    CopyTransforms,
    DampedTrack,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub name: String,
    #[serde(default)]
    pub kind: ConstraintKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtarget: Option<String>,
}

impl Constraint {
    pub fn new(name: &str, kind: ConstraintKind) -> Self {
        Self { name: name.to_string(), kind, target: None, subtarget: None }
    }

    pub fn with_target(mut self, target: &str, subtarget: &str) -> Self {
        self.target = Some(target.to_string());
        self.subtarget = Some(subtarget.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollAlignment {
    Automatic,
    #[default]
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationAxis {
    #[default]
    Automatic,
    X,
    NegX,
    Z,
    NegZ,
}

/// Per-bone settings read by the rig generator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigParameters {
    pub roll_alignment: RollAlignment,
    /// Number of deform segments a limb bone is split into; `None` for non-limb bones.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<u32>,
    pub rotation_axis: RotationAxis,
}

/// Pose-side data, only reachable through a pose-mode scope.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseBone {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    pub params: RigParameters,
}

impl PoseBone {
    pub fn constraint_mut(&mut self, name: &str) -> Option<&mut Constraint> {
        self.constraints.iter_mut().find(|c| c.name == name)
    }

    fn is_default(&self) -> bool { *self == PoseBone::default() }
}

fn deform_default() -> bool { true }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    pub head: Vec3,
    pub tail: Vec3,
    #[serde(default)]
    pub roll: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub use_connect: bool,
    #[serde(default = "deform_default")]
    pub deform: bool,
    #[serde(default)]
    pub layers: Layers,
    #[serde(default, skip_serializing_if = "PoseBone::is_default")]
    pub pose: PoseBone,
}

impl Bone {
    pub fn new(name: &str, head: Vec3, tail: Vec3) -> Self {
        Self {
            name: name.to_string(),
            head,
            tail,
            roll: 0.0,
            parent: None,
            use_connect: false,
            deform: true,
            layers: Layers::empty(),
            pose: PoseBone::default(),
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self { self.parent = Some(parent.to_string()); self }
    pub fn connected(mut self) -> Self { self.use_connect = true; self }
    pub fn with_roll(mut self, roll: f32) -> Self { self.roll = roll; self }
    pub fn with_layers(mut self, layers: Layers) -> Self { self.layers = layers; self }
    pub fn non_deforming(mut self) -> Self { self.deform = false; self }

    pub fn vector(&self) -> Vec3 { self.tail - self.head }
    pub fn length(&self) -> f32 { self.vector().length() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_round_trip_through_raw_bits() {
        let layers = Layers::ORG | Layers::from_bits_retain(1 << 3);
        let yaml = serde_yaml::to_string(&layers).expect("serialize");
        let back: Layers = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back, layers);
        assert!(back.contains(Layers::ORG));
    }

    #[test]
    fn bone_defaults_when_fields_omitted() {
        let yaml = "name: Hips\nhead: [0.0, 0.0, 1.0]\ntail: [0.0, 0.0, 1.1]\n";
        let bone: Bone = serde_yaml::from_str(yaml).expect("bone");
        assert!(bone.deform);
        assert!(!bone.use_connect);
        assert_eq!(bone.parent, None);
        assert_eq!(bone.pose, PoseBone::default());
        assert!((bone.length() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn constraint_lookup_by_name() {
        let mut pose = PoseBone::default();
        pose.constraints.push(Constraint::new("Stretch To", ConstraintKind::StretchTo).with_target("rig", "neck"));
        let c = pose.constraint_mut("Stretch To").expect("constraint");
        assert_eq!(c.subtarget.as_deref(), Some("neck"));
        assert!(pose.constraint_mut("Copy Transforms").is_none());
    }
}
