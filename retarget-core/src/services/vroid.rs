//! VRoid-style avatars: bone name simplification plus a small built-in sample avatar.

use glam::Vec3;
use log::{debug, info};

use super::NameSimplifier;
use crate::error::Result;
use crate::geometry::mirror_x;
use crate::skeleton::{Bone, Skeleton};

/// Strips the `J_<group>_<side>_` prefix of VRoid bone names: `J_Bip_C_Hips` becomes `Hips`,
/// `J_Bip_L_UpperArm` becomes `UpperArm_L`. Other names are left alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct VroidNameSimplifier;

impl VroidNameSimplifier {
    pub fn simplified(name: &str) -> Option<String> {
        let mut parts = name.splitn(4, '_');
        let (marker, _group, side, stem) = (parts.next()?, parts.next()?, parts.next()?, parts.next()?);
        if marker != "J" || stem.is_empty() {
            return None;
        }
        match side {
            "C" => Some(stem.to_string()),
            "L" | "R" => Some(format!("{}_{}", stem, side)),
            _ => None,
        }
    }
}

impl NameSimplifier for VroidNameSimplifier {
    fn simplify_names(&mut self, source: &mut Skeleton) -> Result<()> {
        let renames: Vec<(String, String)> = source
            .bones()
            .iter()
            .filter_map(|b| Self::simplified(&b.name).map(|n| (b.name.clone(), n)))
            .collect();
        for (old, new) in &renames {
            let got = source.rename_bone(old, new)?;
            debug!("{} -> {}", old, got);
        }
        info!("simplified {} bone names in '{}'", renames.len(), source.name());
        Ok(())
    }
}

const FINGER_STEMS: [&str; 5] = ["Thumb", "Index", "Middle", "Ring", "Little"];

fn left(stem: &str) -> String { format!("J_Bip_L_{}", stem) }

fn right_of(bone: &Bone) -> Bone {
    let mut out = bone.clone();
    out.name = bone.name.replace("_L_", "_R_");
    out.parent = bone.parent.as_ref().map(|p| p.replace("_L_", "_R_"));
    out.head = mirror_x(bone.head);
    out.tail = mirror_x(bone.tail);
    out.roll = -bone.roll;
    out
}

fn finger_joints(finger: usize) -> [Vec3; 4] {
    if finger == 0 {
        return [
            Vec3::new(0.57, -0.02, 1.34),
            Vec3::new(0.6, -0.04, 1.332),
            Vec3::new(0.62, -0.054, 1.326),
            Vec3::new(0.64, -0.064, 1.32),
        ];
    }
    let y = -0.02 + 0.013 * (finger - 1) as f32;
    let reach = 1.0 - 0.08 * (finger as f32 - 2.0).abs();
    let mut joints = [Vec3::new(0.64, y, 1.35); 4];
    let mut x = 0.64;
    for (n, len) in [0.03, 0.022, 0.018].into_iter().enumerate() {
        x += len * reach;
        let wobble = if n % 2 == 0 { 0.0015 } else { -0.001 };
        joints[n + 1] = Vec3::new(x, y + wobble, 1.35 - 0.003 * (n + 1) as f32);
    }
    joints
}

/// A small VRoid-style avatar with raw (unsimplified) bone names, as an importer would
/// produce it. Spine and leg segments do not quite touch, like real exports.
pub fn sample_avatar() -> Result<Skeleton> {
    let v = Vec3::new;
    let mut bones = vec![
        Bone::new("Root", Vec3::ZERO, v(0.0, 0.0, 0.1)).non_deforming(),
        Bone::new("J_Bip_C_Hips", v(0.0, 0.0, 0.95), v(0.0, 0.0, 1.0)).with_parent("Root"),
        Bone::new("J_Bip_C_Spine", v(0.0, 0.005, 1.02), v(0.0, 0.005, 1.12)).with_parent("J_Bip_C_Hips"),
        Bone::new("J_Bip_C_Chest", v(0.0, 0.005, 1.13), v(0.0, 0.0, 1.25)).with_parent("J_Bip_C_Spine"),
        Bone::new("J_Bip_C_UpperChest", v(0.0, 0.0, 1.26), v(0.0, 0.01, 1.38)).with_parent("J_Bip_C_Chest"),
        Bone::new("J_Bip_C_Neck", v(0.0, 0.01, 1.39), v(0.0, 0.015, 1.47)).with_parent("J_Bip_C_UpperChest"),
        Bone::new("J_Bip_C_Head", v(0.0, 0.015, 1.47), v(0.0, 0.015, 1.65)).with_parent("J_Bip_C_Neck").connected(),
        Bone::new("J_Sec_Hair1_01", v(0.0, 0.06, 1.62), v(0.0, 0.1, 1.52)).with_parent("J_Bip_C_Head"),
        Bone::new("J_Sec_Hair1_02", v(0.0, 0.1, 1.52), v(0.0, 0.11, 1.42)).with_parent("J_Sec_Hair1_01").connected(),
    ];

    let mut sided = vec![
        Bone::new(&left("Shoulder"), v(0.02, 0.0, 1.35), v(0.08, 0.005, 1.36)).with_parent("J_Bip_C_UpperChest"),
        Bone::new(&left("UpperArm"), v(0.08, 0.005, 1.36), v(0.32, 0.01, 1.35)).with_parent(&left("Shoulder")).with_roll(0.04),
        Bone::new(&left("LowerArm"), v(0.32, 0.01, 1.35), v(0.55, 0.0, 1.35)).with_parent(&left("UpperArm")).with_roll(0.06),
        Bone::new(&left("Hand"), v(0.55, 0.0, 1.35), v(0.62, 0.0, 1.35)).with_parent(&left("LowerArm")),
        Bone::new("J_Adj_L_FaceEye", v(0.03, -0.05, 1.55), v(0.03, -0.07, 1.55)).with_parent("J_Bip_C_Head").with_roll(0.12),
        Bone::new("J_Sec_L_Bust1", v(0.07, -0.06, 1.25), v(0.07, -0.11, 1.25)).with_parent("J_Bip_C_UpperChest"),
        Bone::new("J_Sec_L_Bust2", v(0.07, -0.11, 1.25), v(0.07, -0.13, 1.24)).with_parent("J_Sec_L_Bust1").connected(),
        Bone::new(&left("UpperLeg"), v(0.09, 0.0, 0.93), v(0.09, 0.0, 0.53)).with_parent("J_Bip_C_Hips"),
        Bone::new(&left("LowerLeg"), v(0.09, 0.01, 0.52), v(0.09, 0.02, 0.1)).with_parent(&left("UpperLeg")),
        Bone::new(&left("Foot"), v(0.09, 0.02, 0.09), v(0.09, -0.07, 0.02)).with_parent(&left("LowerLeg")),
        Bone::new(&left("ToeBase"), v(0.09, -0.075, 0.02), v(0.09, -0.13, 0.02)).with_parent(&left("Foot")),
    ];
    for (finger, stem) in FINGER_STEMS.iter().enumerate() {
        let joints = finger_joints(finger);
        let mut parent = left("Hand");
        for n in 1..=3 {
            let name = left(&format!("{}{}", stem, n));
            let mut bone = Bone::new(&name, joints[n - 1], joints[n]).with_parent(&parent).with_roll(0.2);
            if n > 1 {
                bone = bone.connected();
            }
            sided.push(bone);
            parent = name;
        }
    }
    let mirrored: Vec<Bone> = sided.iter().map(right_of).collect();
    bones.extend(sided);
    bones.extend(mirrored);
    Skeleton::from_bones("avatar", bones)
}
