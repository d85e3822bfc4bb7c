//! Reference rig generator: expands a positioned template into original (`ORG-`), deform
//! (`DEF-`) and control bones following the usual generated-rig naming scheme.

use glam::Vec3;
use log::{debug, info};

use super::RigGenerator;
use crate::correspondence::Side;
use crate::correspondence::table::sided_template_name;
use crate::error::Result;
use crate::skeleton::{Bone, Constraint, ConstraintKind, Layers, RollAlignment, Skeleton};

pub const ROOT: &str = "root";
pub const HEAD_CONTROL: &str = "head";
pub const EYES_CONTROL: &str = "eyes";

fn org(name: &str) -> String { format!("ORG-{}", name) }
fn def(name: &str) -> String { format!("DEF-{}", name) }

/// `DEF-x`, `DEF-x.001`, `DEF-x.002`, ...
fn def_segment(name: &str, index: u32) -> String {
    if index == 0 { def(name) } else { format!("{}.{:03}", def(name), index) }
}

#[derive(Debug, Clone)]
pub struct NamingGenerator {
    /// How far in front of each eye its aim target is placed, in eye-bone lengths.
    pub eye_target_distance: f32,
}

impl Default for NamingGenerator {
    fn default() -> Self { Self { eye_target_distance: 5.0 } }
}

impl NamingGenerator {
    fn roll_of(bone: &Bone) -> f32 {
        match bone.pose.params.roll_alignment {
            RollAlignment::Automatic => 0.0,
            RollAlignment::Manual => bone.roll,
        }
    }

    fn org_bone(bone: &Bone) -> Bone {
        let mut out = Bone::new(&org(&bone.name), bone.head, bone.tail)
            .with_roll(Self::roll_of(bone))
            .with_parent(&bone.parent.as_deref().map_or_else(|| ROOT.to_string(), org))
            .with_layers(Layers::ORG)
            .non_deforming();
        out.use_connect = bone.use_connect;
        out
    }

    fn def_bones(bone: &Bone, rig: &str) -> Vec<Bone> {
        let segments = bone.pose.params.segments.unwrap_or(1).max(1);
        let step = bone.vector() / segments as f32;
        let point = |i: u32| if i == segments { bone.tail } else { bone.head + step * i as f32 };
        let mut parent = org(&bone.name);
        let mut out = Vec::with_capacity(segments as usize);
        for i in 0..segments {
            let name = def_segment(&bone.name, i);
            let mut seg = Bone::new(&name, point(i), point(i + 1))
                .with_roll(Self::roll_of(bone))
                .with_parent(&parent)
                .with_layers(Layers::DEF);
            if i > 0 {
                seg = seg.connected();
            }
            seg.pose.constraints.push(Constraint::new("Copy Transforms", ConstraintKind::CopyTransforms).with_target(rig, &org(&bone.name)));
            parent = name;
            out.push(seg);
        }
        out
    }

    fn eye_controls(&self, template: &Skeleton) -> Vec<Bone> {
        let eyes: Vec<&Bone> = Side::BOTH.iter().filter_map(|&s| template.get(&sided_template_name("eye", s))).collect();
        if eyes.len() != 2 {
            return Vec::new();
        }
        let parent = if template.contains("spine.006") { HEAD_CONTROL } else { ROOT };
        let targets: Vec<(Vec3, Vec3)> = eyes
            .iter()
            .map(|eye| {
                let gaze = eye.vector();
                let head = eye.head + gaze * self.eye_target_distance;
                (head, head + gaze)
            })
            .collect();
        let center = (targets[0].0 + targets[1].0) * 0.5;
        let height = eyes[0].length().max(f32::EPSILON);
        let mut out = vec![Bone::new(EYES_CONTROL, center, center + Vec3::Z * height).with_parent(parent).with_layers(Layers::FACE)];
        for (eye, (head, tail)) in eyes.iter().zip(targets) {
            out.push(Bone::new(&eye.name, head, tail).with_parent(EYES_CONTROL).with_layers(Layers::FACE).non_deforming());
            let master = format!("master_{}", eye.name);
            let master_parent = eye.parent.as_deref().map_or_else(|| ROOT.to_string(), org);
            out.push(
                Bone::new(&master, eye.head, eye.tail)
                    .with_roll(Self::roll_of(eye))
                    .with_parent(&master_parent)
                    .with_layers(Layers::FACE)
                    .non_deforming(),
            );
        }
        out
    }
}

impl RigGenerator for NamingGenerator {
    fn generate(&mut self, template: &Skeleton) -> Result<Skeleton> {
        let base = template.name().strip_suffix(".metarig").unwrap_or(template.name());
        let rig = format!("{}.rig", base);
        info!("generating rig '{}' from '{}'", rig, template.name());

        let mut bones = vec![Bone::new(ROOT, Vec3::ZERO, Vec3::new(0.0, 0.25, 0.0)).with_layers(Layers::ROOT).non_deforming()];
        bones.extend(template.bones().iter().map(Self::org_bone));
        for bone in template.bones().iter().filter(|b| b.deform) {
            bones.extend(Self::def_bones(bone, &rig));
        }
        if let Some(head) = template.get("spine.006") {
            bones.push(Bone::new(HEAD_CONTROL, head.head, head.tail).with_parent(ROOT).with_layers(head.layers).non_deforming());
        }
        bones.extend(self.eye_controls(template));

        if let Some(neck) = bones.iter_mut().find(|b| b.name == "ORG-spine.004") {
            neck.pose.constraints.push(Constraint::new("Stretch To", ConstraintKind::StretchTo).with_target(&rig, "ORG-spine.005"));
        }
        debug!("rig '{}' has {} bones", rig, bones.len());

        let mut out = Skeleton::from_bones(&rig, bones)?;
        out.set_matrix_world(template.matrix_world());
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{HumanMetarig, TemplateFactory};

    fn template() -> Skeleton {
        let mut t = HumanMetarig::default().spawn_humanoid_template().unwrap();
        t.set_name("avatar.metarig");
        t
    }

    #[test]
    fn every_template_bone_gets_an_org_copy() {
        let t = template();
        let rig = NamingGenerator::default().generate(&t).unwrap();
        assert_eq!(rig.name(), "avatar.rig");
        for bone in t.bones() {
            let copy = rig.bone(&org(&bone.name)).unwrap();
            assert_eq!((copy.head, copy.tail), (bone.head, bone.tail));
            assert!(!copy.deform);
        }
        assert_eq!(rig.bone("ORG-spine").unwrap().parent.as_deref(), Some(ROOT));
        assert_eq!(rig.bone("ORG-forearm.L").unwrap().parent.as_deref(), Some("ORG-upper_arm.L"));
    }

    #[test]
    fn limbs_split_into_connected_deform_segments() {
        let t = template();
        let rig = NamingGenerator::default().generate(&t).unwrap();
        let (a, b) = (rig.bone("DEF-thigh.L").unwrap(), rig.bone("DEF-thigh.L.001").unwrap());
        assert_eq!(a.tail, b.head);
        assert_eq!(b.tail, t.bone("thigh.L").unwrap().tail);
        assert!(b.use_connect && a.deform && b.deform);
        assert!(!rig.contains("DEF-thigh.L.002"));
        assert!(!rig.contains("DEF-eye.L") && !rig.contains("DEF-heel.02.L"));
    }

    #[test]
    fn eye_and_head_controls_are_generated() {
        let rig = NamingGenerator::default().generate(&template()).unwrap();
        for name in [HEAD_CONTROL, EYES_CONTROL, "eye.L", "eye.R", "master_eye.L", "master_eye.R"] {
            assert!(rig.contains(name), "{name}");
        }
        let (eyes, left) = (rig.bone(EYES_CONTROL).unwrap(), rig.bone("eye.L").unwrap());
        assert_eq!(left.parent.as_deref(), Some(EYES_CONTROL));
        assert!(left.head.y < rig.bone("ORG-eye.L").unwrap().head.y);
        assert!(eyes.head.x.abs() < 1e-6 && eyes.tail.z > eyes.head.z);
        let neck = &rig.bone("ORG-spine.004").unwrap().pose.constraints[0];
        assert_eq!((neck.name.as_str(), neck.subtarget.as_deref()), ("Stretch To", Some("ORG-spine.005")));
    }

    #[test]
    fn automatic_alignment_drops_roll() {
        let mut t = template();
        let name = t.name().to_string();
        let mut host = crate::host::SceneHost::new();
        crate::host::editing(&mut host, &[name.as_str()], |m| t.edit_bones(m).set_roll("hand.L", 0.5)).unwrap();
        let manual = NamingGenerator::default().generate(&t).unwrap();
        assert_eq!(manual.bone("DEF-hand.L").unwrap().roll, 0.5);
        crate::host::posing(&mut host, &[name.as_str()], |m| {
            t.pose_bones(m).get_mut("hand.L").map(|p| p.params.roll_alignment = RollAlignment::Automatic)
        })
        .unwrap();
        let auto = NamingGenerator::default().generate(&t).unwrap();
        assert_eq!(auto.bone("DEF-hand.L").unwrap().roll, 0.0);
    }
}
