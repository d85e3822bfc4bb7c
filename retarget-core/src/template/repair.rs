//! Geometric clean-up of the source skeleton before anything is copied from it.

use glam::Vec3;
use log::info;

use crate::config::FingerConfig;
use crate::correspondence::table::{finger_source_name, sided_source_name, FINGERS};
use crate::correspondence::Side;
use crate::error::{Result, RigError};
use crate::geometry::{mirror_x, project_onto_line};
use crate::skeleton::EditBones;

pub const SPINE_CHAIN: [&str; 5] = ["Hips", "Spine", "Chest", "UpperChest", "Neck"];
pub const LEG_CHAIN: [&str; 4] = ["UpperLeg", "LowerLeg", "Foot", "ToeBase"];

pub fn leg_chain(side: Side) -> Vec<String> {
    LEG_CHAIN.iter().map(|stem| sided_source_name(stem, side)).collect()
}

/// Make every bone in `chain` end exactly where its successor starts, and connect the
/// successor to it.
pub fn weld_chain<S: AsRef<str>>(bones: &mut EditBones<'_>, chain: &[S]) -> Result<()> {
    for pair in chain.windows(2) {
        let (upper, lower) = (pair[0].as_ref(), pair[1].as_ref());
        let joint = bones.get(lower)?.head;
        bones.set_tail(upper, joint)?;
        if bones.get(lower)?.parent.as_deref() != Some(upper) {
            bones.set_parent(lower, Some(upper))?;
        }
        bones.set_use_connect(lower, true)?;
    }
    Ok(())
}

/// Flatten each left-hand finger into a clean plane, then rebuild the right hand as its
/// mirror image.
pub fn symmetrize_fingers(bones: &mut EditBones<'_>, cfg: &FingerConfig) -> Result<()> {
    for finger in 0..FINGERS.len() {
        let left: [String; 3] = [1, 2, 3].map(|n| finger_source_name(finger, n, Side::Left));
        let right: [String; 3] = [1, 2, 3].map(|n| finger_source_name(finger, n, Side::Right));
        info!("symmetrizing finger '{}'", left[0]);

        let heads = [bones.get(&left[0])?.head, bones.get(&left[1])?.head, bones.get(&left[2])?.head];
        let tip = bones.get(&left[2])?.tail;
        let center = (heads[0] + heads[1] + heads[2]) / 3.0;
        bones.set_use_connect(&left[1], false)?;
        bones.set_use_connect(&left[2], false)?;

        if finger == 0 {
            let line = tip - heads[0];
            if line.length() == 0.0 {
                return Err(RigError::Degenerate { bone: left[0].clone(), reason: "thumb base and tip coincide" });
            }
            let mid = (heads[1] + heads[2]) * 0.5;
            let lateral = (mid - project_onto_line(mid, heads[0], line)).normalize_or_zero();
            let offset = lateral * cfg.thumb_lateral_offset;
            bones.set_head(&left[1], project_onto_line(heads[1], heads[0], line) + offset)?;
            bones.set_head(&left[2], project_onto_line(heads[2], heads[0], line) + offset)?;
        } else {
            let on_plane = |p: Vec3, depth: f32| Vec3::new(p.x, center.y, center.z + depth);
            bones.set_head(&left[0], on_plane(heads[0], cfg.base_depth_offset))?;
            bones.set_head(&left[1], on_plane(heads[1], cfg.joint_depth_offset))?;
            bones.set_head(&left[2], on_plane(heads[2], cfg.joint_depth_offset))?;
            bones.set_tail(&left[2], on_plane(tip, cfg.base_depth_offset))?;
        }

        let second = bones.get(&left[1])?.head;
        bones.set_tail(&left[0], second)?;
        let third = bones.get(&left[2])?.head;
        bones.set_tail(&left[1], third)?;
        bones.set_use_connect(&left[1], true)?;
        bones.set_use_connect(&left[2], true)?;

        bones.set_use_connect(&right[1], false)?;
        bones.set_use_connect(&right[2], false)?;
        for (l, r) in left.iter().zip(&right) {
            let (head, tail) = {
                let bone = bones.get(l)?;
                (bone.head, bone.tail)
            };
            bones.set_head(r, mirror_x(head))?;
            bones.set_tail(r, mirror_x(tail))?;
        }
        bones.set_use_connect(&right[1], true)?;
        bones.set_use_connect(&right[2], true)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{editing, SceneHost};
    use crate::skeleton::{Bone, Skeleton};

    fn hand(side: Side, sign: f32) -> Vec<Bone> {
        let hand = sided_source_name("Hand", side);
        let mut bones = vec![Bone::new(&hand, Vec3::new(sign * 0.6, 0.0, 1.4), Vec3::new(sign * 0.68, 0.0, 1.4))];
        for finger in 0..FINGERS.len() {
            let y = -0.03 + 0.015 * finger as f32;
            let mut parent = hand.clone();
            for n in 1..=3u8 {
                let x0 = 0.7 + 0.025 * (n - 1) as f32;
                let wobble = 0.002 * n as f32 * (finger as f32 - 1.5);
                let name = finger_source_name(finger, n, side);
                let head = Vec3::new(sign * x0, y + wobble, 1.4 - 0.004 * n as f32);
                let tail = Vec3::new(sign * (x0 + 0.022), y - wobble, 1.395 - 0.004 * n as f32);
                bones.push(Bone::new(&name, head, tail).with_parent(&parent));
                parent = name;
            }
        }
        bones
    }

    fn body() -> Skeleton {
        let mut bones = vec![Bone::new("Hips", Vec3::new(0.0, 0.0, 0.95), Vec3::new(0.0, 0.0, 1.0))];
        let mut z = 1.02;
        for pair in SPINE_CHAIN.windows(2) {
            bones.push(Bone::new(pair[1], Vec3::new(0.0, 0.01, z), Vec3::new(0.0, 0.0, z + 0.1)).with_parent(pair[0]));
            z += 0.13;
        }
        for (side, sign) in [(Side::Left, 1.0), (Side::Right, -1.0)] {
            let chain = leg_chain(side);
            bones.push(Bone::new(&chain[0], Vec3::new(sign * 0.09, 0.0, 0.93), Vec3::new(sign * 0.09, 0.0, 0.6)).with_parent("Hips"));
            bones.push(Bone::new(&chain[1], Vec3::new(sign * 0.09, 0.01, 0.52), Vec3::new(sign * 0.09, 0.0, 0.12)).with_parent(&chain[0]));
            bones.push(Bone::new(&chain[2], Vec3::new(sign * 0.09, 0.02, 0.08), Vec3::new(sign * 0.09, -0.06, 0.03)).with_parent(&chain[1]));
            bones.push(Bone::new(&chain[3], Vec3::new(sign * 0.09, -0.09, 0.02), Vec3::new(sign * 0.09, -0.13, 0.02)).with_parent(&chain[2]));
            bones.extend(hand(side, sign));
        }
        Skeleton::from_bones("avatar", bones).unwrap()
    }

    #[test]
    fn welded_chains_are_bit_identical_and_connected() {
        let mut s = body();
        editing(&mut SceneHost::new(), &["avatar"], |m| {
            let mut eb = s.edit_bones(m);
            weld_chain(&mut eb, &SPINE_CHAIN)?;
            for side in Side::BOTH {
                weld_chain(&mut eb, &leg_chain(side))?;
            }
            Ok::<_, RigError>(())
        })
        .unwrap();
        let chains: Vec<Vec<String>> = vec![
            SPINE_CHAIN.iter().map(|s| s.to_string()).collect(),
            leg_chain(Side::Left),
            leg_chain(Side::Right),
        ];
        for chain in chains {
            for pair in chain.windows(2) {
                let upper = s.bone(&pair[0]).unwrap();
                let lower = s.bone(&pair[1]).unwrap();
                assert_eq!(upper.tail, lower.head, "{} -> {}", pair[0], pair[1]);
                assert!(lower.use_connect);
                assert_eq!(lower.parent.as_deref(), Some(pair[0].as_str()));
            }
        }
    }

    #[test]
    fn welding_a_missing_bone_is_fatal() {
        let mut s = body();
        let res = editing(&mut SceneHost::new(), &[], |m| weld_chain(&mut s.edit_bones(m), &["Hips", "Tail"]));
        assert!(matches!(res, Err(RigError::MissingBone { ref bone, .. }) if bone == "Tail"));
    }

    #[test]
    fn right_fingers_mirror_left_exactly() {
        let mut s = body();
        editing(&mut SceneHost::new(), &[], |m| symmetrize_fingers(&mut s.edit_bones(m), &FingerConfig::default())).unwrap();
        for finger in 0..FINGERS.len() {
            for n in 1..=3u8 {
                let l = s.bone(&finger_source_name(finger, n, Side::Left)).unwrap();
                let r = s.bone(&finger_source_name(finger, n, Side::Right)).unwrap();
                assert_eq!(r.head, mirror_x(l.head));
                assert_eq!(r.tail, mirror_x(l.tail));
                if n > 1 {
                    assert!(l.use_connect && r.use_connect);
                }
            }
        }
    }

    #[test]
    fn non_thumb_fingers_share_a_plane() {
        let mut s = body();
        let cfg = FingerConfig::default();
        let before: Vec<Vec3> = (1..=3u8).map(|n| s.bone(&finger_source_name(2, n, Side::Left)).unwrap().head).collect();
        let center = (before[0] + before[1] + before[2]) / 3.0;
        editing(&mut SceneHost::new(), &[], |m| symmetrize_fingers(&mut s.edit_bones(m), &cfg)).unwrap();
        let names: Vec<String> = (1..=3u8).map(|n| finger_source_name(2, n, Side::Left)).collect();
        let first = s.bone(&names[0]).unwrap();
        assert_eq!(first.head.y, center.y);
        assert_eq!(first.head.z, center.z + cfg.base_depth_offset);
        assert_eq!(first.head.x, before[0].x);
        let last = s.bone(&names[2]).unwrap();
        assert_eq!(last.head.z, center.z + cfg.joint_depth_offset);
        assert_eq!(last.tail.z, center.z + cfg.base_depth_offset);
        assert_eq!(s.bone(&names[1]).unwrap().head, first.tail);
    }

    #[test]
    fn thumb_joints_sit_just_off_the_base_tip_line() {
        let mut s = body();
        let cfg = FingerConfig::default();
        let names: Vec<String> = (1..=3u8).map(|n| finger_source_name(0, n, Side::Left)).collect();
        let base = s.bone(&names[0]).unwrap().head;
        let tip = s.bone(&names[2]).unwrap().tail;
        editing(&mut SceneHost::new(), &[], |m| symmetrize_fingers(&mut s.edit_bones(m), &cfg)).unwrap();
        let line = tip - base;
        for name in &names[1..] {
            let head = s.bone(name).unwrap().head;
            let off_line = head - project_onto_line(head, base, line);
            assert!((off_line.length() - cfg.thumb_lateral_offset).abs() < 1e-5, "{name}");
        }
    }

    #[test]
    fn collapsed_thumb_is_degenerate() {
        let mut s = body();
        let first = finger_source_name(0, 1, Side::Left);
        let last = finger_source_name(0, 3, Side::Left);
        editing(&mut SceneHost::new(), &[], |m| {
            let mut eb = s.edit_bones(m);
            let head = eb.get(&first)?.head;
            eb.set_tail(&last, head)
        })
        .unwrap();
        let res = editing(&mut SceneHost::new(), &[], |m| symmetrize_fingers(&mut s.edit_bones(m), &FingerConfig::default()));
        assert!(matches!(res, Err(RigError::Degenerate { .. })));
    }
}
