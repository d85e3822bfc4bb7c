//! Eye re-projection: pull the generated eye controls onto the plane the source eye actually
//! looks through.

use log::{info, warn};

use crate::config::RetargetConfig;
use crate::error::{Result, RigError};
use crate::geometry::{intersect_line_plane, max_axis_ratio, mirror_x};
use crate::host::{editing, Host};
use crate::skeleton::Skeleton;

/// Re-project the left eye control onto the source gaze line, scale the `eyes` control and the
/// eye's own tail by the same ratio, and mirror the result onto the right eye.
/// Returns the applied ratio.
pub fn fix_eyes<H: Host + ?Sized>(host: &mut H, generated: &mut Skeleton, source: &Skeleton, cfg: &RetargetConfig) -> Result<f32> {
    let names = &cfg.eyes;
    let objects = [generated.name().to_string(), source.name().to_string()];
    editing(host, &[objects[0].as_str(), objects[1].as_str()], |mode| {
        let gaze = source.bone(&names.source_left_eye)?;
        let mut bones = generated.edit_bones(mode);
        let eyes = bones.get(&names.eyes_bone)?.clone();
        let left = bones.get(&names.left_eye)?.clone();
        bones.get(&names.right_eye)?;

        let normal = eyes.vector().cross(left.head - eyes.head);
        let to = intersect_line_plane(gaze.head, gaze.tail, left.head, normal).ok_or_else(|| RigError::Degenerate {
            bone: names.source_left_eye.clone(),
            reason: "gaze line does not cross the eye plane",
        })?;
        let ratio = max_axis_ratio(to - eyes.head, left.head - eyes.head);
        if ratio <= 0.0 {
            warn!("eye ratio {} collapses '{}'", ratio, names.eyes_bone);
        }
        info!("re-projecting '{}' to {:?} (ratio {})", names.left_eye, to, ratio);

        bones.set_tail(&names.eyes_bone, eyes.head + eyes.vector() * ratio)?;
        let tail = to + left.vector() * ratio;
        bones.set_head(&names.left_eye, to)?;
        bones.set_tail(&names.left_eye, tail)?;
        bones.set_head(&names.right_eye, mirror_x(to))?;
        bones.set_tail(&names.right_eye, mirror_x(tail))?;
        Ok(ratio)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SceneHost;
    use crate::skeleton::Bone;
    use glam::Vec3;

    fn close(a: Vec3, b: Vec3) -> bool { (a - b).length() < 1e-5 }

    fn rig() -> Skeleton {
        Skeleton::from_bones(
            "avatar.rig",
            vec![
                Bone::new("eyes", Vec3::new(0.0, -0.2, 1.5), Vec3::new(0.0, -0.2, 1.52)),
                Bone::new("eye.L", Vec3::new(0.03, -0.2, 1.5), Vec3::new(0.03, -0.22, 1.5)).with_parent("eyes"),
                Bone::new("eye.R", Vec3::new(-0.03, -0.2, 1.5), Vec3::new(-0.03, -0.22, 1.5)).with_parent("eyes"),
            ],
        )
        .unwrap()
    }

    fn source(tail: Vec3) -> Skeleton {
        Skeleton::from_bones("avatar", vec![Bone::new("FaceEye_L", Vec3::new(0.045, -0.05, 1.5), tail)]).unwrap()
    }

    #[test]
    fn eye_moves_onto_the_gaze_line_and_scales() {
        let mut gen = rig();
        let src = source(Vec3::new(0.045, -0.07, 1.5));
        let ratio = fix_eyes(&mut SceneHost::new(), &mut gen, &src, &RetargetConfig::default()).unwrap();
        assert!((ratio - 1.5).abs() < 1e-5);
        let (left, right) = (gen.bone("eye.L").unwrap(), gen.bone("eye.R").unwrap());
        assert!(close(left.head, Vec3::new(0.045, -0.2, 1.5)));
        assert!(close(left.tail, Vec3::new(0.045, -0.23, 1.5)));
        assert_eq!(right.head, mirror_x(left.head));
        assert_eq!(right.tail, mirror_x(left.tail));
        assert!(close(gen.bone("eyes").unwrap().tail, Vec3::new(0.0, -0.2, 1.53)));
    }

    #[test]
    fn parallel_gaze_is_degenerate() {
        let mut gen = rig();
        let src = source(Vec3::new(0.065, -0.05, 1.5));
        let res = fix_eyes(&mut SceneHost::new(), &mut gen, &src, &RetargetConfig::default());
        assert!(matches!(res, Err(RigError::Degenerate { .. })));
        assert_eq!(gen, rig());
    }

    #[test]
    fn missing_eye_control_is_fatal() {
        let mut gen = Skeleton::from_bones("r", vec![Bone::new("eyes", Vec3::ZERO, Vec3::Z)]).unwrap();
        let res = fix_eyes(&mut SceneHost::new(), &mut gen, &source(Vec3::ZERO), &RetargetConfig::default());
        assert!(matches!(res, Err(RigError::MissingBone { ref bone, .. }) if bone == "eye.L"));
    }
}
