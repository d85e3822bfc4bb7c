//! Generated-rig reconciliation: turn the freshly generated rig into one bound to the source
//! avatar's bone names, with the source's extra chains grafted back on.

pub mod eye;

pub use eye::fix_eyes;

use anyhow::Context;
use log::info;
use serde::Serialize;

use crate::config::RetargetConfig;
use crate::correspondence::table::{finger_source_name, finger_template_name, FINGERS, FINGER_SEGMENTS};
use crate::correspondence::{classify, classify_names, map_bones, Side};
use crate::error::{Result, RigError};
use crate::host::{editing, posing, Host};
use crate::skeleton::{Bone, Skeleton};

/// What `setup_bones` changed in the generated rig.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub deleted: Vec<String>,
    /// `(generated name, source name)` pairs.
    pub renamed: Vec<(String, String)>,
    pub grafted: Vec<String>,
    pub eye_ratio: f32,
}

impl ReconcileReport {
    pub fn to_json(&self) -> anyhow::Result<String> { Ok(serde_json::to_string_pretty(self)?) }

    pub fn save_to_path<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Delete generated bones matching the generated-ignore list. Returns the deleted names.
pub fn remove_ignored_bones<H: Host + ?Sized>(host: &mut H, generated: &mut Skeleton, cfg: &RetargetConfig) -> Result<Vec<String>> {
    let name = generated.name().to_string();
    let doomed = classify_names(generated.bones(), &cfg.patterns.generated_ignored_all());
    editing(host, &[name.as_str()], |mode| {
        let mut bones = generated.edit_bones(mode);
        for bone in &doomed {
            info!("deleting bone '{}'", bone);
            bones.remove(bone)?;
        }
        Ok(doomed)
    })
}

/// Repoint the neck's stretch constraint at the head control.
pub fn fix_constraint<H: Host + ?Sized>(host: &mut H, generated: &mut Skeleton, cfg: &RetargetConfig) -> Result<()> {
    let fix = &cfg.constraint_fix;
    let name = generated.name().to_string();
    posing(host, &[name.as_str()], |mode| {
        let mut bones = generated.pose_bones(mode);
        let constraint = bones.get_mut(&fix.bone)?.constraint_mut(&fix.constraint).ok_or_else(|| RigError::MissingConstraint {
            bone: fix.bone.clone(),
            constraint: fix.constraint.clone(),
        })?;
        info!("retargeting '{}' of '{}' to '{}'", fix.constraint, fix.bone, fix.subtarget);
        constraint.subtarget = Some(fix.subtarget.clone());
        Ok(())
    })
}

/// Copy roll from source bones onto the configured generated bones.
pub fn transfer_rolls<H: Host + ?Sized>(host: &mut H, generated: &mut Skeleton, source: &Skeleton, cfg: &RetargetConfig) -> Result<()> {
    let objects = [generated.name().to_string(), source.name().to_string()];
    editing(host, &[objects[0].as_str(), objects[1].as_str()], |mode| {
        let mut bones = generated.edit_bones(mode);
        for pair in &cfg.roll_transfer {
            let roll = source.bone(&pair.source)?.roll;
            bones.set_roll(&pair.bone, roll)?;
        }
        Ok(())
    })
}

/// Bones that must carry source names: deforming bones plus the eye bones.
pub fn deform_and_eye_bones<'a>(generated: &'a Skeleton, cfg: &RetargetConfig) -> Vec<&'a Bone> {
    let prefix = &cfg.patterns.deform_prefix;
    generated
        .bones()
        .iter()
        .filter(|b| b.name.starts_with(prefix.as_str()) || !classify(std::iter::once(*b), &cfg.patterns.eye_bones).is_empty())
        .collect()
}

/// Rename deform and eye bones to their source counterparts and make them deform.
/// Returns `(old, new)` pairs in rename order.
pub fn rename_to_source(generated: &mut Skeleton, source: &Skeleton, cfg: &RetargetConfig) -> Result<Vec<(String, String)>> {
    let pairs = map_bones(deform_and_eye_bones(generated, cfg), source);
    let mut renamed = Vec::with_capacity(pairs.len());
    for pair in pairs {
        info!("renaming bone '{}' to '{}'", pair.bone, pair.counterpart);
        let new = generated.rename_bone(&pair.bone, &pair.counterpart)?;
        generated.set_deform(&new, true)?;
        renamed.push((pair.bone, new));
    }
    Ok(renamed)
}

/// Write the generated rig's finger rolls back onto the source (same name) and the template
/// (translated name).
pub fn adjust_finger_rolls<H: Host + ?Sized>(
    host: &mut H,
    source: &mut Skeleton,
    template: &mut Skeleton,
    generated: &Skeleton,
) -> Result<()> {
    let objects = [source.name().to_string(), template.name().to_string(), generated.name().to_string()];
    editing(host, &[objects[0].as_str(), objects[1].as_str(), objects[2].as_str()], |mode| {
        let mut src = source.edit_bones(mode);
        let mut meta = template.edit_bones(mode);
        for side in Side::BOTH {
            for finger in 0..FINGERS.len() {
                for segment in FINGER_SEGMENTS {
                    let name = finger_source_name(finger, segment, side);
                    let roll = generated.bone(&name)?.roll;
                    src.set_roll(&name, roll)?;
                    meta.set_roll(&finger_template_name(finger, segment, side), roll)?;
                }
            }
        }
        Ok(())
    })
}

/// Graft source bones the generator did not produce under their already-present parent.
/// Source bones are visited parent-first, so whole chains come across in one pass.
pub fn attach_remaining_bones<H: Host + ?Sized>(host: &mut H, generated: &mut Skeleton, source: &Skeleton) -> Result<Vec<String>> {
    let objects = [generated.name().to_string(), source.name().to_string()];
    editing(host, &[objects[0].as_str(), objects[1].as_str()], |mode| {
        let mut bones = generated.edit_bones(mode);
        let mut grafted = Vec::new();
        for bone in source.traversal_order() {
            let Some(parent) = bone.parent.as_deref() else { continue };
            if bones.contains(&bone.name) || !bones.contains(parent) {
                continue;
            }
            info!("generating bone '{}' as child of '{}'", bone.name, parent);
            let layers = bones.get(parent)?.layers;
            let mut graft = Bone::new(&bone.name, bone.head, bone.tail).with_roll(bone.roll).with_parent(parent).with_layers(layers);
            graft.deform = bone.deform;
            grafted.push(bones.add(graft)?);
        }
        Ok(grafted)
    })
}

/// Full reconciliation stage. Run after generation, with `template` still alive.
pub fn setup_bones<H: Host + ?Sized>(
    host: &mut H,
    source: &mut Skeleton,
    template: &mut Skeleton,
    generated: &mut Skeleton,
    cfg: &RetargetConfig,
) -> Result<ReconcileReport> {
    let deleted = remove_ignored_bones(host, generated, cfg)?;
    fix_constraint(host, generated, cfg)?;
    transfer_rolls(host, generated, source, cfg)?;
    let eye_ratio = fix_eyes(host, generated, source, cfg)?;
    let renamed = rename_to_source(generated, source, cfg)?;
    adjust_finger_rolls(host, source, template, generated)?;
    let grafted = attach_remaining_bones(host, generated, source)?;
    info!("amended generated rig '{}'", generated.name());
    Ok(ReconcileReport { deleted, renamed, grafted, eye_ratio })
}
