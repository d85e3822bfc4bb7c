//! Template positioning: repair the source skeleton, then shape a freshly spawned humanoid
//! template after it bone by bone.

pub mod repair;

use log::info;

use crate::config::RetargetConfig;
use crate::correspondence::{classify, classify_names, map_bones, Side};
use crate::error::Result;
use crate::host::{editing, posing, Host};
use crate::services::{NameSimplifier, TemplateFactory};
use crate::skeleton::{Bone, Skeleton};

pub use repair::{leg_chain, symmetrize_fingers, weld_chain, SPINE_CHAIN};

/// Weld the spine and leg chains and symmetrize the hands of the (already simplified) source.
pub fn fix_source_bones<H: Host + ?Sized>(host: &mut H, source: &mut Skeleton, cfg: &RetargetConfig) -> Result<()> {
    let name = source.name().to_string();
    editing(host, &[name.as_str()], |mode| {
        let mut bones = source.edit_bones(mode);
        weld_chain(&mut bones, &SPINE_CHAIN)?;
        for side in Side::BOTH {
            weld_chain(&mut bones, &leg_chain(side))?;
        }
        symmetrize_fingers(&mut bones, &cfg.fingers)
    })
}

/// Spawn the template through `factory`, named after the source.
pub fn spawn_template<F: TemplateFactory + ?Sized>(factory: &mut F, source: &Skeleton) -> Result<Skeleton> {
    let mut template = factory.spawn_humanoid_template()?;
    template.set_name(&format!("{}.metarig", source.name()));
    Ok(template)
}

/// Delete the template bones matching the delete list. Returns the deleted names.
pub fn prune_template<H: Host + ?Sized>(host: &mut H, template: &mut Skeleton, cfg: &RetargetConfig) -> Result<Vec<String>> {
    let name = template.name().to_string();
    let doomed = classify_names(template.bones(), &cfg.patterns.template_delete);
    editing(host, &[name.as_str()], |mode| {
        let mut bones = template.edit_bones(mode);
        for bone in &doomed {
            info!("deleting template bone '{}'", bone);
            bones.remove(bone)?;
        }
        Ok(doomed)
    })
}

fn template_base_bones<'a>(template: &'a Skeleton, cfg: &RetargetConfig) -> Vec<&'a Bone> {
    let ignored = cfg.patterns.template_ignored_all();
    template
        .bones()
        .iter()
        .filter(|bone| {
            let skip = !classify(std::iter::once(*bone), &ignored).is_empty();
            if skip {
                info!("ignoring bone '{}'", bone.name);
            }
            !skip
        })
        .collect()
}

/// Copy head, tail and roll from every source bone onto its template counterpart, and adopt
/// the source's world transform. Returns the number of bones moved.
pub fn position_template<H: Host + ?Sized>(
    host: &mut H,
    template: &mut Skeleton,
    source: &Skeleton,
    cfg: &RetargetConfig,
) -> Result<usize> {
    let pairs = map_bones(template_base_bones(template, cfg), source);
    let objects = [template.name().to_string(), source.name().to_string()];
    editing(host, &[objects[0].as_str(), objects[1].as_str()], |mode| {
        template.set_matrix_world(source.matrix_world());
        let mut bones = template.edit_bones(mode);
        for pair in &pairs {
            let from = source.bone(&pair.counterpart)?;
            info!("positioning '{}' to '{}'", pair.bone, pair.counterpart);
            bones.set_head(&pair.bone, from.head)?;
            bones.set_tail(&pair.bone, from.tail)?;
            bones.set_roll(&pair.bone, from.roll)?;
        }
        Ok(pairs.len())
    })
}

/// Switch every bone to automatic roll alignment and pin limb segment count and bend axis.
pub fn tune_limbs<H: Host + ?Sized>(host: &mut H, template: &mut Skeleton, cfg: &RetargetConfig) -> Result<()> {
    let name = template.name().to_string();
    let limbs = classify_names(template.bones(), &cfg.patterns.limb_bones);
    posing(host, &[name.as_str()], |mode| {
        let mut bones = template.pose_bones(mode);
        for (_, pose) in bones.iter_mut() {
            pose.params.roll_alignment = cfg.limbs.roll_alignment;
        }
        for limb in &limbs {
            info!("amending bone parameters for limb '{}'", limb);
            let params = &mut bones.get_mut(limb)?.params;
            params.segments = Some(cfg.limbs.segments);
            params.rotation_axis = cfg.limbs.rotation_axis;
        }
        Ok(())
    })
}

/// Full template stage. `source` must not have transforms applied.
pub fn generate_template<H, S>(host: &mut H, services: &mut S, source: &mut Skeleton, cfg: &RetargetConfig) -> Result<Skeleton>
where
    H: Host + ?Sized,
    S: NameSimplifier + TemplateFactory + ?Sized,
{
    info!("simplifying bone names of '{}'", source.name());
    services.simplify_names(source)?;

    info!("fixing source bones");
    fix_source_bones(host, source, cfg)?;

    info!("creating and positioning template");
    let mut template = spawn_template(services, source)?;
    prune_template(host, &mut template, cfg)?;
    position_template(host, &mut template, source, cfg)?;
    tune_limbs(host, &mut template, cfg)?;

    info!("template '{}' generated", template.name());
    Ok(template)
}
