//! The whole retargeting procedure as one ordered call.

use log::info;

use crate::config::RetargetConfig;
use crate::error::Result;
use crate::host::Host;
use crate::reconcile::{setup_bones, ReconcileReport};
use crate::services::{NameSimplifier, RigGenerator, TemplateFactory};
use crate::skeleton::Skeleton;
use crate::template::generate_template;

/// Outputs of a full run. `rig` is the terminal artifact; `template` is kept for inspection
/// and re-generation.
#[derive(Debug, Clone)]
pub struct Retargeted {
    pub template: Skeleton,
    pub rig: Skeleton,
    pub report: ReconcileReport,
}

/// Simplify names, position a template on `source`, generate a rig from it and reconcile the
/// rig with `source`. `source` is mutated (names, chain welds, finger geometry and rolls).
/// On error the skeletons are left as the failing step found them.
pub fn retarget<H, S>(host: &mut H, services: &mut S, source: &mut Skeleton, cfg: &RetargetConfig) -> Result<Retargeted>
where
    H: Host + ?Sized,
    S: NameSimplifier + TemplateFactory + RigGenerator + ?Sized,
{
    let mut template = generate_template(host, services, source, cfg)?;
    info!("generating rig from '{}'", template.name());
    let mut rig = services.generate(&template)?;
    let report = setup_bones(host, source, &mut template, &mut rig, cfg)?;
    info!(
        "retargeted '{}': {} deleted, {} renamed, {} grafted",
        source.name(),
        report.deleted.len(),
        report.renamed.len(),
        report.grafted.len()
    );
    Ok(Retargeted { template, rig, report })
}
