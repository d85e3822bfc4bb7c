use std::collections::HashMap;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use retarget_core::correspondence::map_bones;
use retarget_core::host::SceneHost;
use retarget_core::services::{vroid, HumanMetarig, ReferenceServices};
use retarget_core::{config, skeleton, VERSION};

#[derive(Parser, Debug)]
#[command(name = "retarget", version = VERSION, about = "Humanoid avatar to control rig retargeting")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a skeleton document and print its hierarchy
    Inspect { path: String },
    /// Print the bone correspondence from one skeleton onto another
    Map { from: String, to: String },
    /// Write the built-in sample avatar
    Sample {
        #[arg(long, default_value = "avatar.yaml")]
        out: String,
    },
    /// Run the full pipeline with the reference services
    Run {
        source: String,
        #[arg(long)]
        config: Option<String>,
        /// Template bone document to use instead of the bundled human template
        #[arg(long)]
        template: Option<String>,
        #[arg(long, default_value = "rig.yaml")]
        out: String,
        #[arg(long)]
        template_out: Option<String>,
        /// Also write the updated source skeleton
        #[arg(long)]
        source_out: Option<String>,
        /// Write the reconciliation report as JSON
        #[arg(long)]
        report: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect { path } => {
            let s = skeleton::load_from_path(&path)?;
            println!("Loaded skeleton: {} ({} bones)", s.name(), s.len());
            let mut depth: HashMap<&str, usize> = HashMap::new();
            for bone in s.traversal_order() {
                let d = bone.parent.as_deref().and_then(|p| depth.get(p)).map_or(0, |d| d + 1);
                depth.insert(&bone.name, d);
                let flags = format!("{}{}", if bone.deform { "D" } else { "-" }, if bone.use_connect { "C" } else { "-" });
                println!("{}{} [{}] len={:.3} roll={:.3}", "  ".repeat(d), bone.name, flags, bone.length(), bone.roll);
            }
        }
        Command::Map { from, to } => {
            let (a, b) = (skeleton::load_from_path(&from)?, skeleton::load_from_path(&to)?);
            let pairs = map_bones(a.bones(), &b);
            for pair in &pairs {
                println!("{} -> {}", pair.bone, pair.counterpart);
            }
            println!("{} of {} bones matched", pairs.len(), a.len());
        }
        Command::Sample { out } => {
            let avatar = vroid::sample_avatar()?;
            skeleton::save_to_path(&avatar, &out)?;
            println!("Wrote sample avatar ({} bones) to {}", avatar.len(), out);
        }
        Command::Run { source, config: config_path, template, out, template_out, source_out, report } => {
            let cfg = match config_path {
                Some(p) => config::load_from_path(&p)?,
                None => config::RetargetConfig::default(),
            };
            let mut services = ReferenceServices::default();
            if let Some(p) = template {
                services.metarig = HumanMetarig::from_path(&p)?;
            }
            let mut avatar = skeleton::load_from_path(&source)?;
            let mut host = SceneHost::new();
            let done = retarget_core::retarget(&mut host, &mut services, &mut avatar, &cfg)?;
            info!("{} mode switches", host.history().len());

            skeleton::save_to_path(&done.rig, &out)?;
            println!("Wrote rig '{}' ({} bones) to {}", done.rig.name(), done.rig.len(), out);
            if let Some(p) = template_out {
                skeleton::save_to_path(&done.template, &p)?;
                println!("Wrote template '{}' to {}", done.template.name(), p);
            }
            if let Some(p) = source_out {
                skeleton::save_to_path(&avatar, &p)?;
                println!("Wrote source '{}' to {}", avatar.name(), p);
            }
            let r = &done.report;
            println!("  deleted: {}, renamed: {}, grafted: {}, eye ratio: {:.3}", r.deleted.len(), r.renamed.len(), r.grafted.len(), r.eye_ratio);
            for name in &r.grafted {
                println!("  + {}", name);
            }
            if let Some(p) = report {
                r.save_to_path(&p)?;
                println!("Wrote report to {}", p);
            }
        }
    }
    Ok(())
}
