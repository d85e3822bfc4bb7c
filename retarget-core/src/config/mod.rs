pub mod schema;

pub use schema::{ConstraintFix, EyeConfig, FingerConfig, LimbConfig, PatternConfig, RetargetConfig, RollTransfer};

use anyhow::Result;

pub fn load_from_yaml_str(s: &str) -> Result<RetargetConfig> {
    let cfg: RetargetConfig = serde_yaml::from_str(s)?;
    Ok(cfg)
}

pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<RetargetConfig> {
    let data = std::fs::read_to_string(path)?;
    load_from_yaml_str(&data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correspondence::Pattern;
    use crate::skeleton::RotationAxis;

    #[test]
    fn empty_document_yields_defaults() {
        let cfg = load_from_yaml_str("{}").unwrap();
        assert_eq!(cfg, RetargetConfig::default());
        assert_eq!(cfg.constraint_fix.subtarget, "head");
        assert_eq!(cfg.roll_transfer.len(), 4);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let yaml = "limbs:\n  segments: 2\npatterns:\n  generated_ignored:\n    - contains: tongue\n";
        let cfg = load_from_yaml_str(yaml).unwrap();
        assert_eq!(cfg.limbs.segments, 2);
        assert_eq!(cfg.limbs.rotation_axis, RotationAxis::X);
        assert_eq!(cfg.patterns.generated_ignored, vec![Pattern::contains("tongue")]);
        assert_eq!(cfg.patterns.template_delete.len(), 5);
    }

    #[test]
    fn pattern_overrides_load_and_defaults_round_trip() {
        let cfg = load_from_yaml_str("patterns:\n  base_ignored:\n    - contains: hair\n").unwrap();
        assert_eq!(cfg.patterns.base_ignored, vec![Pattern::contains("hair")]);
        assert_eq!(cfg.patterns.limb_bones, PatternConfig::default().limb_bones);

        let text = serde_yaml::to_string(&RetargetConfig::default()).unwrap();
        assert!(text.contains("- contains: breast"), "{text}");
        assert_eq!(load_from_yaml_str(&text).unwrap(), RetargetConfig::default());
    }

    #[test]
    fn ignore_lists_include_the_global_list() {
        let cfg = RetargetConfig::default();
        let meta = cfg.patterns.template_ignored_all();
        assert!(meta.contains(&Pattern::contains("breast")));
        assert!(meta.contains(&Pattern::contains("heel.02")));
        let gen = cfg.patterns.generated_ignored_all();
        assert_eq!(gen, vec![Pattern::contains("breast"), Pattern::contains("teeth")]);
    }
}
