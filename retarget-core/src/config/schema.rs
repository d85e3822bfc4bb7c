use serde::{Deserialize, Serialize};

use crate::correspondence::{contains_any, PatternList};
use crate::skeleton::{RollAlignment, RotationAxis};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    pub patterns: PatternConfig,
    pub fingers: FingerConfig,
    pub limbs: LimbConfig,
    pub constraint_fix: ConstraintFix,
    pub eyes: EyeConfig,
    /// Generated bones whose roll is re-copied from a source bone after generation.
    pub roll_transfer: Vec<RollTransfer>,
}

impl Default for RetargetConfig {
    fn default() -> Self {
        Self {
            patterns: PatternConfig::default(),
            fingers: FingerConfig::default(),
            limbs: LimbConfig::default(),
            constraint_fix: ConstraintFix::default(),
            eyes: EyeConfig::default(),
            roll_transfer: default_roll_transfer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternConfig {
    /// Ignored everywhere.
    pub base_ignored: PatternList,
    /// Template bones deleted right after spawning.
    pub template_delete: PatternList,
    /// Template bones left where the template put them (in addition to `base_ignored`).
    pub template_ignored: PatternList,
    /// Generated bones deleted before reconciliation (in addition to `base_ignored`).
    pub generated_ignored: PatternList,
    pub limb_bones: PatternList,
    /// Name prefix of deforming bones produced by the generator.
    pub deform_prefix: String,
    pub eye_bones: PatternList,
}

impl PatternConfig {
    pub fn template_ignored_all(&self) -> PatternList {
        self.base_ignored.iter().chain(&self.template_ignored).cloned().collect()
    }

    pub fn generated_ignored_all(&self) -> PatternList {
        self.base_ignored.iter().chain(&self.generated_ignored).cloned().collect()
    }
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            base_ignored: contains_any(&["breast"]),
            template_delete: contains_any(&["pelvis", "palm.01", "palm.02", "palm.03", "palm.04"]),
            // heel.02 already sits correctly; face and teeth are driven by shape keys.
            template_ignored: contains_any(&["heel.02", "face", "teeth"]),
            generated_ignored: contains_any(&["teeth"]),
            limb_bones: contains_any(&["upper_arm", "thigh"]),
            deform_prefix: "DEF".to_string(),
            eye_bones: contains_any(&["ORG-eye"]),
        }
    }
}

/// Offsets used when flattening fingers, in skeleton units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerConfig {
    /// Keeps thumb joints off the straight base-to-tip line.
    pub thumb_lateral_offset: f32,
    /// Depth offset of the first-segment head and the last-segment tail.
    pub base_depth_offset: f32,
    /// Depth offset of the second- and third-segment heads.
    pub joint_depth_offset: f32,
}

impl Default for FingerConfig {
    fn default() -> Self { Self { thumb_lateral_offset: 0.001, base_depth_offset: -0.0005, joint_depth_offset: 0.001 } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimbConfig {
    pub segments: u32,
    pub rotation_axis: RotationAxis,
    pub roll_alignment: RollAlignment,
}

impl Default for LimbConfig {
    fn default() -> Self { Self { segments: 1, rotation_axis: RotationAxis::X, roll_alignment: RollAlignment::Automatic } }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstraintFix {
    pub bone: String,
    pub constraint: String,
    pub subtarget: String,
}

impl Default for ConstraintFix {
    fn default() -> Self {
        Self { bone: "ORG-spine.004".to_string(), constraint: "Stretch To".to_string(), subtarget: "head".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeConfig {
    pub eyes_bone: String,
    pub left_eye: String,
    pub right_eye: String,
    pub source_left_eye: String,
}

impl Default for EyeConfig {
    fn default() -> Self {
        Self {
            eyes_bone: "eyes".to_string(),
            left_eye: "eye.L".to_string(),
            right_eye: "eye.R".to_string(),
            source_left_eye: "FaceEye_L".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollTransfer {
    pub bone: String,
    pub source: String,
}

fn default_roll_transfer() -> Vec<RollTransfer> {
    [("ORG-eye.L", "FaceEye_L"), ("ORG-eye.R", "FaceEye_R"), ("master_eye.L", "FaceEye_L"), ("master_eye.R", "FaceEye_R")]
        .into_iter()
        .map(|(bone, source)| RollTransfer { bone: bone.to_string(), source: source.to_string() })
        .collect()
}
