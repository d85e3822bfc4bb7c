//! Name bridge between the template convention (`upper_arm.L`) and the source avatar
//! convention after name simplification (`UpperArm_L`).

use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn suffix(self) -> &'static str {
        match self {
            Side::Left => "L",
            Side::Right => "R",
        }
    }
}

/// Unsided bones: (template, source).
pub const CENTER: &[(&str, &str)] = &[
    ("spine", "Hips"),
    ("spine.001", "Spine"),
    ("spine.002", "Chest"),
    ("spine.003", "UpperChest"),
    ("spine.004", "Neck"),
    ("spine.006", "Head"),
];

/// Sided bones as stems: template `stem.S`, source `Stem_S`.
pub const SIDED: &[(&str, &str)] = &[
    ("shoulder", "Shoulder"),
    ("upper_arm", "UpperArm"),
    ("forearm", "LowerArm"),
    ("hand", "Hand"),
    ("thigh", "UpperLeg"),
    ("shin", "LowerLeg"),
    ("foot", "Foot"),
    ("toe", "ToeBase"),
    ("eye", "FaceEye"),
];

/// Finger stems, thumb first: template `stem.0N.S`, source `StemN_S`.
pub const FINGERS: &[(&str, &str)] = &[
    ("thumb", "Thumb"),
    ("f_index", "Index"),
    ("f_middle", "Middle"),
    ("f_ring", "Ring"),
    ("f_pinky", "Little"),
];

pub const FINGER_SEGMENTS: [u8; 3] = [1, 2, 3];

pub fn sided_template_name(stem: &str, side: Side) -> String { format!("{}.{}", stem, side.suffix()) }
pub fn sided_source_name(stem: &str, side: Side) -> String { format!("{}_{}", stem, side.suffix()) }

/// `finger` indexes [`FINGERS`]; `segment` is 1-based.
pub fn finger_template_name(finger: usize, segment: u8, side: Side) -> String {
    format!("{}.{:02}.{}", FINGERS[finger].0, segment, side.suffix())
}

pub fn finger_source_name(finger: usize, segment: u8, side: Side) -> String {
    format!("{}{}_{}", FINGERS[finger].1, segment, side.suffix())
}

/// Expanded bidirectional table.
#[derive(Debug)]
pub struct NameTable {
    pairs: Vec<(String, String)>,
    to_source: HashMap<String, usize>,
    to_template: HashMap<String, usize>,
}

impl NameTable {
    fn build() -> Self {
        let mut pairs: Vec<(String, String)> = CENTER.iter().map(|(t, s)| (t.to_string(), s.to_string())).collect();
        for side in Side::BOTH {
            for (t, s) in SIDED {
                pairs.push((sided_template_name(t, side), sided_source_name(s, side)));
            }
            for finger in 0..FINGERS.len() {
                for segment in FINGER_SEGMENTS {
                    pairs.push((finger_template_name(finger, segment, side), finger_source_name(finger, segment, side)));
                }
            }
        }
        let to_source = pairs.iter().enumerate().map(|(i, (t, _))| (t.clone(), i)).collect();
        let to_template = pairs.iter().enumerate().map(|(i, (_, s))| (s.clone(), i)).collect();
        Self { pairs, to_source, to_template }
    }

    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> { self.pairs.iter().map(|(t, s)| (t.as_str(), s.as_str())) }
    pub fn len(&self) -> usize { self.pairs.len() }
    pub fn is_empty(&self) -> bool { self.pairs.is_empty() }

    pub fn to_source(&self, template: &str) -> Option<&str> {
        self.to_source.get(template).map(|&i| self.pairs[i].1.as_str())
    }

    pub fn to_template(&self, source: &str) -> Option<&str> {
        self.to_template.get(source).map(|&i| self.pairs[i].0.as_str())
    }
}

pub fn name_table() -> &'static NameTable {
    static TABLE: OnceLock<NameTable> = OnceLock::new();
    TABLE.get_or_init(NameTable::build)
}
