//! Pattern classification and cross-convention bone matching.
//!
//! Both operations are pure: they read the bones they are given and never mutate a skeleton.

pub mod table;

pub use table::{name_table, Side};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::skeleton::{Bone, Skeleton};

/// Name prefixes the rig generator puts in front of bones copied from the template.
pub const GENERATOR_PREFIXES: [&str; 3] = ["DEF-", "ORG-", "MCH-"];

/// A single name rule. Written in YAML as a one-key map, e.g. `contains: teeth`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "PatternDoc", try_from = "PatternDoc")]
pub enum Pattern {
    Contains(String),
    Exact(String),
    Prefix(String),
    Suffix(String),
}

impl Pattern {
    pub fn contains(s: &str) -> Self { Pattern::Contains(s.to_string()) }
    pub fn exact(s: &str) -> Self { Pattern::Exact(s.to_string()) }
    pub fn prefix(s: &str) -> Self { Pattern::Prefix(s.to_string()) }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Pattern::Contains(s) => name.contains(s.as_str()),
            Pattern::Exact(s) => name == s,
            Pattern::Prefix(s) => name.starts_with(s.as_str()),
            Pattern::Suffix(s) => name.ends_with(s.as_str()),
        }
    }
}

#[derive(Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatternDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    suffix: Option<String>,
}

impl TryFrom<PatternDoc> for Pattern {
    type Error = String;

    fn try_from(doc: PatternDoc) -> Result<Self, String> {
        match (doc.contains, doc.exact, doc.prefix, doc.suffix) {
            (Some(s), None, None, None) => Ok(Pattern::Contains(s)),
            (None, Some(s), None, None) => Ok(Pattern::Exact(s)),
            (None, None, Some(s), None) => Ok(Pattern::Prefix(s)),
            (None, None, None, Some(s)) => Ok(Pattern::Suffix(s)),
            _ => Err("a pattern takes exactly one of `contains`, `exact`, `prefix`, `suffix`".to_string()),
        }
    }
}

impl From<Pattern> for PatternDoc {
    fn from(pattern: Pattern) -> Self {
        match pattern {
            Pattern::Contains(s) => PatternDoc { contains: Some(s), ..Default::default() },
            Pattern::Exact(s) => PatternDoc { exact: Some(s), ..Default::default() },
            Pattern::Prefix(s) => PatternDoc { prefix: Some(s), ..Default::default() },
            Pattern::Suffix(s) => PatternDoc { suffix: Some(s), ..Default::default() },
        }
    }
}

pub type PatternList = Vec<Pattern>;

/// Substring patterns for each entry.
pub fn contains_any(names: &[&str]) -> PatternList { names.iter().map(|n| Pattern::contains(n)).collect() }

pub trait Named {
    fn name(&self) -> &str;
}

impl Named for Bone {
    fn name(&self) -> &str { &self.name }
}

impl Named for str {
    fn name(&self) -> &str { self }
}

impl Named for String {
    fn name(&self) -> &str { self }
}

/// Items whose name matches any pattern, in input order, each name at most once.
pub fn classify<'a, T>(items: impl IntoIterator<Item = &'a T>, patterns: &[Pattern]) -> Vec<&'a T>
where
    T: Named + ?Sized + 'a,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| patterns.iter().any(|p| p.matches(item.name())))
        .filter(|item| seen.insert(item.name().to_string()))
        .collect()
}

pub fn classify_one<'a, T>(items: impl IntoIterator<Item = &'a T>, pattern: &Pattern) -> Vec<&'a T>
where
    T: Named + ?Sized + 'a,
{
    classify(items, std::slice::from_ref(pattern))
}

/// Names of the bones matching any pattern.
pub fn classify_names<'a>(bones: impl IntoIterator<Item = &'a Bone>, patterns: &[Pattern]) -> Vec<String> {
    classify(bones, patterns).into_iter().map(|b| b.name.clone()).collect()
}

/// A matched (bone, counterpart-in-target) pair. Consumed immediately by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BonePair {
    pub bone: String,
    pub counterpart: String,
}

/// Names a bone may go by in the other convention, most specific first: the name itself,
/// the name without a generator prefix, then table translations of both.
pub fn equivalent_names(name: &str) -> Vec<&str> {
    let table = name_table();
    let mut bases = vec![name];
    if let Some(stripped) = GENERATOR_PREFIXES.iter().find_map(|p| name.strip_prefix(p)) {
        bases.push(stripped);
    }
    let mut out = bases.clone();
    for base in bases {
        out.extend(table.to_source(base));
        out.extend(table.to_template(base));
    }
    out
}

/// Pair each bone with its counterpart in `target`, keeping input order.
/// Bones without a resolvable counterpart are left out.
pub fn map_bones<'a, T>(bones: impl IntoIterator<Item = &'a T>, target: &Skeleton) -> Vec<BonePair>
where
    T: Named + ?Sized + 'a,
{
    bones
        .into_iter()
        .filter_map(|bone| {
            let name = bone.name();
            equivalent_names(name).into_iter().find(|candidate| target.contains(candidate)).map(|counterpart| BonePair {
                bone: name.to_string(),
                counterpart: counterpart.to_string(),
            })
        })
        .collect()
}
