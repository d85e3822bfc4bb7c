use std::collections::BTreeSet;

use super::{Host, Mode};

/// In-memory host: tracks selection and mode switches without a live application.
#[derive(Debug, Default)]
pub struct SceneHost {
    mode: Mode,
    selected: BTreeSet<String>,
    history: Vec<Mode>,
}

impl SceneHost {
    pub fn new() -> Self { Self::default() }
    pub fn is_selected(&self, object: &str) -> bool { self.selected.contains(object) }
    /// Every mode the host was switched into, oldest first.
    pub fn history(&self) -> &[Mode] { &self.history }
}

impl Host for SceneHost {
    fn select(&mut self, object: &str, selected: bool) {
        if selected {
            self.selected.insert(object.to_string());
        } else {
            self.selected.remove(object);
        }
    }

    fn current_mode(&self) -> Mode { self.mode }

    fn set_mode(&mut self, mode: Mode) {
        self.history.push(mode);
        self.mode = mode;
    }
}
