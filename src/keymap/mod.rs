//! Keyboard shortcuts: a preset plus user overrides from the config file.

mod actions;
mod binding;
mod presets;

pub use actions::Action;
pub use binding::KeyBinding;
pub use presets::KeymapPreset;

use crossterm::event::{KeyCode, KeyModifiers};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Keymap {
    #[serde(default)]
    pub preset: KeymapPreset,

    /// Checked before the preset. Overriding an action hides every preset
    /// binding for it.
    #[serde(default)]
    pub overrides: Vec<KeyBinding>,
}

impl Keymap {
    pub fn get_action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
        self.all_bindings()
            .into_iter()
            .find(|b| b.matches(code, modifiers))
            .map(|b| b.action)
    }

    /// Overrides followed by the preset bindings they do not shadow.
    pub fn all_bindings(&self) -> Vec<KeyBinding> {
        let mut bindings = self.overrides.clone();
        bindings.extend(
            self.preset
                .bindings()
                .into_iter()
                .filter(|p| !self.overrides.iter().any(|o| o.action == p.action)),
        );
        bindings
    }

    /// Overrides whose key string does not parse.
    pub fn invalid_overrides(&self) -> Vec<(String, String)> {
        self.overrides
            .iter()
            .filter_map(|b| b.parse().err().map(|e| (b.key.clone(), e)))
            .collect()
    }

    /// Display string of the first key bound to `action`.
    pub fn key_for(&self, action: Action) -> String {
        self.all_bindings()
            .into_iter()
            .find(|b| b.action == action)
            .map_or_else(|| format!("{:?}", action), |b| b.display())
    }

    pub fn navigation_display(&self) -> String {
        format!("{}/{}", self.key_for(Action::MoveUp), self.key_for(Action::MoveDown))
    }

    /// Footer hint for list screens.
    pub fn footer_navigation(&self) -> String {
        format!(
            "{}: Navigate | {}: Select | {}: Back | {}: Help",
            self.navigation_display(),
            self.key_for(Action::Confirm),
            self.key_for(Action::Cancel),
            self.key_for(Action::Help)
        )
    }

    /// Footer hint for form screens.
    pub fn footer_form(&self) -> String {
        format!(
            "{}/{}: Field | {}: Submit | {}: Back",
            self.key_for(Action::NextField),
            self.key_for(Action::PrevField),
            self.key_for(Action::Submit),
            self.key_for(Action::Cancel)
        )
    }
}
