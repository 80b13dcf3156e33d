//! Semantic actions triggered by key bindings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PageUp,
    PageDown,
    GoToTop,
    GoToEnd,
    /// Cursor to start of input
    Home,
    /// Cursor to end of input
    End,

    // Selection
    Confirm,
    Cancel,

    // Global
    Quit,
    Help,

    // Screen actions
    /// Focus the search box
    Search,
    Refresh,
    /// Flip between standard and premium
    ToggleTier,
    /// Start another entry after a successful submit
    Create,
    /// Submit the current form
    Submit,
    /// Switch between sign-in and sign-up
    SwitchMode,

    // Text editing
    Backspace,
    DeleteChar,

    // Field navigation
    NextField,
    PrevField,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move up",
            Action::MoveDown => "Move down",
            Action::MoveLeft => "Previous filter",
            Action::MoveRight => "Next filter",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::GoToTop => "Go to top",
            Action::GoToEnd => "Go to end",
            Action::Home => "Start of input",
            Action::End => "End of input",
            Action::Confirm => "Select / confirm",
            Action::Cancel => "Back",
            Action::Quit => "Quit",
            Action::Help => "Show help",
            Action::Search => "Search services",
            Action::Refresh => "Reload",
            Action::ToggleTier => "Toggle standard / premium",
            Action::Create => "Add another",
            Action::Submit => "Submit form",
            Action::SwitchMode => "Switch sign in / sign up",
            Action::Backspace => "Backspace",
            Action::DeleteChar => "Delete character",
            Action::NextField => "Next field",
            Action::PrevField => "Previous field",
        }
    }

    /// Group heading in the help overlay.
    pub fn category(&self) -> &'static str {
        match self {
            Action::MoveUp
            | Action::MoveDown
            | Action::MoveLeft
            | Action::MoveRight
            | Action::PageUp
            | Action::PageDown
            | Action::GoToTop
            | Action::GoToEnd
            | Action::Home
            | Action::End => "Navigation",

            Action::Confirm | Action::Cancel => "Selection",

            Action::Quit | Action::Help => "Global",

            Action::Search
            | Action::Refresh
            | Action::ToggleTier
            | Action::Create
            | Action::Submit
            | Action::SwitchMode => "Actions",

            Action::Backspace | Action::DeleteChar => "Text Editing",

            Action::NextField | Action::PrevField => "Field Navigation",
        }
    }

    /// Actions that still apply while a text input has focus.
    pub fn allowed_while_typing(&self) -> bool {
        matches!(
            self,
            Action::Confirm
                | Action::Cancel
                | Action::Submit
                | Action::SwitchMode
                | Action::NextField
                | Action::PrevField
                | Action::MoveUp
                | Action::MoveDown
                | Action::Backspace
                | Action::DeleteChar
                | Action::Home
                | Action::End
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_description() {
        assert_eq!(Action::ToggleTier.description(), "Toggle standard / premium");
        assert_eq!(Action::Quit.description(), "Quit");
    }

    #[test]
    fn test_action_category() {
        assert_eq!(Action::MoveUp.category(), "Navigation");
        assert_eq!(Action::Quit.category(), "Global");
        assert_eq!(Action::Refresh.category(), "Actions");
    }

    #[test]
    fn test_typing_suppresses_single_letter_actions() {
        assert!(!Action::Quit.allowed_while_typing());
        assert!(!Action::ToggleTier.allowed_while_typing());
        assert!(Action::Submit.allowed_while_typing());
    }

    #[test]
    fn test_action_serde() {
        assert_eq!(serde_json::to_string(&Action::ToggleTier).unwrap(), "\"toggle_tier\"");
        let action: Action = serde_json::from_str("\"next_field\"").unwrap();
        assert_eq!(action, Action::NextField);
    }
}
