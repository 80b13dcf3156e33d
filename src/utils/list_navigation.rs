//! Navigation helpers for `ListState`.

use crate::keymap::Action;
use ratatui::widgets::ListState;

pub const PAGE_SIZE: usize = 10;

pub trait ListStateExt {
    fn move_up_by(&mut self, count: usize, total_items: usize);
    fn move_down_by(&mut self, count: usize, total_items: usize);
    fn select_first_item(&mut self, total_items: usize);
    fn select_last_item(&mut self, total_items: usize);

    /// Keep the selection inside `0..total_items` after the list changed.
    fn clamp_to(&mut self, total_items: usize);

    /// Apply a navigation action. Returns true if it was one.
    fn navigate(&mut self, action: Action, total_items: usize) -> bool;
}

impl ListStateExt for ListState {
    fn move_up_by(&mut self, count: usize, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let current = self.selected().unwrap_or(0);
        self.select(Some(current.saturating_sub(count)));
    }

    fn move_down_by(&mut self, count: usize, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let current = self.selected().unwrap_or(0);
        self.select(Some((current + count).min(total_items - 1)));
    }

    fn select_first_item(&mut self, total_items: usize) {
        if total_items > 0 {
            self.select(Some(0));
        }
    }

    fn select_last_item(&mut self, total_items: usize) {
        if total_items > 0 {
            self.select(Some(total_items - 1));
        }
    }

    fn clamp_to(&mut self, total_items: usize) {
        match (self.selected(), total_items) {
            (_, 0) => self.select(None),
            (None, _) => self.select(Some(0)),
            (Some(i), n) if i >= n => self.select(Some(n - 1)),
            _ => {}
        }
    }

    fn navigate(&mut self, action: Action, total_items: usize) -> bool {
        match action {
            Action::MoveUp => self.move_up_by(1, total_items),
            Action::MoveDown => self.move_down_by(1, total_items),
            Action::PageUp => self.move_up_by(PAGE_SIZE, total_items),
            Action::PageDown => self.move_down_by(PAGE_SIZE, total_items),
            Action::GoToTop => self.select_first_item(total_items),
            Action::GoToEnd => self.select_last_item(total_items),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_stop_at_bounds() {
        let mut state = ListState::default();
        state.move_down_by(1, 3);
        assert_eq!(state.selected(), Some(1));
        state.move_down_by(5, 3);
        assert_eq!(state.selected(), Some(2));
        state.move_up_by(10, 3);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_empty_list_is_untouched() {
        let mut state = ListState::default();
        assert!(state.navigate(Action::MoveDown, 0));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut state = ListState::default();
        state.select(Some(4));
        state.clamp_to(2);
        assert_eq!(state.selected(), Some(1));
        state.clamp_to(0);
        assert_eq!(state.selected(), None);
        state.clamp_to(3);
        assert_eq!(state.selected(), Some(0));
    }

    #[test]
    fn test_navigate_ignores_other_actions() {
        let mut state = ListState::default();
        assert!(!state.navigate(Action::Confirm, 5));
        assert!(state.navigate(Action::GoToEnd, 5));
        assert_eq!(state.selected(), Some(4));
    }
}
