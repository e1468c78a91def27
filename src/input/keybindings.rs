use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{RefKey, Screen};
use crate::viewer::{PaneTarget, ScrollMotion, ViewerKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Forwarded to the diff viewer.
    Viewer(ViewerKey),
    Generate,
    CopyCommit,
    SavePr,
    BackToDiff,
    ScrollResult(ScrollMotion),
    /// Forwarded to the ref picker.
    Refs(RefKey),
    BackToRefs,
    Quit,
    None,
}

pub fn map_key_to_action(key: KeyEvent, screen: Screen) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match screen {
        Screen::RefSelect => map_ref_key(key),
        Screen::Diff => map_diff_key(key),
        Screen::Result => map_result_key(key),
    }
}

fn scroll(motion: ScrollMotion) -> Action {
    Action::Viewer(ViewerKey::Scroll(PaneTarget::Focused, motion))
}

fn scroll_both(motion: ScrollMotion) -> Action {
    Action::Viewer(ViewerKey::Scroll(PaneTarget::Both, motion))
}

fn map_diff_key(key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('d') => scroll(ScrollMotion::HalfPageDown),
            KeyCode::Char('u') => scroll(ScrollMotion::HalfPageUp),
            KeyCode::Char('f') => scroll(ScrollMotion::PageDown),
            KeyCode::Char('b') => scroll(ScrollMotion::PageUp),
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Viewer(ViewerKey::Quit),
        KeyCode::Char('s') => Action::Viewer(ViewerKey::ToggleMode),
        KeyCode::Char('h') => Action::Viewer(ViewerKey::ToggleHighlight),
        KeyCode::Char('w') => Action::Viewer(ViewerKey::ToggleWhitespace),
        KeyCode::Char('y') => Action::Viewer(ViewerKey::ToggleScrollSync),
        KeyCode::Tab => Action::Viewer(ViewerKey::ToggleFocus),
        KeyCode::Char('g') => Action::Generate,
        KeyCode::Char('b') => Action::BackToRefs,

        KeyCode::Char('j') | KeyCode::Down => scroll(ScrollMotion::Down(1)),
        KeyCode::Char('k') | KeyCode::Up => scroll(ScrollMotion::Up(1)),
        KeyCode::Char('J') => scroll_both(ScrollMotion::Down(1)),
        KeyCode::Char('K') => scroll_both(ScrollMotion::Up(1)),
        KeyCode::PageDown => scroll(ScrollMotion::PageDown),
        KeyCode::PageUp => scroll(ScrollMotion::PageUp),
        KeyCode::Home => scroll(ScrollMotion::Top),
        KeyCode::End | KeyCode::Char('G') => scroll(ScrollMotion::Bottom),
        _ => Action::None,
    }
}

fn map_ref_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::Refs(RefKey::Down),
        KeyCode::Char('k') | KeyCode::Up => Action::Refs(RefKey::Up),
        KeyCode::Home | KeyCode::Char('g') => Action::Refs(RefKey::Top),
        KeyCode::End | KeyCode::Char('G') => Action::Refs(RefKey::Bottom),
        KeyCode::Tab => Action::Refs(RefKey::SwitchSide),
        KeyCode::Enter | KeyCode::Char(' ') => Action::Refs(RefKey::Select),
        KeyCode::Char('r') => Action::Refs(RefKey::Reset),
        KeyCode::Char('R') => Action::Refs(RefKey::ResetAll),
        _ => Action::None,
    }
}

fn map_result_key(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('c') => Action::CopyCommit,
        KeyCode::Char('p') => Action::SavePr,
        KeyCode::Char('d') | KeyCode::Esc => Action::BackToDiff,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollResult(ScrollMotion::Down(1)),
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollResult(ScrollMotion::Up(1)),
        KeyCode::PageDown => Action::ScrollResult(ScrollMotion::PageDown),
        KeyCode::PageUp => Action::ScrollResult(ScrollMotion::PageUp),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn should_map_viewer_toggles() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('s')), Screen::Diff),
            Action::Viewer(ViewerKey::ToggleMode)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('h')), Screen::Diff),
            Action::Viewer(ViewerKey::ToggleHighlight)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('w')), Screen::Diff),
            Action::Viewer(ViewerKey::ToggleWhitespace)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('y')), Screen::Diff),
            Action::Viewer(ViewerKey::ToggleScrollSync)
        );
    }

    #[test]
    fn should_scroll_focused_pane_with_j_and_both_with_shift() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('j')), Screen::Diff),
            Action::Viewer(ViewerKey::Scroll(PaneTarget::Focused, ScrollMotion::Down(1)))
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('K')), Screen::Diff),
            Action::Viewer(ViewerKey::Scroll(PaneTarget::Both, ScrollMotion::Up(1)))
        );
        assert_eq!(
            map_key_to_action(ctrl('d'), Screen::Diff),
            Action::Viewer(ViewerKey::Scroll(PaneTarget::Focused, ScrollMotion::HalfPageDown))
        );
    }

    #[test]
    fn should_map_ref_select_keys() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('j')), Screen::RefSelect),
            Action::Refs(RefKey::Down)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Tab), Screen::RefSelect),
            Action::Refs(RefKey::SwitchSide)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Enter), Screen::RefSelect),
            Action::Refs(RefKey::Select)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char(' ')), Screen::RefSelect),
            Action::Refs(RefKey::Select)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('R')), Screen::RefSelect),
            Action::Refs(RefKey::ResetAll)
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('q')), Screen::RefSelect),
            Action::Quit
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('b')), Screen::Diff),
            Action::BackToRefs
        );
    }

    #[test]
    fn should_quit_on_ctrl_c_from_any_screen() {
        assert_eq!(map_key_to_action(ctrl('c'), Screen::RefSelect), Action::Quit);
        assert_eq!(map_key_to_action(ctrl('c'), Screen::Diff), Action::Quit);
        assert_eq!(map_key_to_action(ctrl('c'), Screen::Result), Action::Quit);
    }

    #[test]
    fn should_map_result_screen_keys() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('c')), Screen::Result),
            Action::CopyCommit
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('p')), Screen::Result),
            Action::SavePr
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('d')), Screen::Result),
            Action::BackToDiff
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('s')), Screen::Result),
            Action::None
        );
    }

    #[test]
    fn should_generate_only_from_diff_screen() {
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('g')), Screen::Diff),
            Action::Generate
        );
        assert_eq!(
            map_key_to_action(key(KeyCode::Char('g')), Screen::Result),
            Action::None
        );
    }
}
