/*
 * This file is part of Hwfan.
 *
 * Copyright (C) 2025 Hwfan contributors
 *
 * Hwfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Hwfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Hwfan. If not, see <https://www.gnu.org/licenses/>.
 */

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Returns `true` when the key asks to quit.
pub fn handle_key_event(key_event: KeyEvent) -> bool {
    let KeyEvent { code, modifiers, kind, .. } = key_event;
    if kind == KeyEventKind::Release {
        return false;
    }
    match code {
        KeyCode::Esc | KeyCode::Char('q') => true,
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_quit_keys() {
        assert!(handle_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(handle_key_event(key(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        assert!(!handle_key_event(key(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!handle_key_event(key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(!handle_key_event(key(KeyCode::Up, KeyModifiers::NONE)));
    }

    #[test]
    fn test_release_does_not_quit() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(!handle_key_event(release));
    }
}
