//! Input event types wrapping crossterm for decoupling.
//!
//! Application code handles [`Event`] values; crossterm events are
//! converted on the way in so components never depend on crossterm
//! directly. Key releases and repeats are filtered out.

use std::collections::VecDeque;
use std::io;
use std::ops::{BitAnd, BitOr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// Keyboard key, decoupled from crossterm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Escape,
    Tab,
    BackTab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    F(u8),
}

// ---------------------------------------------------------------------------
// Modifiers
// ---------------------------------------------------------------------------

/// Modifier key bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const SHIFT: Modifiers = Modifiers(1);
    pub const CTRL: Modifiers = Modifiers(2);
    pub const ALT: Modifiers = Modifiers(4);

    /// Check whether `self` contains all the bits in `other`.
    pub fn contains(self, other: Modifiers) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Modifiers {
    type Output = Modifiers;
    fn bitor(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 | rhs.0)
    }
}

impl BitAnd for Modifiers {
    type Output = Modifiers;
    fn bitand(self, rhs: Self) -> Self::Output {
        Modifiers(self.0 & rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A key press with modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(code: Key, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

/// Top-level input event delivered to the application handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    Paste(String),
    FocusGained,
    FocusLost,
}

// ---------------------------------------------------------------------------
// crossterm conversion
// ---------------------------------------------------------------------------

fn convert_modifiers(m: crossterm::event::KeyModifiers) -> Modifiers {
    let mut out = Modifiers::NONE;
    if m.contains(crossterm::event::KeyModifiers::SHIFT) {
        out = out | Modifiers::SHIFT;
    }
    if m.contains(crossterm::event::KeyModifiers::CONTROL) {
        out = out | Modifiers::CTRL;
    }
    if m.contains(crossterm::event::KeyModifiers::ALT) {
        out = out | Modifiers::ALT;
    }
    out
}

fn convert_key(code: crossterm::event::KeyCode) -> Option<Key> {
    let key = match code {
        crossterm::event::KeyCode::Char(c) => Key::Char(c),
        crossterm::event::KeyCode::Enter => Key::Enter,
        crossterm::event::KeyCode::Esc => Key::Escape,
        crossterm::event::KeyCode::Tab => Key::Tab,
        crossterm::event::KeyCode::BackTab => Key::BackTab,
        crossterm::event::KeyCode::Backspace => Key::Backspace,
        crossterm::event::KeyCode::Delete => Key::Delete,
        crossterm::event::KeyCode::Left => Key::Left,
        crossterm::event::KeyCode::Right => Key::Right,
        crossterm::event::KeyCode::Up => Key::Up,
        crossterm::event::KeyCode::Down => Key::Down,
        crossterm::event::KeyCode::Home => Key::Home,
        crossterm::event::KeyCode::End => Key::End,
        crossterm::event::KeyCode::PageUp => Key::PageUp,
        crossterm::event::KeyCode::PageDown => Key::PageDown,
        crossterm::event::KeyCode::F(n) => Key::F(n),
        _ => return None,
    };
    Some(key)
}

/// Convert a crossterm event, dropping releases, repeats, and events we
/// don't handle.
pub fn map_event(event: crossterm::event::Event) -> Option<Event> {
    match event {
        crossterm::event::Event::Key(key) => {
            if key.kind != crossterm::event::KeyEventKind::Press {
                return None;
            }
            let code = convert_key(key.code)?;
            Some(Event::Key(KeyEvent::new(code, convert_modifiers(key.modifiers))))
        }
        crossterm::event::Event::Resize(width, height) => {
            Some(Event::Resize { width, height })
        }
        crossterm::event::Event::Paste(text) => Some(Event::Paste(text)),
        crossterm::event::Event::FocusGained => Some(Event::FocusGained),
        crossterm::event::Event::FocusLost => Some(Event::FocusLost),
        _ => None,
    }
}

/// Poll the terminal for the next event, waiting at most `timeout`.
pub fn poll_event(timeout: Duration) -> io::Result<Option<Event>> {
    if !crossterm::event::poll(timeout)? {
        return Ok(None);
    }
    Ok(map_event(crossterm::event::read()?))
}

// ---------------------------------------------------------------------------
// DispatchQueue
// ---------------------------------------------------------------------------

/// A cloneable handle for feeding events in from another thread.
#[derive(Clone, Default)]
pub struct DispatchQueue {
    events: Arc<Mutex<VecDeque<Event>>>,
}

impl DispatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        if let Ok(mut q) = self.events.lock() {
            q.push_back(event);
        }
    }

    pub fn drain(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(mut q) => q.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event as ct;
    use pretty_assertions::assert_eq;

    fn press(code: ct::KeyCode, modifiers: ct::KeyModifiers) -> ct::Event {
        ct::Event::Key(ct::KeyEvent::new(code, modifiers))
    }

    #[test]
    fn maps_key_presses() {
        let ev = map_event(press(ct::KeyCode::Char('q'), ct::KeyModifiers::CONTROL));
        assert_eq!(
            ev,
            Some(Event::Key(KeyEvent::new(
                Key::Char('q'),
                Modifiers::CTRL
            )))
        );
    }

    #[test]
    fn drops_key_releases() {
        let mut key = ct::KeyEvent::new(ct::KeyCode::Char('a'), ct::KeyModifiers::NONE);
        key.kind = ct::KeyEventKind::Release;
        assert_eq!(map_event(ct::Event::Key(key)), None);
    }

    #[test]
    fn maps_resize_and_paste() {
        assert_eq!(
            map_event(ct::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
        assert_eq!(
            map_event(ct::Event::Paste("hi".into())),
            Some(Event::Paste("hi".into()))
        );
    }

    #[test]
    fn modifier_bits_combine() {
        let m = Modifiers::CTRL | Modifiers::SHIFT;
        assert!(m.contains(Modifiers::CTRL));
        assert!(m.contains(Modifiers::SHIFT));
        assert!(!m.contains(Modifiers::ALT));
        assert!(Modifiers::NONE.is_empty());
    }

    #[test]
    fn queue_is_fifo() {
        let q = DispatchQueue::new();
        q.push(Event::FocusGained);
        q.push(Event::FocusLost);
        assert_eq!(q.drain(), vec![Event::FocusGained, Event::FocusLost]);
        assert_eq!(q.drain(), Vec::<Event>::new());
    }
}
