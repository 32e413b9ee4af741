// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Keymap for the terminal front end.
//!
//! Keys resolve by code and modifiers. Terminals disagree on whether a
//! shifted character carries SHIFT, so character keys match either way.

use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};

use super::ControlAction;

/// Help section a binding is listed under, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Selection,
    Output,
    Pads,
    Navigation,
    Interface,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::Selection => "Selection",
            Category::Output => "Output",
            Category::Pads => "Pads",
            Category::Navigation => "Navigation",
            Category::Interface => "Interface",
        }
    }
}

/// A key with the modifiers it must be pressed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Shortcut {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::CONTROL)
    }

    pub const fn shifted(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::SHIFT)
    }
}

impl fmt::Display for Shortcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("Ctrl+")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("Alt+")?;
        }
        // A shifted character already shows its shift
        let is_char = matches!(self.code, KeyCode::Char(_));
        if self.modifiers.contains(KeyModifiers::SHIFT) && !is_char {
            f.write_str("Shift+")?;
        }

        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(c) if self.modifiers.contains(KeyModifiers::CONTROL) => {
                write!(f, "{}", c.to_ascii_uppercase())
            }
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "F{}", n),
            KeyCode::Up => f.write_str("↑"),
            KeyCode::Down => f.write_str("↓"),
            KeyCode::Left => f.write_str("←"),
            KeyCode::Right => f.write_str("→"),
            KeyCode::Tab | KeyCode::BackTab => f.write_str("Tab"),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A shortcut bound to an action, with its help entry
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    pub shortcut: Shortcut,
    pub action: ControlAction,
    pub description: &'static str,
    pub category: Category,
}

impl KeyBinding {
    pub fn new(
        shortcut: Shortcut,
        action: ControlAction,
        description: &'static str,
        category: Category,
    ) -> Self {
        Self {
            shortcut,
            action,
            description,
            category,
        }
    }
}

/// Default keymap: shortcut, action, help text, section
const DEFAULT_KEYMAP: &[(Shortcut, ControlAction, &str, Category)] = &[
    (Shortcut::plain(KeyCode::Char('k')), ControlAction::NextKey, "Key up a semitone", Category::Selection),
    (Shortcut::shifted(KeyCode::Char('K')), ControlAction::PreviousKey, "Key down a semitone", Category::Selection),
    (Shortcut::plain(KeyCode::Char('s')), ControlAction::NextScale, "Next scale", Category::Selection),
    (Shortcut::shifted(KeyCode::Char('S')), ControlAction::PreviousScale, "Previous scale", Category::Selection),
    (Shortcut::plain(KeyCode::Char('f')), ControlAction::ToggleSpelling, "Sharps / flats", Category::Selection),
    (Shortcut::plain(KeyCode::Char(']')), ControlAction::ChordOctaveUp, "Chord octave up", Category::Selection),
    (Shortcut::plain(KeyCode::Char('[')), ControlAction::ChordOctaveDown, "Chord octave down", Category::Selection),
    (Shortcut::plain(KeyCode::Char('=')), ControlAction::OctavesUp, "Pitch octaves up", Category::Selection),
    (Shortcut::plain(KeyCode::Char('-')), ControlAction::OctavesDown, "Pitch octaves down", Category::Selection),
    (Shortcut::plain(KeyCode::Char('d')), ControlAction::CycleDestination, "Cycle destination", Category::Output),
    (Shortcut::plain(KeyCode::Char('p')), ControlAction::TogglePortSwap, "Port swap", Category::Output),
    (Shortcut::plain(KeyCode::Char('o')), ControlAction::ToggleOutput, "Open / close outputs", Category::Output),
    (Shortcut::plain(KeyCode::Esc), ControlAction::ReleaseAll, "Release all pads", Category::Output),
    (Shortcut::plain(KeyCode::Char(' ')), ControlAction::PressPad, "Play pad", Category::Pads),
    (Shortcut::plain(KeyCode::Enter), ControlAction::PressPad, "Play pad", Category::Pads),
    (Shortcut::plain(KeyCode::Up), ControlAction::NavigateUp, "Move up", Category::Navigation),
    (Shortcut::plain(KeyCode::Down), ControlAction::NavigateDown, "Move down", Category::Navigation),
    (Shortcut::plain(KeyCode::Left), ControlAction::NavigateLeft, "Move left", Category::Navigation),
    (Shortcut::plain(KeyCode::Right), ControlAction::NavigateRight, "Move right", Category::Navigation),
    (Shortcut::plain(KeyCode::Tab), ControlAction::SwitchGrid, "Pitch / chord pads", Category::Navigation),
    (Shortcut::shifted(KeyCode::BackTab), ControlAction::SwitchGrid, "Pitch / chord pads", Category::Navigation),
    (Shortcut::plain(KeyCode::Char('?')), ControlAction::ToggleHelp, "Help", Category::Interface),
    (Shortcut::plain(KeyCode::Char('h')), ControlAction::ToggleHelp, "Help", Category::Interface),
    (Shortcut::plain(KeyCode::Char('q')), ControlAction::Quit, "Quit", Category::Interface),
    (Shortcut::ctrl(KeyCode::Char('c')), ControlAction::Quit, "Quit", Category::Interface),
];

/// Shortcut to action lookup
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<Shortcut, KeyBinding>,
}

impl Keymap {
    /// A keymap with nothing bound
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut keymap = Self::empty();
        for (shortcut, action, description, category) in DEFAULT_KEYMAP {
            keymap.bind(KeyBinding::new(
                *shortcut,
                action.clone(),
                *description,
                *category,
            ));
        }
        keymap
    }

    /// Bind a shortcut, replacing any earlier binding for it
    pub fn bind(&mut self, binding: KeyBinding) -> Option<KeyBinding> {
        self.bindings.insert(binding.shortcut, binding)
    }

    pub fn unbind(&mut self, shortcut: &Shortcut) -> Option<KeyBinding> {
        self.bindings.remove(shortcut)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Action for a key press, if any
    pub fn action(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<ControlAction> {
        let exact = self.bindings.get(&Shortcut::new(code, modifiers));
        let binding = match (exact, code) {
            (Some(binding), _) => Some(binding),
            (None, KeyCode::Char(_)) => self
                .bindings
                .get(&Shortcut::new(code, modifiers ^ KeyModifiers::SHIFT)),
            (None, _) => None,
        };
        binding.map(|b| b.action.clone())
    }

    /// Bindings grouped by section, sections and entries in display order
    pub fn sections(&self) -> Vec<(Category, Vec<&KeyBinding>)> {
        let mut sections: Vec<(Category, Vec<&KeyBinding>)> = Vec::new();
        let mut bindings: Vec<&KeyBinding> = self.bindings.values().collect();
        bindings.sort_by_key(|b| (b.category, b.shortcut.to_string()));

        for binding in bindings {
            match sections.last_mut() {
                Some((category, entries)) if *category == binding.category => {
                    entries.push(binding)
                }
                _ => sections.push((binding.category, vec![binding])),
            }
        }
        sections
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::with_defaults()
    }
}
