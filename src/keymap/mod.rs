//! # Key Chords
//!
//! Fixed hotkeys of the editor integration, optionally overridden from the
//! configuration.
//!
//! Chords are written the way they are shown to the user, modifiers first
//! and joined with `+`: `Ctrl+Alt+Shift+K`, `Alt+Shift+C`.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::Config;

pub const HOTKEY_GENERATE: &str = "Alt+Shift+C";
pub const HOTKEY_SETTINGS: &str = "Alt+Shift+O";
pub const HOTKEY_REMOVE: &str = "Alt+Shift+U";
pub const HOTKEY_ORDERED_LIST: &str = "Ctrl+Alt+Shift+.";
pub const HOTKEY_UNORDERED_LIST: &str = "Ctrl+Alt+Shift+,";
pub const HOTKEY_MULTI_CLOZE: &str = "Ctrl+Shift+K";
pub const HOTKEY_MULTI_CLOZE_ALT: &str = "Ctrl+Alt+Shift+K";

/// Commands the editor integration binds to keys and buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorCommand {
    GenerateClozes,
    NoteSettings,
    RemoveClozes,
    OrderedList,
    UnorderedList,
    MultiLineCloze,
}

impl EditorCommand {
    pub const ALL: [EditorCommand; 6] = [
        EditorCommand::GenerateClozes,
        EditorCommand::NoteSettings,
        EditorCommand::RemoveClozes,
        EditorCommand::OrderedList,
        EditorCommand::UnorderedList,
        EditorCommand::MultiLineCloze,
    ];

    /// Identifier used in the configuration file
    pub fn id(self) -> &'static str {
        match self {
            EditorCommand::GenerateClozes => "generate",
            EditorCommand::NoteSettings => "settings",
            EditorCommand::RemoveClozes => "remove_clozes",
            EditorCommand::OrderedList => "ordered_list",
            EditorCommand::UnorderedList => "unordered_list",
            EditorCommand::MultiLineCloze => "multi_cloze",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.id() == id)
    }

    pub fn description(self) -> &'static str {
        match self {
            EditorCommand::GenerateClozes => "Generate overlapping clozes",
            EditorCommand::NoteSettings => "Overlapping cloze generation settings",
            EditorCommand::RemoveClozes => "Remove all cloze markers in selected text",
            EditorCommand::OrderedList => "Generate clozes as ordered list",
            EditorCommand::UnorderedList => "Generate clozes as unordered list",
            EditorCommand::MultiLineCloze => "Wrap each line in a separate cloze",
        }
    }

    fn default_chords(self) -> &'static [&'static str] {
        match self {
            EditorCommand::GenerateClozes => &[HOTKEY_GENERATE],
            EditorCommand::NoteSettings => &[HOTKEY_SETTINGS],
            EditorCommand::RemoveClozes => &[HOTKEY_REMOVE],
            EditorCommand::OrderedList => &[HOTKEY_ORDERED_LIST],
            EditorCommand::UnorderedList => &[HOTKEY_UNORDERED_LIST],
            EditorCommand::MultiLineCloze => &[HOTKEY_MULTI_CLOZE, HOTKEY_MULTI_CLOZE_ALT],
        }
    }
}

/// A key plus the modifiers held with it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyChord {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self {
            code: normalize(code),
            modifiers,
        }
    }

    /// Whether a key event triggers this chord.
    ///
    /// Besides the exact event this accepts the ways a terminal may encode
    /// it: Shift+K as an uppercase `K`, Shift+. as `>` and, in the legacy
    /// encoding, Ctrl+Shift+letter without the Shift flag.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if self.matches_exactly(event) {
            return true;
        }

        let (chord_code, chord_modifiers) = canonical(self.code, self.modifiers);
        let (code, modifiers) = canonical(event.code, event.modifiers);
        if code != chord_code {
            return false;
        }
        if modifiers == chord_modifiers {
            return true;
        }

        matches!(code, KeyCode::Char(c) if c.is_ascii_lowercase())
            && modifiers.contains(KeyModifiers::CONTROL)
            && !modifiers.contains(KeyModifiers::SHIFT)
            && modifiers | KeyModifiers::SHIFT == chord_modifiers
    }

    /// Same key and modifiers, ignoring the case of characters
    pub fn matches_exactly(&self, event: &KeyEvent) -> bool {
        normalize(event.code) == self.code && event.modifiers == self.modifiers
    }
}

fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Characters produced with Shift on a US layout, and their base key
const SHIFTED: [(char, char); 21] = [
    ('!', '1'),
    ('@', '2'),
    ('#', '3'),
    ('$', '4'),
    ('%', '5'),
    ('^', '6'),
    ('&', '7'),
    ('*', '8'),
    ('(', '9'),
    (')', '0'),
    ('_', '-'),
    ('+', '='),
    ('{', '['),
    ('}', ']'),
    ('|', '\\'),
    (':', ';'),
    ('"', '\''),
    ('~', '`'),
    ('<', ','),
    ('>', '.'),
    ('?', '/'),
];

/// Base key plus an explicit Shift for shifted characters
fn canonical(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
    let KeyCode::Char(c) = code else {
        return (code, modifiers);
    };
    if c.is_ascii_uppercase() {
        return (
            KeyCode::Char(c.to_ascii_lowercase()),
            modifiers | KeyModifiers::SHIFT,
        );
    }
    match SHIFTED.iter().find(|(shifted, _)| *shifted == c) {
        Some(&(_, base)) => (KeyCode::Char(base), modifiers | KeyModifiers::SHIFT),
        None => (code, modifiers),
    }
}

impl FromStr for KeyChord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut modifiers = KeyModifiers::NONE;
        let mut code = None;

        // Split manually so that "Ctrl++" binds the plus key
        let mut parts: Vec<&str> = s.split('+').collect();
        if s.ends_with("++") {
            parts.truncate(parts.len() - 2);
            parts.push("+");
        }

        for part in parts {
            match part.trim().to_lowercase().as_str() {
                "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" | "option" => modifiers |= KeyModifiers::ALT,
                "meta" | "super" | "cmd" => modifiers |= KeyModifiers::SUPER,
                "" => return Err(anyhow!("Empty key in chord '{}'", s)),
                key => {
                    if code.is_some() {
                        return Err(anyhow!("Multiple keys in chord '{}'", s));
                    }
                    code = Some(parse_key_code(key).ok_or_else(|| {
                        anyhow!("Unknown key '{}' in chord '{}'", key, s)
                    })?);
                }
            }
        }

        let code = code.ok_or_else(|| anyhow!("No key in chord '{}'", s))?;
        Ok(KeyChord::new(code, modifiers))
    }
}

fn parse_key_code(key: &str) -> Option<KeyCode> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let code = match key {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        _ => {
            let number = key.strip_prefix('f')?.parse::<u8>().ok()?;
            if (1..=24).contains(&number) {
                KeyCode::F(number)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (KeyModifiers::CONTROL, "Ctrl"),
            (KeyModifiers::ALT, "Alt"),
            (KeyModifiers::SHIFT, "Shift"),
            (KeyModifiers::SUPER, "Meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{}+", name)?;
            }
        }
        match self.code {
            KeyCode::Char(' ') => write!(f, "Space"),
            KeyCode::Char(c) => write!(f, "{}", c.to_ascii_uppercase()),
            KeyCode::F(n) => write!(f, "F{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// A chord bound to a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub chord: KeyChord,
    pub command: EditorCommand,
}

/// Chord to command lookup for one editor instance
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Keymap {
    /// The fixed default chords
    pub fn defaults() -> Result<Self> {
        let mut bindings = Vec::new();
        for command in EditorCommand::ALL {
            for chord in command.default_chords() {
                bindings.push(Binding {
                    chord: chord.parse()?,
                    command,
                });
            }
        }
        Ok(Self { bindings })
    }

    /// Defaults with the overrides from `local.keybindings` applied.
    ///
    /// An override replaces every default chord of its command.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut keymap = Self::defaults()?;
        for (id, chord) in &config.local.keybindings {
            let command = EditorCommand::from_id(id)
                .ok_or_else(|| anyhow!("Unknown command '{}' in keybindings", id))?;
            let chord: KeyChord = chord.parse()?;
            keymap.bindings.retain(|binding| binding.command != command);
            keymap.bindings.push(Binding { chord, command });
            tracing::debug!("Bound {} to {}", id, chord);
        }
        Ok(keymap)
    }

    /// Command bound to a key event, if any. Exact matches win over
    /// alternative encodings.
    pub fn lookup(&self, event: &KeyEvent) -> Option<EditorCommand> {
        self.bindings
            .iter()
            .find(|binding| binding.chord.matches_exactly(event))
            .or_else(|| {
                self.bindings
                    .iter()
                    .find(|binding| binding.chord.matches(event))
            })
            .map(|binding| binding.command)
    }

    /// First chord bound to `command`
    pub fn chord_for(&self, command: EditorCommand) -> Option<&KeyChord> {
        self.bindings
            .iter()
            .find(|binding| binding.command == command)
            .map(|binding| &binding.chord)
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }
}
