use crate::keymap::{EditorCommand, Keymap};

/// A button added to the editor's toolbar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorButton {
    pub id: &'static str,
    pub label: &'static str,
    pub tooltip: String,
    pub command: EditorCommand,
}

/// Buttons for one editor instance, tooltips naming the bound chord
pub fn setup_editor_buttons(keymap: &Keymap) -> Vec<EditorButton> {
    [
        ("OlCloze", "[.]]", EditorCommand::GenerateClozes),
        ("OlOptions", "[O]", EditorCommand::NoteSettings),
        ("RemoveClozes", "rc", EditorCommand::RemoveClozes),
    ]
    .into_iter()
    .map(|(id, label, command)| {
        let tooltip = match keymap.chord_for(command) {
            Some(chord) => format!("{} ({})", command.description(), chord),
            None => command.description().to_string(),
        };
        EditorButton {
            id,
            label,
            tooltip,
            command,
        }
    })
    .collect()
}
