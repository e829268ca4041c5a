//! In-memory note collection of the terminal host.
//!
//! Stands in for the host application's database: assigns ids, creates
//! one card per native cloze index and keeps suspension state.

use std::collections::BTreeSet;

use anyhow::{anyhow, Result};

use crate::cloze::{indices, MarkerFamily};
use crate::note::{Card, CardId, Note};

#[derive(Debug)]
pub struct Collection {
    notes: Vec<Note>,
    next_note_id: i64,
    next_card_id: i64,
}

impl Collection {
    pub fn new() -> Self {
        Self {
            notes: Vec::new(),
            next_note_id: 1,
            next_card_id: 1,
        }
    }

    /// Give a new note its id and cards. Fails when the note has no
    /// cloze deletion to make a card from.
    pub fn prepare(&mut self, note: &mut Note) -> Result<()> {
        let cards = self.cards_for(note, &[])?;
        note.id = Some(self.next_note_id);
        self.next_note_id += 1;
        note.set_cards(cards);
        Ok(())
    }

    /// Store a prepared note
    pub fn insert(&mut self, note: &Note) -> Result<()> {
        if note.id.is_none() {
            return Err(anyhow!("Note has not been prepared"));
        }
        self.notes.push(note.clone());
        tracing::info!(
            "Added note {:?} with {} cards",
            note.id,
            note.cards().len()
        );
        Ok(())
    }

    /// Write back an edited note, keeping the cards that still exist
    pub fn update(&mut self, note: &mut Note) -> Result<()> {
        let id = note.id.ok_or_else(|| anyhow!("Note is not in the collection"))?;
        let position = self
            .notes
            .iter()
            .position(|stored| stored.id == Some(id))
            .ok_or_else(|| anyhow!("Note {} is not in the collection", id))?;

        let existing = self.notes[position].cards().to_vec();
        let cards = self.cards_for(note, &existing)?;
        note.set_cards(cards);
        self.notes[position] = note.clone();
        tracing::info!("Updated note {}", id);
        Ok(())
    }

    pub fn suspend(&mut self, ids: &[CardId]) {
        for card in self
            .notes
            .iter_mut()
            .flat_map(|note| note.cards_mut().iter_mut())
        {
            if ids.contains(&card.id) {
                card.suspended = true;
            }
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn last_note(&self) -> Option<&Note> {
        self.notes.last()
    }

    /// One card per distinct native cloze index, ordinal `index - 1`
    fn cards_for(&mut self, note: &Note, existing: &[Card]) -> Result<Vec<Card>> {
        let ords: BTreeSet<usize> = note
            .values()
            .flat_map(|value| indices(MarkerFamily::Native, value))
            .map(|index| index.saturating_sub(1) as usize)
            .collect();
        if ords.is_empty() {
            return Err(anyhow!("The note has no cloze deletions"));
        }

        let cards = ords
            .into_iter()
            .map(|ord| match existing.iter().find(|card| card.ord == ord) {
                Some(card) => card.clone(),
                None => {
                    let card = Card::new(CardId(self.next_card_id), ord);
                    self.next_card_id += 1;
                    card
                }
            })
            .collect();
        Ok(cards)
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}
