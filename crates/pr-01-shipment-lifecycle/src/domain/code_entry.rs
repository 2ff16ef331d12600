//! Four single-digit slots with auto-advancing focus.
//!
//! Typing into a slot moves focus to the next one. Erasing an empty slot
//! retreats and clears the previous slot, the way a backspace does.

use std::fmt;

use super::entities::CODE_LENGTH;
use super::errors::CodeEntryError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeEntry {
    slots: [Option<char>; CODE_LENGTH],
    focus: usize,
}

impl CodeEntry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot that receives the next digit.
    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn slot(&self, slot: usize) -> Option<char> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// The entered code, once every slot is filled.
    pub fn code(&self) -> Option<String> {
        self.slots.iter().copied().collect()
    }

    /// Put `ch` into `slot` and advance focus.
    ///
    /// Returns `true` when this filled the last empty slot.
    pub fn enter(&mut self, slot: usize, ch: char) -> Result<bool, CodeEntryError> {
        self.check_slot(slot)?;
        if !ch.is_ascii_digit() {
            return Err(CodeEntryError::NotADigit(ch));
        }
        self.slots[slot] = Some(ch);
        self.focus = (slot + 1).min(CODE_LENGTH - 1);
        Ok(self.is_complete())
    }

    /// Backspace on `slot`.
    ///
    /// A filled slot is cleared in place. An empty slot moves focus back and
    /// clears the previous slot.
    pub fn erase(&mut self, slot: usize) -> Result<(), CodeEntryError> {
        self.check_slot(slot)?;
        if self.slots[slot].is_some() {
            self.slots[slot] = None;
            self.focus = slot;
        } else if slot > 0 {
            self.slots[slot - 1] = None;
            self.focus = slot - 1;
        } else {
            self.focus = 0;
        }
        Ok(())
    }

    /// Replace the whole entry with `code`.
    ///
    /// The entry is left untouched if `code` is not exactly four digits.
    pub fn fill(&mut self, code: &str) -> Result<(), CodeEntryError> {
        let digits: Vec<char> = code.trim().chars().collect();
        if digits.len() != CODE_LENGTH || !digits.iter().all(char::is_ascii_digit) {
            return Err(CodeEntryError::MalformedCode {
                expected: CODE_LENGTH,
                actual: code.to_string(),
            });
        }
        for (slot, digit) in self.slots.iter_mut().zip(digits) {
            *slot = Some(digit);
        }
        self.focus = CODE_LENGTH - 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn check_slot(&self, slot: usize) -> Result<(), CodeEntryError> {
        if slot >= CODE_LENGTH {
            return Err(CodeEntryError::SlotOutOfRange {
                slot,
                len: CODE_LENGTH,
            });
        }
        Ok(())
    }
}

impl fmt::Display for CodeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match slot {
                Some(d) => write!(f, "{d}")?,
                None => f.write_str("_")?,
            }
        }
        Ok(())
    }
}
