//! Section stack: nesting and numbering of document sections.
//!
//! Levels on the stack are strictly increasing. Entering a level that is not
//! deeper than the current top, or leaving a level that is not the top, is a
//! caller bug reported as `SectionMismatch` and never repaired.
//!
//! Numbered sections consume a counter at their level; entering any section
//! resets the counters of deeper levels. Unnumbered sections are skipped when
//! composing numbers, so a numbered section below an unnumbered one is
//! numbered from its numbered ancestors only.

use serde::{Deserialize, Serialize};
use tzatziki_core::{Result, TzatzikiError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionEntry {
    pub title: String,
    pub level: u8,
    pub numbered: bool,
    pub number: Option<String>,
}

#[derive(Debug, Default)]
pub struct Sections {
    stack: Vec<SectionEntry>,
    counters: Vec<u32>,
}

impl Sections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a section at `level` may be entered now
    pub fn check_enter(&self, level: u8) -> Result<()> {
        let top = self.current_level();
        if level == 0 || top.is_some_and(|top| level <= top) {
            return Err(TzatzikiError::SectionMismatch {
                expected: level,
                found: top,
            });
        }
        Ok(())
    }

    pub fn enter(&mut self, title: impl Into<String>, level: u8, numbered: bool) -> Result<&SectionEntry> {
        self.check_enter(level)?;

        let index = usize::from(level - 1);
        self.counters.resize(index + 1, 0);
        let number = if numbered {
            self.counters[index] += 1;
            let mut parts: Vec<String> = self
                .stack
                .iter()
                .filter(|entry| entry.numbered)
                .map(|entry| self.counters[usize::from(entry.level - 1)].to_string())
                .collect();
            parts.push(self.counters[index].to_string());
            Some(format!("{}.", parts.join(".")))
        } else {
            None
        };

        self.stack.push(SectionEntry {
            title: title.into(),
            level,
            numbered,
            number,
        });
        tracing::debug!(level, depth = self.stack.len(), "entered section");
        Ok(&self.stack[self.stack.len() - 1])
    }

    pub fn leave(&mut self, level: u8) -> Result<SectionEntry> {
        let top = self.current_level();
        if top != Some(level) {
            return Err(TzatzikiError::SectionMismatch {
                expected: level,
                found: top,
            });
        }
        let entry = self.stack.pop().ok_or(TzatzikiError::SectionMismatch {
            expected: level,
            found: None,
        })?;
        tracing::debug!(level, depth = self.stack.len(), "left section");
        Ok(entry)
    }

    pub fn current_level(&self) -> Option<u8> {
        self.stack.last().map(|entry| entry.level)
    }

    pub fn current(&self) -> Option<&SectionEntry> {
        self.stack.last()
    }

    /// The open level-1 section, if any
    pub fn chapter(&self) -> Option<&SectionEntry> {
        self.stack.first().filter(|entry| entry.level == 1)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}
