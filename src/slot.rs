//! The six card slots and the containers keyed by them.
//!
//! A sheet always holds the same six images: front and back of the student,
//! guardian and guarantor cards. Everything downstream (input validation,
//! conversion, layout, reporting) addresses images through [`Slot`] instead of
//! a positional index, and the single table in [`Slot::grid_cell`] decides
//! where each one lands on the page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

/// Whose card an image belongs to. Declaration order is the row order on the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Holder {
    Student,
    Guardian,
    Guarantor,
}

/// Which face of the card an image shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
}

/// One of the six fixed image roles.
///
/// Declaration order is the canonical slot order: it is the order inputs are
/// validated in, so the first missing slot reported is always the earliest
/// one in this list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Slot {
    StudentFront,
    StudentBack,
    GuardianFront,
    GuardianBack,
    GuarantorFront,
    GuarantorBack,
}

impl Slot {
    /// Number of slots on a sheet.
    pub const COUNT: usize = 6;

    /// All slots in canonical order.
    pub const ALL: [Slot; Slot::COUNT] = [
        Slot::StudentFront,
        Slot::StudentBack,
        Slot::GuardianFront,
        Slot::GuardianBack,
        Slot::GuarantorFront,
        Slot::GuarantorBack,
    ];

    pub fn holder(self) -> Holder {
        match self {
            Slot::StudentFront | Slot::StudentBack => Holder::Student,
            Slot::GuardianFront | Slot::GuardianBack => Holder::Guardian,
            Slot::GuarantorFront | Slot::GuarantorBack => Holder::Guarantor,
        }
    }

    pub fn side(self) -> Side {
        match self {
            Slot::StudentFront | Slot::GuardianFront | Slot::GuarantorFront => Side::Front,
            Slot::StudentBack | Slot::GuardianBack | Slot::GuarantorBack => Side::Back,
        }
    }

    /// Human-readable name used in user-facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Slot::StudentFront => "student card (front)",
            Slot::StudentBack => "student card (back)",
            Slot::GuardianFront => "guardian card (front)",
            Slot::GuardianBack => "guardian card (back)",
            Slot::GuarantorFront => "guarantor card (front)",
            Slot::GuarantorBack => "guarantor card (back)",
        }
    }

    /// Stable short name, also used for CLI flags (`--student-front`).
    pub fn key(self) -> &'static str {
        match self {
            Slot::StudentFront => "student-front",
            Slot::StudentBack => "student-back",
            Slot::GuardianFront => "guardian-front",
            Slot::GuardianBack => "guardian-back",
            Slot::GuarantorFront => "guarantor-front",
            Slot::GuarantorBack => "guarantor-back",
        }
    }

    /// `(row, column)` of the slot on the sheet.
    ///
    /// One row per holder, top to bottom. Backs go in the left column (0),
    /// fronts in the right column (1).
    pub fn grid_cell(self) -> (usize, usize) {
        let row = match self.holder() {
            Holder::Student => 0,
            Holder::Guardian => 1,
            Holder::Guarantor => 2,
        };
        let column = match self.side() {
            Side::Back => 0,
            Side::Front => 1,
        };
        (row, column)
    }

    /// Position of the slot in [`Slot::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Exactly one `T` per slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerSlot<T>([T; Slot::COUNT]);

impl<T> PerSlot<T> {
    /// Build by calling `f` once per slot, in canonical order.
    pub fn from_fn(mut f: impl FnMut(Slot) -> T) -> Self {
        PerSlot(Slot::ALL.map(&mut f))
    }

    /// `(slot, &value)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &T)> {
        Slot::ALL.into_iter().zip(self.0.iter())
    }

    pub fn map<U>(self, mut f: impl FnMut(Slot, T) -> U) -> PerSlot<U> {
        let mut values = self.0.into_iter();
        PerSlot::from_fn(|slot| match values.next() {
            Some(value) => f(slot, value),
            None => unreachable!("backing array has one entry per slot"),
        })
    }
}

impl<T: Default> Default for PerSlot<T> {
    fn default() -> Self {
        PerSlot::from_fn(|_| T::default())
    }
}

impl<T> PerSlot<Option<T>> {
    /// The first slot (canonical order) holding `None`.
    pub fn first_missing(&self) -> Option<Slot> {
        self.iter().find(|(_, v)| v.is_none()).map(|(slot, _)| slot)
    }

    /// Unwrap every entry, or report the first empty slot.
    pub fn transpose(self) -> Result<PerSlot<T>, Slot> {
        if let Some(slot) = self.first_missing() {
            return Err(slot);
        }
        let mut values = self.0.into_iter().flatten();
        Ok(PerSlot::from_fn(|_| {
            values
                .next()
                .unwrap_or_else(|| unreachable!("every slot checked for Some above"))
        }))
    }
}

impl<T> Index<Slot> for PerSlot<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        &self.0[slot.index()]
    }
}

impl<T> IndexMut<Slot> for PerSlot<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        &mut self.0[slot.index()]
    }
}
