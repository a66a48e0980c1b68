//! Scoring link detection
//!
//! A link is three adjacent occupied cells in one row. Rows are scanned left
//! to right and a cell that belongs to a link cannot start or join another,
//! so a full row holds at most three links.

use crate::{GridRowCells, Slot, GRID_COLUMNS};
use serde::Serialize;

/// Cells per link
pub const LINK_LENGTH: usize = 3;

/// One detected link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// First column of the link
    pub start: usize,
    /// Slot credited for each of the three cells
    pub scorers: [Option<Slot>; LINK_LENGTH],
}

/// Find the non-overlapping links in a row
pub fn find_links(row: &GridRowCells) -> Vec<Link> {
    let mut links = Vec::new();
    let mut column = 0;

    while column + LINK_LENGTH <= GRID_COLUMNS {
        let window = &row[column..column + LINK_LENGTH];
        if window.iter().all(|cell| cell.is_occupied()) {
            links.push(Link {
                start: column,
                scorers: [window[0].scorer(), window[1].scorer(), window[2].scorer()],
            });
            column += LINK_LENGTH;
        } else {
            column += 1;
        }
    }

    links
}

/// Link credit per slot, kept in thirds of a link so that sums compare
/// exactly against whole-link thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkCredit {
    thirds: [u32; 3],
}

impl LinkCredit {
    /// Credit every slot for its cells in the row's links
    pub fn for_row(row: &GridRowCells) -> Self {
        let mut credit = LinkCredit::default();
        for link in find_links(row) {
            for slot in link.scorers.into_iter().flatten() {
                credit.thirds[slot.index()] += 1;
            }
        }
        credit
    }

    pub fn add(&mut self, other: &LinkCredit) {
        for (mine, theirs) in self.thirds.iter_mut().zip(other.thirds) {
            *mine += theirs;
        }
    }

    pub fn thirds(&self, slot: Slot) -> u32 {
        self.thirds[slot.index()]
    }

    pub fn total_thirds(&self) -> u32 {
        self.thirds.iter().sum()
    }

    /// Fractional links credited to one slot
    pub fn links(&self, slot: Slot) -> f64 {
        self.thirds(slot) as f64 / LINK_LENGTH as f64
    }

    /// Fractional links across all slots
    pub fn total_links(&self) -> f64 {
        self.total_thirds() as f64 / LINK_LENGTH as f64
    }

    /// Links per slot, in slot order
    pub fn per_slot(&self) -> [f64; 3] {
        Slot::ALL.map(|slot| self.links(slot))
    }

    /// Whether the total reaches `threshold` whole links
    pub fn meets(&self, threshold: u32) -> bool {
        self.total_thirds() >= threshold * LINK_LENGTH as u32
    }
}
