//! Pole relations
//!
//! A pole between an ordered pair of seats shifts one whole fan in every
//! settlement involving exactly that pair. Only whether the pair was poled
//! matters to the money; the recorded count is kept for the audit layer.

use crate::types::{Fan, PoleEdge, Position};
use serde::{Deserialize, Serialize};

/// Presence lookup over a set of pole edges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoleMatrix {
    present: [[bool; 4]; 4],
}

impl PoleMatrix {
    /// Build from edges; repeated edges and counts collapse to presence
    pub fn from_edges(edges: &[PoleEdge]) -> Self {
        let mut present = [[false; 4]; 4];
        for edge in edges {
            present[edge.from.index()][edge.to.index()] = true;
        }
        Self { present }
    }

    /// Check if `from` poled `to`
    pub fn has_pole(&self, from: Position, to: Position) -> bool {
        self.present[from.index()][to.index()]
    }

    /// Fan adjustment for the ordered pair: one fan if poled, else zero
    pub fn effect(&self, from: Position, to: Position) -> Fan {
        if self.has_pole(from, to) {
            Fan::ONE
        } else {
            Fan::ZERO
        }
    }
}

/// De-duplicated pole edge list as built up during a hand
///
/// Recording the same ordered pair again bumps its count instead of
/// appending a second edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoleEdges(Vec<PoleEdge>);

impl PoleEdges {
    /// Create empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `from` poled `to`
    ///
    /// A seat cannot pole itself; such a call leaves the list unchanged and
    /// returns `false`.
    pub fn record(&mut self, from: Position, to: Position) -> bool {
        if from == to {
            return false;
        }

        match self.0.iter_mut().find(|e| e.from == from && e.to == to) {
            Some(edge) => edge.count += 1,
            None => self.0.push(PoleEdge::new(from, to, 1)),
        }
        true
    }

    /// Remove the edge at `index`
    pub fn remove(&mut self, index: usize) -> Option<PoleEdge> {
        (index < self.0.len()).then(|| self.0.remove(index))
    }

    /// Remove all edges
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Number of distinct ordered pairs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if no pole was recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Edges in order of first appearance
    pub fn as_slice(&self) -> &[PoleEdge] {
        &self.0
    }

    /// Take the edge list
    pub fn into_vec(self) -> Vec<PoleEdge> {
        self.0
    }
}
