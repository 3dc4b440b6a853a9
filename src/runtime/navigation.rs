//! Sequential slide unlocking.
//!
//! Lock state is derived from the visit history rather than stored: slide
//! `i` is unlocked iff `i == 0` or slide `i - 1` has been visited.

use std::collections::BTreeSet;

use thiserror::Error;

/// Why a slide change was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NavError {
    #[error("slide {target} is locked")]
    Locked { target: usize },

    #[error("slide {target} is out of range (deck has {total} slides)")]
    OutOfRange { target: usize, total: usize },
}

/// Visit history and position of a learner in a deck.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState {
    visited: BTreeSet<usize>,
    current: usize,
    total: usize,
}

impl NavigationState {
    /// Fresh state: nothing visited, only the first slide unlocked.
    pub fn new(total: usize) -> Self {
        Self {
            visited: BTreeSet::new(),
            current: 0,
            total,
        }
    }

    /// Restore the visit history from serialized suspend data.
    ///
    /// The record must be a JSON array of non-negative integers. Anything
    /// else resets to [`NavigationState::new`]; a corrupt record means
    /// starting over, never failing. Indices beyond the deck are dropped.
    pub fn restore(total: usize, suspend_data: &str) -> Self {
        let mut state = Self::new(total);
        let record = suspend_data.trim();
        if record.is_empty() {
            return state;
        }

        match serde_json::from_str::<Vec<usize>>(record) {
            Ok(indices) => {
                let before = indices.len();
                state.visited = indices.into_iter().filter(|&i| i < total).collect();
                if state.visited.len() < before {
                    tracing::debug!(
                        dropped = before - state.visited.len(),
                        "ignored duplicate or out-of-range visited slides"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable resume record");
            }
        }
        state
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn visited(&self) -> &BTreeSet<usize> {
        &self.visited
    }

    /// Visited slides in ascending order, the form persisted as suspend data.
    pub fn visited_list(&self) -> Vec<usize> {
        self.visited.iter().copied().collect()
    }

    pub fn is_visited(&self, index: usize) -> bool {
        self.visited.contains(&index)
    }

    /// Whether slide `index` may be entered.
    pub fn is_unlocked(&self, index: usize) -> bool {
        index == 0 || self.visited.contains(&(index - 1))
    }

    /// All unlocked slide indices within the deck.
    pub fn unlocked(&self) -> Vec<usize> {
        (0..self.total).filter(|&i| self.is_unlocked(i)).collect()
    }

    /// Whether moving one slide forward is allowed.
    pub fn can_advance(&self) -> bool {
        let next = self.current + 1;
        next < self.total && self.is_unlocked(next)
    }

    /// Apply a "slide shown" event.
    ///
    /// Moving forward onto a locked slide is refused without touching the
    /// state. Moving backward or staying put is always allowed. On success
    /// `current` is marked visited, and so is `previous` if it is unlocked.
    /// A locked `previous` is one the host showed only long enough for a
    /// rejected move to be undone.
    pub fn show(&mut self, previous: Option<usize>, current: usize) -> Result<(), NavError> {
        if current >= self.total {
            return Err(NavError::OutOfRange {
                target: current,
                total: self.total,
            });
        }
        if current > self.current && !self.is_unlocked(current) {
            return Err(NavError::Locked { target: current });
        }

        if let Some(previous) = previous.filter(|&p| p < self.total && self.is_unlocked(p)) {
            self.visited.insert(previous);
        }
        self.visited.insert(current);
        self.current = current;
        Ok(())
    }
}
