use std::collections::VecDeque;

use algoview_core::{CellUpdate, GridGeometry, Progress, StateCode};
use tracing::debug;

use crate::{restore_endpoints, trace_step, walkable_neighbors, Phase};

/// Breadth-first search from start to end.
///
/// Discovering the end cell halts the scan of the current node immediately,
/// so siblings scanned before it keep their discovered marker while the rest
/// stay untouched and the current node is never marked processed.
#[derive(Clone, Debug)]
pub struct Bfs {
    geometry: GridGeometry,
    start: usize,
    end: usize,
    code: Vec<StateCode>,
    parent: Vec<Option<usize>>,
    queue: VecDeque<usize>,
    phase: Phase,
    steps: u64,
}

impl Bfs {
    /// Binds a new search to a snapshot of the grid's state codes.
    #[must_use]
    pub fn new(geometry: GridGeometry, start: usize, end: usize, code: Vec<StateCode>) -> Self {
        let size = code.len();
        Self {
            geometry,
            start,
            end,
            code,
            parent: vec![None; size],
            queue: VecDeque::from([start]),
            phase: Phase::Search,
            steps: 0,
        }
    }

    /// Resumes the search once, appending every emitted update to `out`.
    pub fn step(&mut self, out: &mut Vec<CellUpdate>) -> Progress {
        loop {
            match self.phase {
                Phase::Search => {
                    let Some(current) = self.queue.pop_front() else {
                        debug!(start = self.start, end = self.end, "bfs frontier exhausted");
                        self.phase = Phase::Restore;
                        continue;
                    };
                    self.expand(current, out);
                    break;
                }
                Phase::Backtrack(cell) => {
                    match trace_step(&self.parent, self.start, cell, out) {
                        Some(next) => self.phase = Phase::Backtrack(next),
                        None => {
                            self.phase = Phase::Restore;
                            if cell == self.start {
                                continue;
                            }
                        }
                    }
                    break;
                }
                Phase::Restore => {
                    restore_endpoints(self.start, self.end, out);
                    self.phase = Phase::Done;
                    break;
                }
                Phase::Done => return Progress::Exhausted,
            }
        }

        self.steps += 1;
        Progress::Advanced
    }

    /// Number of resumes that performed work.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.steps
    }

    fn expand(&mut self, current: usize, out: &mut Vec<CellUpdate>) {
        let neighbors: Vec<usize> =
            walkable_neighbors(self.geometry, &self.code, self.start, current).collect();

        for neighbor in neighbors {
            if neighbor == self.end {
                self.parent[neighbor] = Some(current);
                self.phase = Phase::Backtrack(current);
                return;
            }

            self.code[neighbor] = StateCode::DiscoveredA;
            self.parent[neighbor] = Some(current);
            self.queue.push_back(neighbor);
            out.push(CellUpdate::Paint {
                index: neighbor,
                state: StateCode::DiscoveredA,
            });
        }

        if current != self.start {
            self.code[current] = StateCode::ProcessedA;
            out.push(CellUpdate::Paint {
                index: current,
                state: StateCode::ProcessedA,
            });
        }
    }
}
