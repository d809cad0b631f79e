use std::{cmp::Reverse, collections::BinaryHeap};

use algoview_core::{CellUpdate, GridGeometry, Progress, StateCode};
use tracing::debug;

use crate::{restore_endpoints, trace_step, walkable_neighbors, Phase};

const UNREACHED: u32 = u32::MAX;

/// A* search guided by the Manhattan distance to the end cell.
///
/// The open set is a min-heap keyed by `(f, insertion order, index)`, so equal
/// estimates are expanded first-in first-out. Improved cells are pushed again
/// and the outdated heap entries are skipped when popped. The snapshot is
/// never written, so the walkable test sees the same cells as [`crate::Bfs`].
#[derive(Clone, Debug)]
pub struct AStar {
    geometry: GridGeometry,
    start: usize,
    end: usize,
    code: Vec<StateCode>,
    g_score: Vec<u32>,
    f_score: Vec<u32>,
    closed: Vec<bool>,
    parent: Vec<Option<usize>>,
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    pushed: u64,
    phase: Phase,
    steps: u64,
}

impl AStar {
    /// Binds a new search to a snapshot of the grid's state codes.
    #[must_use]
    pub fn new(geometry: GridGeometry, start: usize, end: usize, code: Vec<StateCode>) -> Self {
        let size = code.len();
        let mut search = Self {
            geometry,
            start,
            end,
            code,
            g_score: vec![UNREACHED; size],
            f_score: vec![UNREACHED; size],
            closed: vec![false; size],
            parent: vec![None; size],
            open: BinaryHeap::new(),
            pushed: 0,
            phase: Phase::Search,
            steps: 0,
        };
        search.g_score[start] = 0;
        search.f_score[start] = search.heuristic(start);
        search.push(start);
        search
    }

    /// Resumes the search once, appending every emitted update to `out`.
    pub fn step(&mut self, out: &mut Vec<CellUpdate>) -> Progress {
        loop {
            match self.phase {
                Phase::Search => {
                    let Some(current) = self.pop_live() else {
                        debug!(start = self.start, end = self.end, "a* open set exhausted");
                        self.phase = Phase::Restore;
                        continue;
                    };
                    if current == self.end {
                        match self.parent[current] {
                            Some(previous) => self.phase = Phase::Backtrack(previous),
                            None => self.phase = Phase::Restore,
                        }
                    } else {
                        self.expand(current, out);
                    }
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

    fn heuristic(&self, index: usize) -> u32 {
        self.geometry
            .manhattan(index, self.end)
            .and_then(|distance| u32::try_from(distance).ok())
            .unwrap_or(0)
    }

    fn push(&mut self, index: usize) {
        self.open
            .push(Reverse((self.f_score[index], self.pushed, index)));
        self.pushed += 1;
    }

    /// Pops the best entry that still reflects its cell's current estimate.
    fn pop_live(&mut self) -> Option<usize> {
        while let Some(Reverse((estimate, _, index))) = self.open.pop() {
            if !self.closed[index] && estimate == self.f_score[index] {
                return Some(index);
            }
        }
        None
    }

    fn expand(&mut self, current: usize, out: &mut Vec<CellUpdate>) {
        self.closed[current] = true;
        let tentative = self.g_score[current] + 1;

        let neighbors: Vec<usize> =
            walkable_neighbors(self.geometry, &self.code, self.start, current)
                .filter(|neighbor| !self.closed[*neighbor])
                .collect();

        for neighbor in neighbors {
            if tentative >= self.g_score[neighbor] {
                continue;
            }
            let first_visit = self.g_score[neighbor] == UNREACHED;
            self.g_score[neighbor] = tentative;
            self.f_score[neighbor] = tentative + self.heuristic(neighbor);
            self.parent[neighbor] = Some(current);
            self.push(neighbor);

            if first_visit && !self.code[neighbor].is_reserved() {
                out.push(CellUpdate::Paint {
                    index: neighbor,
                    state: StateCode::DiscoveredA,
                });
            }
        }

        if !self.code[current].is_reserved() {
            out.push(CellUpdate::Paint {
                index: current,
                state: StateCode::ProcessedA,
            });
        }
    }
}
