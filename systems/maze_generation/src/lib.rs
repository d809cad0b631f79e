#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resumable randomized depth-first maze generation.
//!
//! The walk keeps its own stack instead of recursing so every call to
//! [`MazeGenerator::step`] pops exactly one frame and then hands control back
//! to the caller. Carving never opens a cell that would complete a 2x2 block
//! of non-wall cells, which keeps every passage one cell wide. When the end
//! cell can only be reached by a connector that completes such a block, the
//! connector walls a cell of that block back up afterwards.

mod connector;

use std::collections::VecDeque;

use algoview_core::{CellUpdate, Direction, GridGeometry, Progress, StateCode};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Probability of exploring the arrival direction first, which favours
/// long straight corridors over constant turning.
pub const STRAIGHT_BIAS: f64 = 0.70;

/// Work reported for every cell opened by the connector post-pass.
const CONNECTOR_WORK: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Frame {
    index: usize,
    arrival: Option<Direction>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Phase {
    Carving,
    Connecting(VecDeque<CellUpdate>),
    Done,
}

/// Randomized depth-first maze carver that advances one stack frame per step.
#[derive(Clone, Debug)]
pub struct MazeGenerator {
    geometry: GridGeometry,
    start: usize,
    end: usize,
    code: Vec<StateCode>,
    visited: Vec<bool>,
    stack: Vec<Frame>,
    phase: Phase,
    rng: ChaCha8Rng,
    steps: u64,
}

impl MazeGenerator {
    /// Prepares a generator over a fully walled copy of the grid.
    ///
    /// Only the endpoints survive from the provided geometry; every other cell
    /// starts as a wall. The same `seed` always produces the same maze.
    #[must_use]
    pub fn new(geometry: GridGeometry, start: usize, end: usize, seed: u64) -> Self {
        let size = geometry.size();
        let code = (0..size)
            .map(|index| {
                if index == start {
                    StateCode::Start
                } else if index == end {
                    StateCode::End
                } else {
                    StateCode::Wall
                }
            })
            .collect();

        Self {
            geometry,
            start,
            end,
            code,
            visited: vec![false; size],
            stack: vec![Frame {
                index: start,
                arrival: None,
            }],
            phase: Phase::Carving,
            rng: ChaCha8Rng::seed_from_u64(seed),
            steps: 0,
        }
    }

    /// Resumes the walk once, appending any opened cell to `out`.
    pub fn step(&mut self, out: &mut Vec<CellUpdate>) -> Progress {
        loop {
            match &mut self.phase {
                Phase::Carving => {
                    if let Some(frame) = self.stack.pop() {
                        self.visit(frame, out);
                        break;
                    }
                    let route = connector::plan(self.geometry, &self.code, self.start, self.end);
                    let seals =
                        connector::seal(self.geometry, &self.code, self.start, self.end, &route);
                    let updates: VecDeque<CellUpdate> = route
                        .into_iter()
                        .map(|index| CellUpdate::Carve {
                            index,
                            work: CONNECTOR_WORK,
                        })
                        .chain(seals.into_iter().map(|index| CellUpdate::Paint {
                            index,
                            state: StateCode::Wall,
                        }))
                        .collect();
                    self.phase = if updates.is_empty() {
                        Phase::Done
                    } else {
                        Phase::Connecting(updates)
                    };
                }
                Phase::Connecting(updates) => {
                    let Some(update) = updates.pop_front() else {
                        self.phase = Phase::Done;
                        continue;
                    };
                    self.code[update.index()] = update.state();
                    out.push(update);
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

    /// The generator's private view of the maze.
    #[must_use]
    pub fn codes(&self) -> &[StateCode] {
        &self.code
    }

    fn visit(&mut self, frame: Frame, out: &mut Vec<CellUpdate>) {
        let current = frame.index;
        if self.visited[current] {
            return;
        }

        let reserved = self.code[current].is_reserved();
        if !reserved && completes_open_block(self.geometry, &self.code, current) {
            self.visited[current] = true;
            self.code[current] = StateCode::Wall;
            return;
        }

        let mut work = 1;
        if let Some(arrival) = frame.arrival {
            work += self.visit_flanks(current, arrival);
        }
        if !reserved {
            self.code[current] = StateCode::Open;
        }

        let mut neighbors: Vec<(usize, Direction)> = self
            .geometry
            .neighbors4(current)
            .filter(|neighbor| !self.visited[*neighbor])
            .filter_map(|neighbor| {
                self.geometry
                    .direction_between(current, neighbor)
                    .map(|direction| (neighbor, direction))
            })
            .collect();
        neighbors.shuffle(&mut self.rng);

        if let Some(arrival) = frame.arrival {
            if self.rng.gen_bool(STRAIGHT_BIAS) {
                if let Some(position) = neighbors
                    .iter()
                    .position(|(_, direction)| *direction == arrival)
                {
                    let straight = neighbors.remove(position);
                    neighbors.push(straight);
                }
            }
        }

        for (neighbor, direction) in neighbors {
            self.process_neighbor(current, neighbor, direction);
            work += 1;
        }
        self.visited[current] = true;

        if !reserved {
            out.push(CellUpdate::Carve {
                index: current,
                work,
            });
        }
    }

    /// Marks the cells beside `current` that can never be carved because the
    /// cell beside its parent on the same side is already open.
    fn visit_flanks(&mut self, current: usize, arrival: Direction) -> u32 {
        let Some(parent) = self.geometry.neighbor(current, arrival.opposite()) else {
            return 0;
        };

        let mut marked = 0;
        for side in arrival.perpendicular() {
            let (Some(parent_flank), Some(flank)) = (
                self.geometry.neighbor(parent, side),
                self.geometry.neighbor(current, side),
            ) else {
                continue;
            };
            if self.code[parent_flank].is_wall()
                || self.visited[flank]
                || self.code[flank].is_reserved()
            {
                continue;
            }
            self.visited[flank] = true;
            marked += 1;
        }
        marked
    }

    fn process_neighbor(&mut self, current: usize, neighbor: usize, direction: Direction) {
        let widens_passage = direction.perpendicular().into_iter().any(|side| {
            match (
                self.geometry.neighbor(current, side),
                self.geometry.neighbor(neighbor, side),
            ) {
                (Some(beside_current), Some(beside_neighbor)) => {
                    !self.code[beside_current].is_wall() && !self.code[beside_neighbor].is_wall()
                }
                _ => false,
            }
        });

        if widens_passage {
            self.visited[neighbor] = true;
            if !self.code[neighbor].is_reserved() {
                self.code[neighbor] = StateCode::Wall;
            }
        } else {
            self.stack.push(Frame {
                index: neighbor,
                arrival: Some(direction),
            });
        }
    }
}

/// The other three cells of every 2x2 block that has `index` as a corner.
pub(crate) fn blocks_around(
    geometry: GridGeometry,
    index: usize,
) -> impl Iterator<Item = [usize; 3]> {
    [Direction::North, Direction::South]
        .into_iter()
        .flat_map(move |vertical| {
            [Direction::West, Direction::East]
                .into_iter()
                .filter_map(move |horizontal| {
                    let above = geometry.neighbor(index, vertical)?;
                    let beside = geometry.neighbor(index, horizontal)?;
                    let diagonal = geometry.neighbor(above, horizontal)?;
                    Some([above, beside, diagonal])
                })
        })
}

/// Reports whether opening `index` would complete a 2x2 block of non-wall
/// cells.
pub(crate) fn completes_open_block(
    geometry: GridGeometry,
    code: &[StateCode],
    index: usize,
) -> bool {
    blocks_around(geometry, index).any(|block| block.iter().all(|cell| !code[*cell].is_wall()))
}
