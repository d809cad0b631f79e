use std::collections::VecDeque;

use algoview_core::{CellUpdate, GridGeometry, Progress, StateCode};
use tracing::{debug, trace};

use crate::{restore_endpoints, trace_step};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Start,
    End,
}

impl Side {
    const fn other(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    const fn slot(self) -> usize {
        match self {
            Self::Start => 0,
            Self::End => 1,
        }
    }

    const fn discovered(self) -> StateCode {
        match self {
            Self::Start => StateCode::DiscoveredA,
            Self::End => StateCode::DiscoveredB,
        }
    }

    const fn processed(self) -> StateCode {
        match self {
            Self::Start => StateCode::ProcessedA,
            Self::End => StateCode::ProcessedB,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Search,
    Backtrack {
        toward_start: Option<usize>,
        toward_end: Option<usize>,
    },
    Restore,
    Done,
}

/// Per-side bookkeeping of one breadth-first frontier.
#[derive(Clone, Debug)]
struct Frontier {
    origin: usize,
    queue: VecDeque<usize>,
    parent: Vec<Option<usize>>,
    /// Every cell this side owns, in discovery order.
    claimed: Vec<usize>,
}

/// Breadth-first search growing alternately from the start and the end.
///
/// Each resume expands a single node from one side, flipping sides between
/// resumes. The frontiers own their cells exclusively, so the first time a
/// side reaches a cell owned by the other the two trees touch. At that point
/// the whole contact boundary is inspected and the shortest joining edge wins,
/// which keeps the reported path as short as a plain breadth-first search.
#[derive(Clone, Debug)]
pub struct BidirectionalBfs {
    geometry: GridGeometry,
    start: usize,
    end: usize,
    code: Vec<StateCode>,
    owner: Vec<Option<Side>>,
    depth: Vec<u32>,
    frontiers: [Frontier; 2],
    turn: Side,
    phase: Phase,
    steps: u64,
}

impl BidirectionalBfs {
    /// Binds a new search to a snapshot of the grid's state codes.
    #[must_use]
    pub fn new(geometry: GridGeometry, start: usize, end: usize, code: Vec<StateCode>) -> Self {
        let size = code.len();
        let mut owner = vec![None; size];
        owner[start] = Some(Side::Start);
        owner[end] = Some(Side::End);

        let frontier = |origin: usize| Frontier {
            origin,
            queue: VecDeque::from([origin]),
            parent: vec![None; size],
            claimed: vec![origin],
        };

        Self {
            geometry,
            start,
            end,
            code,
            owner,
            depth: vec![0; size],
            frontiers: [frontier(start), frontier(end)],
            turn: Side::Start,
            phase: Phase::Search,
            steps: 0,
        }
    }

    /// Resumes the search once, appending every emitted update to `out`.
    pub fn step(&mut self, out: &mut Vec<CellUpdate>) -> Progress {
        loop {
            match self.phase {
                Phase::Search => {
                    let side = self.turn;
                    self.turn = side.other();
                    let Some(current) = self.frontiers[side.slot()].queue.pop_front() else {
                        debug!(?side, "bidirectional frontier exhausted");
                        self.phase = Phase::Restore;
                        continue;
                    };
                    self.expand(side, current, out);
                    break;
                }
                Phase::Backtrack {
                    toward_start,
                    toward_end,
                } => {
                    let start_origin = self.frontiers[Side::Start.slot()].origin;
                    let end_origin = self.frontiers[Side::End.slot()].origin;
                    let before = out.len();
                    let toward_start = toward_start.and_then(|cell| {
                        trace_step(
                            &self.frontiers[Side::Start.slot()].parent,
                            start_origin,
                            cell,
                            out,
                        )
                    });
                    let toward_end = toward_end.and_then(|cell| {
                        trace_step(
                            &self.frontiers[Side::End.slot()].parent,
                            end_origin,
                            cell,
                            out,
                        )
                    });

                    if toward_start.is_none() && toward_end.is_none() {
                        self.phase = Phase::Restore;
                        if out.len() == before {
                            continue;
                        }
                    } else {
                        self.phase = Phase::Backtrack {
                            toward_start,
                            toward_end,
                        };
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

    fn expand(&mut self, side: Side, current: usize, out: &mut Vec<CellUpdate>) {
        let neighbors: Vec<usize> = self
            .geometry
            .neighbors4(current)
            .filter(|neighbor| self.code[*neighbor].is_walkable())
            .collect();

        for neighbor in neighbors {
            match self.owner[neighbor] {
                Some(owner) if owner == side => continue,
                Some(_) => {
                    self.meet(side, current, neighbor);
                    return;
                }
                None => {}
            }

            self.owner[neighbor] = Some(side);
            self.depth[neighbor] = self.depth[current] + 1;
            let frontier = &mut self.frontiers[side.slot()];
            frontier.parent[neighbor] = Some(current);
            frontier.queue.push_back(neighbor);
            frontier.claimed.push(neighbor);

            if !self.code[neighbor].is_reserved() {
                out.push(CellUpdate::Paint {
                    index: neighbor,
                    state: side.discovered(),
                });
            }
        }

        if !self.code[current].is_reserved() {
            out.push(CellUpdate::Paint {
                index: current,
                state: side.processed(),
            });
        }
    }

    /// Picks the shortest edge joining the two trees and starts tracing it.
    fn meet(&mut self, side: Side, current: usize, contact: usize) {
        let (mut best_start, mut best_end) = match side {
            Side::Start => (current, contact),
            Side::End => (contact, current),
        };
        let mut best = self.depth[best_start] + 1 + self.depth[best_end];

        for &cell in &self.frontiers[Side::Start.slot()].claimed {
            for neighbor in self.geometry.neighbors4(cell) {
                if self.owner[neighbor] != Some(Side::End) {
                    continue;
                }
                let length = self.depth[cell] + 1 + self.depth[neighbor];
                if length < best {
                    best = length;
                    best_start = cell;
                    best_end = neighbor;
                }
            }
        }

        trace!(
            meeting_start = best_start,
            meeting_end = best_end,
            edges = best,
            "frontiers met"
        );
        self.phase = Phase::Backtrack {
            toward_start: Some(best_start),
            toward_end: Some(best_end),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(search: &mut BidirectionalBfs) -> Vec<CellUpdate> {
        let mut updates = Vec::new();
        let mut guard = 0;
        while search.step(&mut updates) == Progress::Advanced {
            guard += 1;
            assert!(guard < 10_000, "bidirectional search failed to terminate");
        }
        updates
    }

    #[test]
    fn corridor_meets_in_the_middle() {
        // S . . . E
        let geometry = GridGeometry::new(5, 1);
        let mut code = vec![StateCode::Open; 5];
        code[0] = StateCode::Start;
        code[4] = StateCode::End;
        let mut search = BidirectionalBfs::new(geometry, 0, 4, code);
        let updates = run(&mut search);

        let mut path: Vec<usize> = updates
            .iter()
            .filter(|update| update.state() == StateCode::Path)
            .map(CellUpdate::index)
            .collect();
        path.sort_unstable();
        assert_eq!(path, vec![1, 2, 3]);

        let tail: Vec<(usize, StateCode)> = updates
            .iter()
            .rev()
            .take(2)
            .map(|update| (update.index(), update.state()))
            .collect();
        assert_eq!(tail, vec![(4, StateCode::End), (0, StateCode::Start)]);
    }

    #[test]
    fn sides_alternate_between_resumes() {
        // S . . . E
        let geometry = GridGeometry::new(5, 1);
        let mut code = vec![StateCode::Open; 5];
        code[0] = StateCode::Start;
        code[4] = StateCode::End;
        let mut search = BidirectionalBfs::new(geometry, 0, 4, code);

        let mut updates = Vec::new();
        assert_eq!(search.step(&mut updates), Progress::Advanced);
        assert_eq!(
            updates,
            vec![CellUpdate::Paint {
                index: 1,
                state: StateCode::DiscoveredA
            }]
        );

        updates.clear();
        assert_eq!(search.step(&mut updates), Progress::Advanced);
        assert_eq!(
            updates,
            vec![CellUpdate::Paint {
                index: 3,
                state: StateCode::DiscoveredB
            }]
        );
    }

    #[test]
    fn adjacent_endpoints_emit_only_the_restore_pair() {
        let geometry = GridGeometry::new(2, 1);
        let code = vec![StateCode::Start, StateCode::End];
        let mut search = BidirectionalBfs::new(geometry, 0, 1, code);

        let updates = run(&mut search);
        assert_eq!(
            updates,
            vec![
                CellUpdate::Paint {
                    index: 0,
                    state: StateCode::Start
                },
                CellUpdate::Paint {
                    index: 1,
                    state: StateCode::End
                },
            ]
        );
    }

    #[test]
    fn claimed_cells_match_ownership() {
        let geometry = GridGeometry::new(6, 4);
        let mut code = vec![StateCode::Open; 24];
        code[6] = StateCode::Start;
        code[11] = StateCode::End;
        let mut search = BidirectionalBfs::new(geometry, 6, 11, code);
        let _ = run(&mut search);

        for side in [Side::Start, Side::End] {
            let mut claimed = search.frontiers[side.slot()].claimed.clone();
            claimed.sort_unstable();
            let owned: Vec<usize> = (0..24)
                .filter(|cell| search.owner[*cell] == Some(side))
                .collect();
            assert_eq!(claimed, owned, "{side:?} lost track of its cells");
        }
    }

    #[test]
    fn enclosed_start_reports_no_path() {
        // S # . E
        let geometry = GridGeometry::new(4, 1);
        let code = vec![
            StateCode::Start,
            StateCode::Wall,
            StateCode::Open,
            StateCode::End,
        ];
        let mut search = BidirectionalBfs::new(geometry, 0, 3, code);
        let updates = run(&mut search);

        assert!(updates
            .iter()
            .all(|update| update.state() != StateCode::Path));
        assert_eq!(
            updates.last(),
            Some(&CellUpdate::Paint {
                index: 3,
                state: StateCode::End
            })
        );
    }
}
