#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Resumable shortest-path searches over a grid snapshot.
//!
//! Every search owns a private copy of the grid's state codes and reports its
//! progress as [`CellUpdate::Paint`] values: discovered and processed markers
//! while the frontier grows, path tiles while the result is traced back, and
//! finally the start/end restore pair. A search performs at most one node
//! expansion or one path tile per call to `step`, which keeps the work per
//! resume bounded by the degree of a cell.

mod a_star;
mod bfs;
mod bidirectional;

pub use a_star::AStar;
pub use bfs::Bfs;
pub use bidirectional::BidirectionalBfs;

use algoview_core::{CellUpdate, GridGeometry, StateCode};

/// Shared lifecycle of the single-frontier searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Search,
    Backtrack(usize),
    Restore,
    Done,
}

/// Candidates a breadth-first frontier may claim from `index`.
///
/// A cell qualifies when its code is walkable (`code < 1`) and it is not the
/// start cell, which every search treats as discovered from the outset.
fn walkable_neighbors<'a>(
    geometry: GridGeometry,
    code: &'a [StateCode],
    start: usize,
    index: usize,
) -> impl Iterator<Item = usize> + 'a {
    geometry
        .neighbors4(index)
        .filter(move |neighbor| *neighbor != start && code[*neighbor].is_walkable())
}

/// Emits one path tile and returns the next cell toward `origin`.
fn trace_step(
    parent: &[Option<usize>],
    origin: usize,
    cell: usize,
    out: &mut Vec<CellUpdate>,
) -> Option<usize> {
    if cell == origin {
        return None;
    }
    out.push(CellUpdate::Paint {
        index: cell,
        state: StateCode::Path,
    });
    parent[cell]
}

fn restore_endpoints(start: usize, end: usize, out: &mut Vec<CellUpdate>) {
    out.push(CellUpdate::Paint {
        index: start,
        state: StateCode::Start,
    });
    out.push(CellUpdate::Paint {
        index: end,
        state: StateCode::End,
    });
}
