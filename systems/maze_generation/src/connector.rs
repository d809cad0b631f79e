//! Post-pass that links an isolated end cell to the carved maze.

use std::collections::VecDeque;

use algoview_core::{Direction, GridGeometry, StateCode};
use tracing::warn;

use crate::{blocks_around, completes_open_block};

/// Plans the walls to open so `end` joins the maze.
///
/// Returns an empty route when `end` already touches a non-wall cell. The
/// preferred route is the shortest run of wall cells leading away from `end`
/// whose intermediate cells touch no open cell and whose last cell touches an
/// open cell without completing a 2x2 block. When no such run exists the route
/// walks straight toward `start` until it meets the maze, and [`seal`] lists
/// the cells to wall up again.
pub(crate) fn plan(
    geometry: GridGeometry,
    code: &[StateCode],
    start: usize,
    end: usize,
) -> Vec<usize> {
    if geometry.neighbors4(end).any(|cell| !code[cell].is_wall()) {
        return Vec::new();
    }

    if let Some(route) = shortest_clean_route(geometry, code, end) {
        return route;
    }

    warn!(end, "no clean connector route; walking toward start");
    straight_route(geometry, code, start, end)
}

/// Cells to wall up again once `route` is open so no 2x2 block stays open.
///
/// For every block the route completes, one of its cells outside the route is
/// walled. A candidate that keeps every open cell reachable from `start` wins;
/// otherwise the first one that keeps `end` reachable is taken.
pub(crate) fn seal(
    geometry: GridGeometry,
    code: &[StateCode],
    start: usize,
    end: usize,
    route: &[usize],
) -> Vec<usize> {
    if route.is_empty() {
        return Vec::new();
    }

    let mut code = code.to_vec();
    for &cell in route {
        code[cell] = StateCode::Open;
    }

    let mut sealed = Vec::new();
    for &cell in route {
        for block in blocks_around(geometry, cell) {
            if block.iter().any(|corner| code[*corner].is_wall()) {
                continue;
            }
            let candidates: Vec<usize> = block
                .into_iter()
                .filter(|corner| !route.contains(corner) && !code[*corner].is_reserved())
                .collect();
            let open_before = count(&reach(geometry, &code, start));

            let mut choice = None;
            let mut fallback = None;
            for &candidate in &candidates {
                code[candidate] = StateCode::Wall;
                let after = reach(geometry, &code, start);
                code[candidate] = StateCode::Open;
                if !after[end] {
                    continue;
                }
                if count(&after) + 1 == open_before {
                    choice = Some(candidate);
                    break;
                }
                if fallback.is_none() {
                    fallback = Some(candidate);
                }
            }

            match choice.or(fallback) {
                Some(candidate) => {
                    code[candidate] = StateCode::Wall;
                    sealed.push(candidate);
                }
                None => warn!(cell, "connector left an open 2x2 block"),
            }
        }
    }
    sealed
}

fn count(seen: &[bool]) -> usize {
    seen.iter().filter(|seen| **seen).count()
}

/// Non-wall cells reachable from `from`.
fn reach(geometry: GridGeometry, code: &[StateCode], from: usize) -> Vec<bool> {
    let mut seen = vec![false; geometry.size()];
    seen[from] = true;
    let mut queue = VecDeque::from([from]);
    while let Some(cell) = queue.pop_front() {
        for neighbor in geometry.neighbors4(cell) {
            if !seen[neighbor] && !code[neighbor].is_wall() {
                seen[neighbor] = true;
                queue.push_back(neighbor);
            }
        }
    }
    seen
}

fn touches_maze(geometry: GridGeometry, code: &[StateCode], cell: usize, end: usize) -> bool {
    geometry
        .neighbors4(cell)
        .any(|neighbor| neighbor != end && !code[neighbor].is_wall())
}

fn shortest_clean_route(
    geometry: GridGeometry,
    code: &[StateCode],
    end: usize,
) -> Option<Vec<usize>> {
    let mut parent: Vec<Option<usize>> = vec![None; geometry.size()];
    let mut seen = vec![false; geometry.size()];
    let mut queue = VecDeque::new();
    seen[end] = true;
    queue.push_back(end);

    while let Some(cell) = queue.pop_front() {
        for neighbor in geometry.neighbors4(cell) {
            if seen[neighbor] || !code[neighbor].is_wall() {
                continue;
            }
            seen[neighbor] = true;
            parent[neighbor] = Some(cell);

            if touches_maze(geometry, code, neighbor, end) {
                if completes_open_block(geometry, code, neighbor) {
                    continue;
                }
                return Some(unwind(&parent, neighbor, end));
            }
            queue.push_back(neighbor);
        }
    }

    None
}

fn unwind(parent: &[Option<usize>], last: usize, end: usize) -> Vec<usize> {
    let mut route = vec![last];
    let mut cursor = last;
    while let Some(previous) = parent[cursor] {
        if previous == end {
            break;
        }
        route.push(previous);
        cursor = previous;
    }
    route.reverse();
    route
}

fn straight_route(
    geometry: GridGeometry,
    code: &[StateCode],
    start: usize,
    end: usize,
) -> Vec<usize> {
    let mut route = Vec::new();
    let mut cursor = end;

    while let Some(next) = step_toward(geometry, cursor, start) {
        if next == start || !code[next].is_wall() {
            break;
        }
        route.push(next);
        if touches_maze(geometry, code, next, end) {
            break;
        }
        cursor = next;
    }

    route
}

/// Next cell on an L-shaped walk that first closes the column gap and then
/// the row gap.
fn step_toward(geometry: GridGeometry, from: usize, to: usize) -> Option<usize> {
    let (from_column, from_row) = geometry.coordinates(from)?;
    let (to_column, to_row) = geometry.coordinates(to)?;

    let direction = if from_column > to_column {
        Direction::West
    } else if from_column < to_column {
        Direction::East
    } else if from_row > to_row {
        Direction::North
    } else if from_row < to_row {
        Direction::South
    } else {
        return None;
    };
    geometry.neighbor(from, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walled(geometry: GridGeometry, start: usize, end: usize) -> Vec<StateCode> {
        let mut code = vec![StateCode::Wall; geometry.size()];
        code[start] = StateCode::Start;
        code[end] = StateCode::End;
        code
    }

    #[test]
    fn connected_end_needs_no_route() {
        let geometry = GridGeometry::new(5, 3);
        let mut code = walled(geometry, 5, 9);
        code[8] = StateCode::Open;

        assert!(plan(geometry, &code, 5, 9).is_empty());
    }

    #[test]
    fn route_walks_west_until_it_meets_the_maze() {
        let geometry = GridGeometry::new(6, 3);
        let mut code = walled(geometry, 6, 11);
        code[2] = StateCode::Open;
        code[1] = StateCode::Open;

        // 9 touches nothing open, 8 touches the open cell above it.
        assert_eq!(plan(geometry, &code, 6, 11), vec![10, 9, 8]);
    }

    #[test]
    fn route_avoids_cells_that_would_open_a_room() {
        let geometry = GridGeometry::new(4, 4);
        let mut code = walled(geometry, 4, 7);
        // Corridor wrapping around cell 6 from the west and north.
        for open in [1, 2, 5] {
            code[open] = StateCode::Open;
        }
        code[9] = StateCode::Open;

        // 6 would complete the block {1, 2, 5, 6}; 3 reaches cell 2 instead.
        let route = plan(geometry, &code, 4, 7);
        assert_eq!(route, vec![3]);
        assert!(touches_maze(geometry, &code, 3, 7));
    }

    #[test]
    fn fallback_route_walls_up_the_room_it_completes() {
        // # # . .
        // # . . #
        // S . # E
        // # # . #
        // # # . .
        let geometry = GridGeometry::new(4, 5);
        let mut code = walled(geometry, 8, 11);
        for open in [2, 3, 5, 6, 9, 14, 18, 19] {
            code[open] = StateCode::Open;
        }

        // Every neighbor of the end completes a block, so the route walks west.
        let route = plan(geometry, &code, 8, 11);
        assert_eq!(route, vec![10]);

        // Walling 6 strands 2 and 3, walling 9 strands the start.
        let sealed = seal(geometry, &code, 8, 11, &route);
        assert_eq!(sealed, vec![5]);

        code[10] = StateCode::Open;
        code[5] = StateCode::Wall;
        assert!(!completes_open_block(geometry, &code, 10));
        assert!(reach(geometry, &code, 8)[11]);
    }

    #[test]
    fn clean_routes_need_no_seal() {
        let geometry = GridGeometry::new(6, 3);
        let mut code = walled(geometry, 6, 11);
        code[2] = StateCode::Open;
        code[1] = StateCode::Open;

        let route = plan(geometry, &code, 6, 11);
        assert!(seal(geometry, &code, 6, 11, &route).is_empty());
    }

    #[test]
    fn straight_route_stops_next_to_start() {
        let geometry = GridGeometry::new(5, 1);
        let code = walled(geometry, 0, 4);

        assert_eq!(straight_route(geometry, &code, 0, 4), vec![3, 2, 1]);
    }
}
