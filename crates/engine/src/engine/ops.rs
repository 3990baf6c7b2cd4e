use rand::Rng;

use super::state::{Direction, Grid};
use crate::error::GameError;

/// Cell indices along one axis, ordered so the line nearest the target wall
/// is processed first.
///
/// - Moving toward the low end of the axis (delta < 0): `1..=size-1`
///   ascending. Index 0 sits on the wall and cannot move.
/// - Moving toward the high end (delta > 0): `size-2..=0` descending.
/// - Axis unaffected by the move (delta == 0): full range, descending.
///
/// Processing wall-outward means every tile slides into already-finalized
/// space and no tile is visited twice in one turn.
#[derive(Clone, Copy)]
struct AxisOrder {
    next: isize,
    min: isize,
    max: isize,
    step: isize,
}

impl AxisOrder {
    fn new(delta: isize, size: usize) -> Self {
        let last = size as isize - 1;
        if delta < 0 {
            AxisOrder {
                next: 1,
                min: 1,
                max: last,
                step: 1,
            }
        } else if delta > 0 {
            AxisOrder {
                next: last - 1,
                min: 0,
                max: last - 1,
                step: -1,
            }
        } else {
            AxisOrder {
                next: last,
                min: 0,
                max: last,
                step: -1,
            }
        }
    }
}

impl Iterator for AxisOrder {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next < self.min || self.next > self.max {
            return None;
        }
        let current = self.next;
        self.next += self.step;
        Some(current as usize)
    }
}

/// True iff moving in `direction` would change the grid: some non-empty
/// cell has, toward the wall, a neighbor that is empty or equal-valued.
///
/// The scan ranges exclude the wall line on the moving axis, so the
/// neighbor lookup is always in bounds.
pub(crate) fn can_shift(grid: &Grid, direction: Direction) -> bool {
    let (dx, dy) = direction.vector();
    for y in AxisOrder::new(dy, grid.size()) {
        for x in AxisOrder::new(dx, grid.size()) {
            let tile = grid.get(x, y);
            if tile == 0 {
                continue;
            }
            let neighbor = grid.get((x as isize + dx) as usize, (y as isize + dy) as usize);
            if neighbor == 0 || neighbor == tile {
                return true;
            }
        }
    }
    false
}

/// True iff no direction can change the grid.
pub(crate) fn is_stuck(grid: &Grid) -> bool {
    Direction::ALL
        .iter()
        .all(|&direction| !can_shift(grid, direction))
}

/// Slide and merge every tile toward the `direction` wall. Returns the
/// score gained (the value of each merged tile, once per merge).
///
/// `merged` is the per-turn scratch set of merge-target cells, one flag per
/// cell; a cell that already received a merge this turn never merges again
/// (no chaining). Callers must check [`can_shift`] first; an infeasible
/// direction makes this a no-op returning 0.
pub(crate) fn shift(grid: &mut Grid, direction: Direction, merged: &mut [bool]) -> u64 {
    merged.fill(false);
    let (dx, dy) = direction.vector();
    let size = grid.size() as isize;
    let mut gained = 0u64;

    for y in AxisOrder::new(dy, grid.size()) {
        for x in AxisOrder::new(dx, grid.size()) {
            let tile = grid.get(x, y);
            if tile == 0 {
                continue;
            }

            // Slide toward the wall through empty cells.
            let (mut cx, mut cy) = (x as isize, y as isize);
            while in_bounds(cx + dx, cy + dy, size)
                && grid.get((cx + dx) as usize, (cy + dy) as usize) == 0
            {
                cx += dx;
                cy += dy;
            }
            if (cx, cy) != (x as isize, y as isize) {
                grid.set(cx as usize, cy as usize, tile);
                grid.set(x, y, 0);
            }

            // Merge with the neighbor beyond the landing cell, unless that
            // neighbor already absorbed a merge this turn.
            let (tx, ty) = (cx + dx, cy + dy);
            if in_bounds(tx, ty, size) && grid.get(tx as usize, ty as usize) == tile {
                let target = grid.index_of(tx as usize, ty as usize);
                if !merged[target] {
                    let doubled = tile * 2;
                    grid.set(tx as usize, ty as usize, doubled);
                    grid.set(cx as usize, cy as usize, 0);
                    gained += doubled as u64;
                    merged[target] = true;
                }
            }
        }
    }

    gained
}

#[inline]
fn in_bounds(x: isize, y: isize, size: isize) -> bool {
    x >= 0 && x < size && y >= 0 && y < size
}

/// Place one new tile in a uniformly random empty cell: 2 at 90%, 4 at 10%.
///
/// Draws an index over the empty-cell count and walks to it, so the choice
/// is uniform over empties without rejection sampling. A full grid is a
/// broken invariant and comes back as `SpawnExhausted`.
pub(crate) fn spawn_random_tile<R: Rng + ?Sized>(
    grid: &mut Grid,
    rng: &mut R,
) -> Result<(), GameError> {
    let empty = grid.count_empty();
    if empty == 0 {
        return Err(GameError::SpawnExhausted);
    }
    let mut slot = rng.gen_range(0..empty);
    let value = if rng.gen_range(0..10) < 9 { 2 } else { 4 };
    for cell in grid.cells_mut().iter_mut().filter(|c| **c == 0) {
        if slot == 0 {
            *cell = value;
            return Ok(());
        }
        slot -= 1;
    }
    Err(GameError::SpawnExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grid_from(size: usize, cells: &[u32]) -> Grid {
        assert_eq!(cells.len(), size * size);
        let mut grid = Grid::new(size);
        grid.cells_mut().copy_from_slice(cells);
        grid
    }

    fn shift_line(cells: &[u32; 4], direction: Direction) -> ([u32; 4], u64) {
        let mut grid = Grid::new(4);
        for (x, &v) in cells.iter().enumerate() {
            grid.set(x, 0, v);
        }
        let mut merged = vec![false; 16];
        let gained = shift(&mut grid, direction, &mut merged);
        let mut out = [0u32; 4];
        for (x, slot) in out.iter_mut().enumerate() {
            *slot = grid.get(x, 0);
        }
        (out, gained)
    }

    #[test]
    fn axis_order_matches_the_wall_outward_rule() {
        let collect = |delta: isize, size: usize| AxisOrder::new(delta, size).collect::<Vec<_>>();
        assert_eq!(collect(-1, 4), vec![1, 2, 3]);
        assert_eq!(collect(1, 4), vec![2, 1, 0]);
        assert_eq!(collect(0, 4), vec![3, 2, 1, 0]);
        assert_eq!(collect(-1, 2), vec![1]);
        assert_eq!(collect(1, 2), vec![0]);
    }

    #[test]
    fn slides_without_merging() {
        assert_eq!(shift_line(&[0, 0, 0, 2], Direction::Left), ([2, 0, 0, 0], 0));
        assert_eq!(shift_line(&[2, 0, 0, 0], Direction::Right), ([0, 0, 0, 2], 0));
        assert_eq!(shift_line(&[0, 2, 4, 0], Direction::Left), ([2, 4, 0, 0], 0));
        assert_eq!(shift_line(&[2, 4, 8, 16], Direction::Left), ([2, 4, 8, 16], 0));
    }

    #[test]
    fn merges_equal_neighbors_once() {
        assert_eq!(shift_line(&[2, 2, 0, 0], Direction::Left), ([4, 0, 0, 0], 4));
        assert_eq!(shift_line(&[2, 0, 0, 2], Direction::Left), ([4, 0, 0, 0], 4));
        assert_eq!(shift_line(&[2, 2, 4, 4], Direction::Left), ([4, 8, 0, 0], 12));
        assert_eq!(shift_line(&[4, 4, 4, 4], Direction::Right), ([0, 0, 8, 8], 16));
    }

    #[test]
    fn merged_tiles_never_chain() {
        // Rightmost pair merges first; the remaining 2 may not chain into
        // the fresh 4.
        assert_eq!(shift_line(&[2, 0, 2, 2], Direction::Right), ([0, 0, 2, 4], 4));
        // Same rule leftward.
        assert_eq!(shift_line(&[2, 2, 2, 0], Direction::Left), ([4, 2, 0, 0], 4));
        // [4,2,2,0] left: the 2s merge into a 4 beside the old 4, and that
        // result must not cascade into 8.
        assert_eq!(shift_line(&[4, 2, 2, 0], Direction::Left), ([4, 4, 0, 0], 4));
    }

    #[test]
    fn vertical_moves_mirror_horizontal_ones() {
        #[rustfmt::skip]
        let mut grid = grid_from(4, &[
            2, 0, 0, 4,
            2, 0, 4, 0,
            0, 2, 0, 0,
            4, 2, 4, 4,
        ]);
        let mut merged = vec![false; 16];
        let gained = shift(&mut grid, Direction::Up, &mut merged);
        // Column 0 merges 2+2 at the wall; the trailing 4 slides beneath it
        // and must not chain into the fresh 4. Columns 2 and 3 each merge
        // their 4s into an 8.
        #[rustfmt::skip]
        let expected = grid_from(4, &[
            4, 4, 8, 8,
            4, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
        ]);
        assert_eq!(grid, expected);
        assert_eq!(gained, 4 + 4 + 8 + 8);
    }

    #[test]
    fn feasibility_requires_an_empty_or_equal_neighbor() {
        #[rustfmt::skip]
        let grid = grid_from(4, &[
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 2,
        ]);
        for direction in Direction::ALL {
            assert!(!can_shift(&grid, direction), "{direction:?}");
        }
        assert!(is_stuck(&grid));

        // One equal vertical pair makes Up and Down feasible, nothing else.
        #[rustfmt::skip]
        let grid = grid_from(4, &[
            2, 4, 2, 4,
            2, 8, 4, 2,
            4, 2, 8, 4,
            8, 4, 2, 8,
        ]);
        assert!(can_shift(&grid, Direction::Up));
        assert!(can_shift(&grid, Direction::Down));
        assert!(!can_shift(&grid, Direction::Left));
        assert!(!can_shift(&grid, Direction::Right));
        assert!(!is_stuck(&grid));
    }

    #[test]
    fn feasibility_sees_empty_cells() {
        #[rustfmt::skip]
        let grid = grid_from(4, &[
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 0,
            0, 0, 0, 2,
        ]);
        assert!(can_shift(&grid, Direction::Up));
        assert!(can_shift(&grid, Direction::Left));
        // The tile already sits on both walls for Down and Right.
        assert!(!can_shift(&grid, Direction::Down));
        assert!(!can_shift(&grid, Direction::Right));
    }

    #[test]
    fn full_grid_with_a_merge_is_not_stuck() {
        #[rustfmt::skip]
        let grid = grid_from(4, &[
            2, 4, 2, 4,
            4, 2, 4, 2,
            2, 4, 2, 4,
            4, 2, 4, 4,
        ]);
        assert!(!is_stuck(&grid));
    }

    #[test]
    fn spawn_fills_exactly_one_empty_cell() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            #[rustfmt::skip]
            let mut grid = grid_from(4, &[
                2, 0, 0, 4,
                0, 8, 0, 0,
                0, 0, 16, 0,
                4, 0, 0, 2,
            ]);
            let before: Vec<u32> = grid.cells().to_vec();
            spawn_random_tile(&mut grid, &mut rng).unwrap();
            let changed: Vec<usize> = (0..16).filter(|&i| grid.cells()[i] != before[i]).collect();
            assert_eq!(changed.len(), 1);
            let idx = changed[0];
            assert_eq!(before[idx], 0);
            assert!(grid.cells()[idx] == 2 || grid.cells()[idx] == 4);
        }
    }

    #[test]
    fn spawn_eventually_fills_the_board() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut grid = Grid::new(4);
        for _ in 0..16 {
            spawn_random_tile(&mut grid, &mut rng).unwrap();
        }
        assert_eq!(grid.count_empty(), 0);
    }

    #[test]
    fn spawn_on_a_full_grid_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut grid = grid_from(2, &[2, 4, 8, 16]);
        assert_eq!(
            spawn_random_tile(&mut grid, &mut rng).unwrap_err(),
            GameError::SpawnExhausted
        );
        assert_eq!(grid.cells(), &[2, 4, 8, 16]);
    }

    #[test]
    fn shift_works_on_larger_grids() {
        #[rustfmt::skip]
        let mut grid = grid_from(5, &[
            2, 0, 2, 0, 2,
            0, 0, 0, 0, 0,
            4, 4, 0, 4, 4,
            0, 0, 0, 0, 0,
            0, 0, 0, 0, 8,
        ]);
        let mut merged = vec![false; 25];
        let gained = shift(&mut grid, Direction::Left, &mut merged);
        assert_eq!(&grid.cells()[0..5], &[4, 2, 0, 0, 0]);
        assert_eq!(&grid.cells()[10..15], &[8, 8, 0, 0, 0]);
        assert_eq!(&grid.cells()[20..25], &[8, 0, 0, 0, 0]);
        assert_eq!(gained, 4 + 8 + 8);
    }
}
