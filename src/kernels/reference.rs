//! Unblocked, unvectorized, single-threaded oracle.
//!
//! Worst-case cache behavior by design: vertical neighbors are read with an
//! N-element stride straight from the grid. Every optimized kernel is
//! certified against this one.

use crate::grid::AlignedGrid;
use crate::kernels::Window;

/// Replace every cell of `grid` with its clipped local mean, reading only
/// pre-call values.
pub fn compute(grid: &mut AlignedGrid, k: usize) {
    let n = grid.n();
    let mut tmp = grid.new_like();
    {
        let src = grid.as_slice();
        let out = tmp.as_mut_slice();

        for x in 0..n {
            for y in 0..n {
                let w = Window::new(n, k, x, y);
                let mut sum = 0.0f32;

                for i in w.left..=w.right {
                    if i != y {
                        sum += src[x * n + i];
                    }
                }
                for i in w.bottom..=w.upper {
                    if i != x {
                        sum += src[i * n + y];
                    }
                }

                let count = w.neighbor_count();
                out[x * n + y] = if count == 0 {
                    src[x * n + y] // K = 0: empty neighborhood, identity
                } else {
                    sum / count as f32
                };
            }
        }
    }

    grid.as_mut_slice().copy_from_slice(tmp.as_slice());
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4×4 grid with cell (x, y) = 4x + y.
    fn ramp_grid() -> AlignedGrid {
        let mut grid = AlignedGrid::zeroed(4).unwrap();
        for (i, cell) in grid.as_mut_slice().iter_mut().enumerate() {
            *cell = i as f32;
        }
        grid
    }

    #[test]
    fn hand_computed_4x4_radius_1() {
        let mut grid = ramp_grid();
        compute(&mut grid, 1);

        // Worked out by hand from the ramp values: corners average 2
        // neighbors, edges 3, interior cells 4.
        #[rustfmt::skip]
        let expected: [f32; 16] = [
            2.5,       7.0 / 3.0, 10.0 / 3.0, 4.5,
            13.0 / 3.0, 5.0,      6.0,        20.0 / 3.0,
            25.0 / 3.0, 9.0,      10.0,       32.0 / 3.0,
            10.5,      35.0 / 3.0, 38.0 / 3.0, 12.5,
        ];
        for (i, (&got, &want)) in grid.as_slice().iter().zip(expected.iter()).enumerate() {
            assert!(
                (got - want).abs() < 1e-5,
                "cell {i}: expected {want}, got {got}"
            );
        }
    }

    #[test]
    fn radius_zero_is_identity() {
        let mut grid = ramp_grid();
        let before = grid.as_slice().to_vec();
        compute(&mut grid, 0);
        assert_eq!(grid.as_slice(), &before[..]);
    }

    #[test]
    fn saturated_radius_averages_whole_row_and_column() {
        let n = 5;
        let mut grid = AlignedGrid::random(n, -100.0, 100.0, 9).unwrap();
        let before = grid.clone();
        compute(&mut grid, n + 10); // clipped to the full grid

        let src = before.as_slice();
        for x in 0..n {
            for y in 0..n {
                let row: f32 = (0..n).map(|i| src[x * n + i]).sum();
                let col: f32 = (0..n).map(|i| src[i * n + y]).sum();
                let center = src[x * n + y];
                let want = (row + col - 2.0 * center) / (2 * (n - 1)) as f32;
                let got = grid[(x, y)];
                // Summation order differs from the kernel's, so allow a few ulps.
                assert!((got - want).abs() < 5e-4, "cell ({x},{y})");
            }
        }
    }

    #[test]
    fn reads_only_pre_update_values() {
        // With in-place (Gauss-Seidel) updates, cell (0, 1) would see the
        // already-updated (0, 0). Check the Jacobi result instead.
        let mut grid = AlignedGrid::zeroed(2).unwrap();
        grid[(0, 0)] = 4.0;
        compute(&mut grid, 1);
        // (0,0): (0 + 0) / 2 = 0; (0,1): (4 + 0) / 2 = 2
        assert_eq!(grid[(0, 0)], 0.0);
        assert_eq!(grid[(0, 1)], 2.0);
        assert_eq!(grid[(1, 0)], 2.0);
        assert_eq!(grid[(1, 1)], 0.0);
    }
}
