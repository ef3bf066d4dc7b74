//! Benchmark driver: runs all four kernels on identically seeded grids,
//! reports elapsed milliseconds and validates each optimized kernel against
//! the reference.

use std::process;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::Parser;

use stencil_mean::{
    local_mean_blocked, local_mean_parallel, local_mean_reference, local_mean_simd, verify_match,
    AlignedGrid, BlockedKernel, Result, DEFAULT_SEED, EPSILON,
};

/// Tile edge length used by the blocked kernels.
const BLOCK: usize = 32;

const DEFAULT_N: usize = 1024;
const DEFAULT_K: usize = 8;
const FILL_MIN: f32 = -100.0;
const FILL_MAX: f32 = 100.0;

/// Local-mean stencil benchmark.
///
/// Runs the reference, blocked, SIMD and parallel kernels on identically
/// seeded N x N grids and validates each against the reference.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Grid edge length (must be divisible by the block size)
    #[arg(value_name = "N", requires = "radius")]
    size: Option<usize>,

    /// Neighborhood radius
    #[arg(value_name = "K")]
    radius: Option<usize>,
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(-1),
            }
        }
    };

    let n = args.size.unwrap_or(DEFAULT_N);
    let k = args.radius.unwrap_or(DEFAULT_K);
    println!("N: {n}, K: {k}, B: {BLOCK}");

    // Tiling and grid-size errors are configuration errors: reject them
    // before allocating anything.
    if let Err(e) = BlockedKernel::new(n, BLOCK) {
        eprintln!("{e}");
        process::exit(-1);
    }

    let mut reference = fresh_grid(n);
    let start = Instant::now();
    local_mean_reference(&mut reference, k);
    println!("reference: {} ms", start.elapsed().as_millis());

    let variants: [(&str, fn(&mut AlignedGrid, usize, usize) -> Result<()>); 3] = [
        ("blocked", local_mean_blocked),
        ("simd", local_mean_simd),
        ("parallel", local_mean_parallel),
    ];

    let mut diverged = false;
    for (name, run) in variants {
        let mut grid = fresh_grid(n);
        let start = Instant::now();
        if let Err(e) = run(&mut grid, k, BLOCK) {
            eprintln!("{name}: {e}");
            process::exit(-1);
        }
        println!("{name}: {} ms", start.elapsed().as_millis());

        // A divergence fails the run but not the remaining kernels.
        if let Err(e) = verify_match(&reference, &grid, EPSILON) {
            eprintln!("{name}: {e}");
            diverged = true;
        }
    }

    if diverged {
        process::exit(1);
    }
}

fn fresh_grid(n: usize) -> AlignedGrid {
    match AlignedGrid::random(n, FILL_MIN, FILL_MAX, DEFAULT_SEED) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("{e}");
            process::exit(-1);
        }
    }
}
