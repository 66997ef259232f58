//! Illustrative CLI debugger for the navigation grid + A* search in
//! isolation, in the style of the project's other `src/bin/*` debuggers.

use ndarray::Array2;
use ocean_trajectory::grid::{self, NavigationGrid};
use std::time::Instant;

fn main() {
    env_logger::init();
    println!("--- Navigation Grid / A* Debugger ---");

    let width = 40;
    let height = 40;
    let mut land = Array2::from_elem((height, width), false);
    // A vertical peninsula with a single gap near the bottom.
    for y in 0..height - 3 {
        land[[y, width / 2]] = true;
    }

    let grid = NavigationGrid::from_land_mask(&land, &[(5.0, 2), (1.5, 4)]);

    let start = (2, height / 2);
    let goal = (width - 3, height / 2);

    let t0 = Instant::now();
    let result = grid::search(&grid, start, goal);
    let path = grid::reconstruct_path(&result, start, goal);
    let elapsed = t0.elapsed();

    match path {
        Some(path) => {
            println!("Path found in {:?}: {} cells", elapsed, path.len());
            println!("Cost to goal: {:.2}", result.cost[&goal]);
        }
        None => println!("No possible route from {:?} to {:?}", start, goal),
    }
}
