//! The weighted navigation grid: a land-mask-derived cost raster plus an A*
//! search over it. Cell coordinates are `(x, y)` = `(lon_index, lat_index)`.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use ndarray::Array2;

/// Width/height cost raster. Walls (NaN) are impassable; every other cell
/// has a finite positive cost. The mask is constant for the grid's lifetime.
#[derive(Debug, Clone)]
pub struct NavigationGrid {
    pub width: usize,
    pub height: usize,
    weights: Array2<f64>,
}

impl NavigationGrid {
    /// Builds the grid from an instantaneous land-mask raster (NaN = land)
    /// per §4.3:
    ///   1. mask = isnan(field)
    ///   2. for each (weight, iters) pair (in order), dilate the mask by
    ///      `iters` 3x3 passes and stamp `weight` on covered cells; later
    ///      pairs overwrite earlier ones in overlapping cells.
    ///   3. reassign original land cells to NaN (walls).
    ///   4. everything else retains cost 1.
    pub fn from_land_mask(land: &Array2<bool>, contour_bands: &[(f64, usize)]) -> Self {
        let (height, width) = land.dim();
        log::debug!("building {width}x{height} navigation grid from {} contour bands", contour_bands.len());
        let mut weights = Array2::from_elem((height, width), 1.0);

        for &(weight, iters) in contour_bands {
            let dilated = dilate(land, iters);
            for ((y, x), &covered) in dilated.indexed_iter() {
                if covered {
                    weights[[y, x]] = weight;
                }
            }
        }

        let wall_count = land.iter().filter(|&&is_land| is_land).count();
        for ((y, x), &is_land) in land.indexed_iter() {
            if is_land {
                weights[[y, x]] = f64::NAN;
            }
        }

        log::info!("navigation grid ready: {width}x{height}, {wall_count} wall cells");
        Self { width, height, weights }
    }

    /// Cost of entering `(x, y)`, or `None` if it's a wall or out of bounds.
    pub fn cost(&self, x: usize, y: usize) -> Option<f64> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let w = self.weights[[y, x]];
        if w.is_nan() {
            None
        } else {
            Some(w)
        }
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.cost(x, y).is_none()
    }

    /// Set of non-wall cells.
    pub fn open_cells(&self) -> Vec<(usize, usize)> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| !self.is_wall(x, y))
            .collect()
    }
}

/// Repeats a 3x3 morphological dilation `iters` times over `mask`.
fn dilate(mask: &Array2<bool>, iters: usize) -> Array2<bool> {
    let (height, width) = mask.dim();
    let mut current = mask.clone();
    for _ in 0..iters {
        let mut next = current.clone();
        for y in 0..height {
            for x in 0..width {
                if current[[y, x]] {
                    continue;
                }
                'probe: for dy in -1i64..=1 {
                    for dx in -1i64..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let nx = x as i64 + dx;
                        let ny = y as i64 + dy;
                        if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height
                            && current[[ny as usize, nx as usize]]
                        {
                            next[[y, x]] = true;
                            break 'probe;
                        }
                    }
                }
            }
        }
        current = next;
    }
    current
}

/// Eight-connected neighborhood, in-bounds and non-wall filtered. Per §4.3's
/// tie-breaking quirk: when `(x + y)` parity is even, the enumeration order
/// is reversed; this biases path reconstruction on ties and is preserved
/// for reproducibility.
fn neighbors(grid: &NavigationGrid, x: usize, y: usize) -> Vec<(usize, usize)> {
    const OFFSETS: [(i64, i64); 8] = [
        (1, 0), (-1, 0), (0, 1), (0, -1),
        (1, 1), (-1, -1), (1, -1), (-1, 1),
    ];

    let mut offsets: Vec<(i64, i64)> = OFFSETS.to_vec();
    if (x + y) % 2 == 0 {
        offsets.reverse();
    }

    offsets
        .into_iter()
        .filter_map(|(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx >= 0 && ny >= 0 {
                let (nx, ny) = (nx as usize, ny as usize);
                if !grid.is_wall(nx, ny) {
                    return Some((nx, ny));
                }
            }
            None
        })
        .collect()
}

fn manhattan(a: (usize, usize), b: (usize, usize)) -> f64 {
    ((a.0 as i64 - b.0 as i64).abs() + (a.1 as i64 - b.1 as i64).abs()) as f64
}

#[derive(PartialEq)]
struct OpenNode {
    f: f64,
    cell: (usize, usize),
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse so the lowest f pops first.
        other.f.partial_cmp(&self.f).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of an A* search: predecessor map and accumulated-cost map, keyed
/// by visited cell.
pub struct SearchResult {
    pub predecessors: HashMap<(usize, usize), (usize, usize)>,
    pub cost: HashMap<(usize, usize), f64>,
}

/// Best-first A* over the grid, `h` = Manhattan distance, `g` accumulated
/// via stored cell cost. A node is relaxed when unseen or strictly
/// improved.
pub fn search(grid: &NavigationGrid, start: (usize, usize), goal: (usize, usize)) -> SearchResult {
    log::debug!("A* search {start:?} -> {goal:?} over {}x{} grid", grid.width, grid.height);
    let mut open = BinaryHeap::new();
    let mut g_score: HashMap<(usize, usize), f64> = HashMap::new();
    let mut predecessors = HashMap::new();

    g_score.insert(start, 0.0);
    open.push(OpenNode { f: manhattan(start, goal), cell: start });

    while let Some(OpenNode { cell: current, .. }) = open.pop() {
        if current == goal {
            break;
        }
        let current_g = g_score[&current];

        for next in neighbors(grid, current.0, current.1) {
            let step_cost = grid.cost(next.0, next.1).unwrap_or(1.0);
            let tentative_g = current_g + step_cost;
            let improved = match g_score.get(&next) {
                Some(&existing) => tentative_g < existing,
                None => true,
            };
            if improved {
                g_score.insert(next, tentative_g);
                predecessors.insert(next, current);
                let f = tentative_g + manhattan(next, goal);
                open.push(OpenNode { f, cell: next });
            }
        }
    }

    SearchResult { predecessors, cost: g_score }
}

/// Walks `predecessors` from `goal` back to `start`, returning the path in
/// start-to-goal order. `None` if the goal was never reached.
pub fn reconstruct_path(
    result: &SearchResult,
    start: (usize, usize),
    goal: (usize, usize),
) -> Option<Vec<(usize, usize)>> {
    if start == goal {
        return Some(vec![start]);
    }
    if !result.predecessors.contains_key(&goal) {
        return None;
    }

    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = result.predecessors[&current];
        path.push(current);
    }
    path.reverse();
    Some(path)
}
