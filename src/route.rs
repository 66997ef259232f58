//! Route builder: turns an A* cell path into a downsampled, reversed
//! waypoint list so that `pop()` yields the next target and the final
//! destination sits at index 0.

use crate::error::{CoreError, CoreResult};
use crate::geodesy::LonLat;
use crate::grid::{self, NavigationGrid, SearchResult};

/// An ordered waypoint list. The *last* element (`route[0]` conceptually,
/// see §3) is the final destination; `pop` yields the next target to
/// steer toward. Non-empty at creation; empty means the vessel has
/// arrived.
#[derive(Debug, Clone)]
pub struct Route {
    waypoints: Vec<LonLat>,
}

impl Route {
    /// Builds a route from a cell path by mapping cells to (lon, lat) via
    /// axis lookup, downsampling (`path[0]`, every `interval`-th of
    /// `path[1..len-1]`, and the final element), then reversing so the
    /// destination sits at index 0.
    pub fn from_cell_path(
        cell_path: &[(usize, usize)],
        longitude: &[f64],
        latitude: &[f64],
        interval: usize,
    ) -> CoreResult<Self> {
        if cell_path.is_empty() {
            return Err(CoreError::Routing("empty cell path".into()));
        }
        let to_lonlat = |(x, y): (usize, usize)| LonLat::new(longitude[x], latitude[y]);

        let mut downsampled = vec![to_lonlat(cell_path[0])];
        if cell_path.len() > 2 {
            for (i, &cell) in cell_path[1..cell_path.len() - 1].iter().enumerate() {
                if i % interval.max(1) == 0 {
                    downsampled.push(to_lonlat(cell));
                }
            }
        }
        if cell_path.len() > 1 {
            downsampled.push(to_lonlat(*cell_path.last().unwrap()));
        }

        downsampled.reverse();
        Ok(Self { waypoints: downsampled })
    }

    /// Runs A* from `start` to `goal` on `grid` and builds the downsampled,
    /// reversed route. Fails with `CoreError::Routing` if A* cannot reach
    /// the goal.
    pub fn plan(
        grid: &NavigationGrid,
        start: (usize, usize),
        goal: (usize, usize),
        longitude: &[f64],
        latitude: &[f64],
        interval: usize,
    ) -> CoreResult<Self> {
        let result: SearchResult = grid::search(grid, start, goal);
        let cell_path = grid::reconstruct_path(&result, start, goal)
            .ok_or_else(|| CoreError::Routing("no possible route".into()))?;
        Self::from_cell_path(&cell_path, longitude, latitude, interval)
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// The final destination (always `waypoints[0]` while non-empty).
    pub fn destination(&self) -> Option<LonLat> {
        self.waypoints.first().copied()
    }

    /// Pops and returns the next waypoint to steer toward.
    pub fn pop(&mut self) -> Option<LonLat> {
        self.waypoints.pop()
    }

    pub fn as_slice(&self) -> &[LonLat] {
        &self.waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn route_orientation_pops_next_and_keeps_destination_at_front() {
        let longitude: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let cell_path = vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)];
        let route = Route::from_cell_path(&cell_path, &longitude, &latitude, 1).unwrap();

        assert_eq!(route.destination(), Some(LonLat::new(0.0, 0.0)));
        let mut route = route;
        let first_pop = route.pop().unwrap();
        assert_eq!(first_pop, LonLat::new(4.0, 0.0));
    }

    #[test]
    fn route_downsamples_interior_points() {
        let longitude: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let cell_path: Vec<(usize, usize)> = (0..10).map(|i| (i, 0)).collect();
        let route = Route::from_cell_path(&cell_path, &longitude, &latitude, 3).unwrap();
        // endpoints always kept, interior sampled every 3rd.
        assert!(route.len() < cell_path.len());
        assert_eq!(route.as_slice().last(), Some(&LonLat::new(0.0, 0.0)));
        assert_eq!(route.as_slice().first(), Some(&LonLat::new(9.0, 0.0)));
    }

    #[test]
    fn plan_fails_with_routing_error_when_unreachable() {
        let mut land = Array2::from_elem((5, 5), false);
        for y in 0..5 {
            land[[y, 2]] = true;
        }
        let grid = NavigationGrid::from_land_mask(&land, &[]);
        let longitude: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..5).map(|i| i as f64).collect();
        let result = Route::plan(&grid, (0, 0), (4, 4), &longitude, &latitude, 1);
        assert!(matches!(result, Err(CoreError::Routing(_))));
    }
}
