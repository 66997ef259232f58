//! Vessel state and the per-(mode, craft) parameter table (§3 "Vessel",
//! "Vessel-parameter table"). Mode is a tagged enum selected by pattern
//! match, per the polymorphism design note in §9, rather than the source's
//! string/int dispatch.

use serde::Serialize;

use crate::error::{CoreError, CoreResult};
use crate::geodesy::LonLat;
use crate::route::Route;

/// Leeway coefficients shared by drift and paddling craft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftParams {
    /// Leeway speed coefficient, knots.
    pub sl: f64,
    /// Leeway zero-offset, knots.
    pub yt: f64,
    /// Deflection angle, degrees.
    pub da: f64,
}

/// Craft id 7 carries no `Sl`/`Yt`/`Da`; it uses the discrete Levison
/// leeway table instead (§4.4.2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevisonDriftParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaddlingParams {
    pub drift: DriftParams,
    /// Paddling speed, m/s.
    pub speed_ms: f64,
}

/// Wind-fraction polar coefficients by wind-relative bearing band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SailingParams {
    /// Max tacking angle, degrees.
    pub mt: f64,
    pub wf_0_40: f64,
    pub wf_40_80: f64,
    pub wf_80_100: f64,
    pub wf_100_110: f64,
    pub wf_110_120: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Drift(DriftParams),
    DriftLevison(LevisonDriftParams),
    Paddling(PaddlingParams),
    Sailing(SailingParams),
}

/// A single `(mode, craft_id)` row of the vessel parameter table, as loaded
/// verbatim from the caller's configuration (§6).
#[derive(Debug, Clone)]
pub struct VesselParams {
    pub craft_id: u32,
    pub mode: Mode,
}

impl VesselParams {
    /// Craft id 7 is special-cased in drift mode to use the discrete
    /// Levison leeway curve (§3, §4.4.2).
    pub fn drift(craft_id: u32, sl: f64, yt: f64, da: f64) -> Self {
        if craft_id == 7 {
            Self { craft_id, mode: Mode::DriftLevison(LevisonDriftParams) }
        } else {
            Self { craft_id, mode: Mode::Drift(DriftParams { sl, yt, da }) }
        }
    }

    pub fn paddling(craft_id: u32, sl: f64, yt: f64, da: f64, speed_ms: f64) -> Self {
        Self {
            craft_id,
            mode: Mode::Paddling(PaddlingParams { drift: DriftParams { sl, yt, da }, speed_ms }),
        }
    }

    pub fn sailing(craft_id: u32, params: SailingParams) -> Self {
        Self { craft_id, mode: Mode::Sailing(params) }
    }
}

/// Termination cause recorded on a frozen vessel (§4.5, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCause {
    Landfall,
    Arrived,
    TimeExhausted,
    /// A displacement or position became non-finite; the vessel was aborted
    /// rather than allowed to propagate a NaN trajectory (§7, §12).
    InvalidValue,
}

/// Per-vessel running state. Created at launch, mutated only by the
/// integrator, frozen on termination.
#[derive(Debug, Clone)]
pub struct Vessel {
    pub position: LonLat,
    pub params: VesselParams,
    pub route: Route,
    pub target: LonLat,
    pub trajectory: Vec<LonLat>,
    pub distance_km: f64,
    pub mean_speed_kmh: f64,
    pub termination: Option<TerminationCause>,
}

impl Vessel {
    /// Creates a vessel at `departure`, popping the first target off
    /// `route`. A route must be non-empty at creation (§3 invariant).
    pub fn launch(departure: LonLat, params: VesselParams, mut route: Route) -> CoreResult<Self> {
        if route.is_empty() {
            return Err(CoreError::Routing("route must be non-empty at vessel creation".into()));
        }
        let target = route
            .pop()
            .ok_or_else(|| CoreError::Routing("route must be non-empty at vessel creation".into()))?;

        Ok(Self {
            position: departure,
            params,
            route,
            target,
            trajectory: vec![departure],
            distance_km: 0.0,
            mean_speed_kmh: 0.0,
            termination: None,
        })
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::NavigationGrid;
    use ndarray::Array2;

    fn trivial_route() -> Route {
        let land = Array2::from_elem((3, 3), false);
        let grid = NavigationGrid::from_land_mask(&land, &[]);
        let longitude = vec![0.0, 1.0, 2.0];
        let latitude = vec![0.0, 1.0, 2.0];
        Route::plan(&grid, (0, 0), (2, 2), &longitude, &latitude, 1).unwrap()
    }

    #[test]
    fn launch_pops_first_target_and_seeds_trajectory() {
        let route = trivial_route();
        let params = VesselParams::drift(1, 0.03, 0.0, 0.0);
        let vessel = Vessel::launch(LonLat::new(0.0, 0.0), params, route).unwrap();
        assert_eq!(vessel.trajectory.len(), 1);
        assert_eq!(vessel.trajectory[0], LonLat::new(0.0, 0.0));
        assert!(!vessel.is_terminated());
    }

    #[test]
    fn craft_seven_selects_levison_mode() {
        let params = VesselParams::drift(7, 0.03, 0.0, 0.0);
        assert!(matches!(params.mode, Mode::DriftLevison(_)));
    }

    #[test]
    fn launch_rejects_empty_route() {
        let route = Route::from_cell_path(&[(0, 0)], &[0.0], &[0.0], 1).unwrap();
        let mut route = route;
        route.pop();
        let params = VesselParams::drift(1, 0.03, 0.0, 0.0);
        let result = Vessel::launch(LonLat::new(0.0, 0.0), params, route);
        assert!(result.is_err());
    }
}
