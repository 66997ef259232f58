//! Fixed-step forward Euler integrator: the per-vessel state machine of
//! §4.5. Drives sampling, the displacement kernel, position advance, and
//! termination detection.

use rand::Rng;

use crate::displacement::{
    add_noise, drift_displacement, drift_displacement_levison, meters_to_km, paddling_displacement,
    sailing_displacement,
};
use crate::error::CoreError;
use crate::field::Sampleable;
use crate::geodesy::{distance_km, lonlat_from_displacement, DisplacementMode};
use crate::vessel::{Mode, TerminationCause, Vessel};

pub const SECONDS_PER_DAY: f64 = 86400.0;

/// Plain record of integrator tuning, passed by value (§9 "Cycles and
/// shared state").
#[derive(Debug, Clone, Copy)]
pub struct IntegratorParams {
    /// Fixed step, seconds.
    pub dt: f64,
    /// Total run length, days.
    pub duration_days: f64,
    /// Gaussian noise standard deviation per axis, metres.
    pub sigma: f64,
    /// Arrival tolerance, km per second of `dt` (the spec's
    /// `dt * tolerance` comparison against distance-to-target).
    pub tolerance: f64,
}

/// The four forcing fields a chart provides to the integrator, as a
/// launch-day-windowed view (§4.2); any `Sampleable` works, so the
/// integrator doesn't care whether it's a raw `Field` or a `WindowedField`.
pub struct Forcing<'a> {
    pub u_current: &'a dyn Sampleable,
    pub v_current: &'a dyn Sampleable,
    pub u_wind: &'a dyn Sampleable,
    pub v_wind: &'a dyn Sampleable,
}

/// Runs `vessel` to completion (landfall, arrival, or time exhaustion),
/// mutating it in place.
pub fn run(vessel: &mut Vessel, forcing: &Forcing, params: &IntegratorParams, rng: &mut impl Rng) {
    let mut t = 0.0f64;
    let dt_days = params.dt / SECONDS_PER_DAY;

    while t < params.duration_days {
        let lon = vessel.position.lon;
        let lat = vessel.position.lat;

        let c = (forcing.u_current.sample(t, lon, lat), forcing.v_current.sample(t, lon, lat));
        let w = (forcing.u_wind.sample(t, lon, lat), forcing.v_wind.sample(t, lon, lat));

        if c.0.is_nan() || c.1.is_nan() || w.0.is_nan() || w.1.is_nan() {
            vessel.termination = Some(TerminationCause::Landfall);
            break;
        }

        let dxy = match &vessel.params.mode {
            Mode::Drift(drift_params) => drift_displacement(c, w, *drift_params, params.dt, rng),
            Mode::DriftLevison(_) => drift_displacement_levison(c, w, params.dt),
            Mode::Paddling(paddling_params) => {
                let drift = drift_displacement(c, w, paddling_params.drift, params.dt, rng);
                paddling_displacement(vessel.position, vessel.target, drift, paddling_params.speed_ms, params.dt)
            }
            Mode::Sailing(sailing_params) => {
                sailing_displacement(c, w, vessel.position, vessel.target, *sailing_params, params.dt)
            }
        };

        let dxy = add_noise(dxy, params.sigma, rng);

        if !dxy.0.is_finite() || !dxy.1.is_finite() {
            let err = CoreError::InvalidValue(format!("non-finite displacement ({}, {})", dxy.0, dxy.1));
            log::error!("aborting vessel: {err}");
            vessel.termination = Some(TerminationCause::InvalidValue);
            break;
        }

        let (dx_km, dy_km) = meters_to_km(dxy);

        let previous = vessel.position;
        let next = lonlat_from_displacement(dx_km, dy_km, previous, DisplacementMode::GreatCircle);

        if !next.lon.is_finite() || !next.lat.is_finite() {
            let err = CoreError::InvalidValue(format!("non-finite position after update: ({}, {})", next.lon, next.lat));
            log::error!("aborting vessel: {err}");
            vessel.termination = Some(TerminationCause::InvalidValue);
            break;
        }
        vessel.position = next;

        vessel.trajectory.push(vessel.position);
        vessel.distance_km += (dx_km.powi(2) + dy_km.powi(2)).sqrt();
        let elapsed_hours = vessel.trajectory.len() as f64 * params.dt / 3600.0;
        vessel.mean_speed_kmh = vessel.distance_km / elapsed_hours;

        if distance_km(vessel.position, vessel.target) <= params.dt * params.tolerance {
            match vessel.route.pop() {
                Some(next_target) => vessel.target = next_target,
                None => {
                    vessel.termination = Some(TerminationCause::Arrived);
                    break;
                }
            }
        }

        t += dt_days;
    }

    if vessel.termination.is_none() {
        vessel.termination = Some(TerminationCause::TimeExhausted);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::grid::NavigationGrid;
    use crate::route::Route;
    use crate::vessel::VesselParams;
    use ndarray::Array3;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn uniform_field(value: f64, time_len: usize, lon: &[f64], lat: &[f64]) -> Field {
        let values = Array3::from_elem((time_len, lat.len(), lon.len()), value);
        Field::new(values, (0..time_len).map(|i| i as f64).collect(), lon.to_vec(), lat.to_vec()).unwrap()
    }

    fn simple_route(longitude: &[f64], latitude: &[f64], start: (usize, usize), goal: (usize, usize)) -> Route {
        let land = Array2::from_elem((latitude.len(), longitude.len()), false);
        let grid = NavigationGrid::from_land_mask(&land, &[]);
        Route::plan(&grid, start, goal, longitude, latitude, 1).unwrap()
    }

    struct InfiniteField;
    impl Sampleable for InfiniteField {
        fn sample(&self, _t: f64, _lon: f64, _lat: f64) -> f64 {
            f64::INFINITY
        }
    }

    #[test]
    fn uniform_east_current_drift_moves_east() {
        let longitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let u_current = uniform_field(0.1, 2, &longitude, &latitude);
        let v_current = uniform_field(0.0, 2, &longitude, &latitude);
        let u_wind = uniform_field(0.0, 2, &longitude, &latitude);
        let v_wind = uniform_field(0.0, 2, &longitude, &latitude);

        let route = simple_route(&longitude, &latitude, (1, 5), (10, 5));
        let params = VesselParams::drift(1, 0.0, 0.0, 0.0);
        let mut vessel = Vessel::launch(crate::geodesy::LonLat::new(1.0, 5.0), params, route).unwrap();

        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };
        let forcing = Forcing { u_current: &u_current, v_current: &v_current, u_wind: &u_wind, v_wind: &v_wind };
        let mut rng = StdRng::seed_from_u64(1);

        run(&mut vessel, &forcing, &integ_params, &mut rng);

        assert!(vessel.distance_km > 0.0);
        assert!(vessel.position.lon > 1.0);
        assert!((vessel.distance_km - 8.64).abs() < 0.1);
    }

    #[test]
    fn nan_current_at_start_terminates_with_single_point_trajectory() {
        let longitude = vec![0.0, 1.0];
        let latitude = vec![0.0, 1.0];
        let mut values = Array3::from_elem((2, 2, 2), 0.0);
        values[[0, 0, 0]] = f64::NAN;
        let u_current = Field::new(values, vec![0.0, 1.0], longitude.clone(), latitude.clone()).unwrap();
        let v_current = uniform_field(0.0, 2, &longitude, &latitude);
        let u_wind = uniform_field(0.0, 2, &longitude, &latitude);
        let v_wind = uniform_field(0.0, 2, &longitude, &latitude);

        let route = simple_route(&longitude, &latitude, (0, 0), (1, 1));
        let params = VesselParams::drift(1, 0.03, 0.0, 0.0);
        let mut vessel = Vessel::launch(crate::geodesy::LonLat::new(0.0, 0.0), params, route).unwrap();

        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };
        let forcing = Forcing { u_current: &u_current, v_current: &v_current, u_wind: &u_wind, v_wind: &v_wind };
        let mut rng = StdRng::seed_from_u64(1);

        run(&mut vessel, &forcing, &integ_params, &mut rng);

        assert_eq!(vessel.trajectory.len(), 1);
        assert_eq!(vessel.termination, Some(TerminationCause::Landfall));
    }

    #[test]
    fn arrival_at_departure_terminates_immediately_with_zero_distance() {
        let longitude = vec![0.0, 1.0];
        let latitude = vec![0.0, 1.0];
        let u_current = uniform_field(0.0, 2, &longitude, &latitude);
        let v_current = uniform_field(0.0, 2, &longitude, &latitude);
        let u_wind = uniform_field(0.0, 2, &longitude, &latitude);
        let v_wind = uniform_field(0.0, 2, &longitude, &latitude);

        let route = simple_route(&longitude, &latitude, (0, 0), (0, 0));
        let params = VesselParams::drift(1, 0.0, 0.0, 0.0);
        let mut vessel = Vessel::launch(crate::geodesy::LonLat::new(0.0, 0.0), params, route).unwrap();

        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1.0 };
        let forcing = Forcing { u_current: &u_current, v_current: &v_current, u_wind: &u_wind, v_wind: &v_wind };
        let mut rng = StdRng::seed_from_u64(1);

        run(&mut vessel, &forcing, &integ_params, &mut rng);

        assert_eq!(vessel.termination, Some(TerminationCause::Arrived));
        assert!(vessel.distance_km.abs() < 1e-9);
    }

    #[test]
    fn mean_speed_matches_formula_exactly() {
        let longitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let u_current = uniform_field(0.1, 2, &longitude, &latitude);
        let v_current = uniform_field(0.0, 2, &longitude, &latitude);
        let u_wind = uniform_field(0.0, 2, &longitude, &latitude);
        let v_wind = uniform_field(0.0, 2, &longitude, &latitude);

        let route = simple_route(&longitude, &latitude, (1, 5), (10, 5));
        let params = VesselParams::drift(1, 0.0, 0.0, 0.0);
        let mut vessel = Vessel::launch(crate::geodesy::LonLat::new(1.0, 5.0), params, route).unwrap();

        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };
        let forcing = Forcing { u_current: &u_current, v_current: &v_current, u_wind: &u_wind, v_wind: &v_wind };
        let mut rng = StdRng::seed_from_u64(1);

        run(&mut vessel, &forcing, &integ_params, &mut rng);

        let expected = vessel.distance_km / (vessel.trajectory.len() as f64 * integ_params.dt / 3600.0);
        assert!((vessel.mean_speed_kmh - expected).abs() < 1e-12);
    }

    #[test]
    fn non_finite_displacement_aborts_with_invalid_value() {
        let longitude = vec![0.0, 1.0];
        let latitude = vec![0.0, 1.0];
        let infinite = InfiniteField;
        let zero = uniform_field(0.0, 2, &longitude, &latitude);

        let route = simple_route(&longitude, &latitude, (0, 0), (1, 1));
        let params = VesselParams::drift(1, 0.03, 0.0, 0.0);
        let mut vessel = Vessel::launch(crate::geodesy::LonLat::new(0.0, 0.0), params, route).unwrap();

        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };
        let forcing = Forcing { u_current: &infinite, v_current: &zero, u_wind: &zero, v_wind: &zero };
        let mut rng = StdRng::seed_from_u64(1);

        run(&mut vessel, &forcing, &integ_params, &mut rng);

        assert_eq!(vessel.termination, Some(TerminationCause::InvalidValue));
        assert_eq!(vessel.trajectory.len(), 1);
    }
}
