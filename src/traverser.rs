//! The traverser: orchestrates a batch run across launch dates (§4.6, §5).
//! For each launch day it rebinds the sampler, instantiates one vessel per
//! departure point (optionally replicated), fans the integrator out across
//! a worker pool, and collects records keyed by launch day.

use std::collections::HashMap;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;

use crate::chart::Chart;
use crate::geodesy::{closest_index, LonLat};
use crate::integrator::{self, Forcing, IntegratorParams};
use crate::route::Route;
use crate::vessel::{TerminationCause, Vessel, VesselParams};

/// One configured departure: where to launch from, where to aim, and with
/// what craft/mode, optionally replicated into several independent vessels.
#[derive(Debug, Clone)]
pub struct LaunchPoint {
    pub position: LonLat,
    pub destination: LonLat,
    pub params: VesselParams,
    pub replicate: usize,
}

/// A finished vessel trajectory, ready to hand to an external GeoJSON
/// writer (§6) — `Serialize`-derived so `serde_json` can consume it at the
/// boundary without the core depending on a GeoJSON crate.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryRecord {
    pub launch_date: String,
    pub timestep_seconds: f64,
    pub coordinates: Vec<(f64, f64)>,
    pub distance_km: f64,
    pub mean_speed_kmh: f64,
    pub route: Vec<(f64, f64)>,
    pub destination: (f64, f64),
    pub termination: TerminationCause,
}

impl TrajectoryRecord {
    /// Serializes the record to JSON at the boundary (§6 "external
    /// interfaces"); the core itself never writes this anywhere.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Why a vessel was never created for a given departure (§7 "routing
/// failures... the traverser records a skip").
#[derive(Debug, Clone, Serialize)]
pub struct SkippedLaunch {
    pub launch_date: String,
    pub departure: (f64, f64),
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LaunchDayResults {
    pub trajectories: Vec<TrajectoryRecord>,
    pub skipped: Vec<SkippedLaunch>,
}

fn to_cell(point: LonLat, longitude: &[f64], latitude: &[f64]) -> (usize, usize) {
    (closest_index(longitude, point.lon), closest_index(latitude, point.lat))
}

/// Drives one launch day: plans routes, launches vessels, and runs the
/// integrator across them in parallel (§5 "Scheduling model").
fn run_launch_day(
    chart: &Chart,
    launch_date: NaiveDate,
    departures: &[LaunchPoint],
    integrator_params: IntegratorParams,
    route_downsample_interval: usize,
) -> LaunchDayResults {
    let view = chart.interpolate(launch_date);
    let date_str = launch_date.format("%Y-%m-%d").to_string();
    log::info!("launch day {date_str}: planning routes for {} departures", departures.len());

    struct PreparedVessel {
        vessel: Vessel,
        route_for_record: Vec<(f64, f64)>,
        destination: (f64, f64),
    }

    let prepared: Vec<Result<PreparedVessel, SkippedLaunch>> = departures
        .iter()
        .flat_map(|point| std::iter::repeat(point).take(point.replicate.max(1)))
        .map(|point| {
            let start_cell = to_cell(point.position, chart.u_current.longitude_axis(), chart.u_current.latitude_axis());
            let goal_cell = to_cell(point.destination, chart.u_current.longitude_axis(), chart.u_current.latitude_axis());

            let route = Route::plan(
                &chart.navigation_grid,
                start_cell,
                goal_cell,
                chart.u_current.longitude_axis(),
                chart.u_current.latitude_axis(),
                route_downsample_interval,
            );

            match route {
                Ok(route) => {
                    let route_for_record: Vec<(f64, f64)> =
                        route.as_slice().iter().map(|p| (p.lon, p.lat)).collect();
                    match Vessel::launch(point.position, point.params.clone(), route) {
                        Ok(vessel) => Ok(PreparedVessel {
                            vessel,
                            route_for_record,
                            destination: (point.destination.lon, point.destination.lat),
                        }),
                        Err(e) => Err(SkippedLaunch {
                            launch_date: date_str.clone(),
                            departure: (point.position.lon, point.position.lat),
                            reason: e.to_string(),
                        }),
                    }
                }
                Err(e) => Err(SkippedLaunch {
                    launch_date: date_str.clone(),
                    departure: (point.position.lon, point.position.lat),
                    reason: e.to_string(),
                }),
            }
        })
        .collect();

    let mut skipped = Vec::new();
    let mut ready: Vec<PreparedVessel> = Vec::new();
    for item in prepared {
        match item {
            Ok(p) => ready.push(p),
            Err(skip) => skipped.push(skip),
        }
    }
    if !skipped.is_empty() {
        log::warn!("launch day {date_str}: {} departures skipped (routing failures)", skipped.len());
    }
    log::debug!("launch day {date_str}: {} vessels ready, fanning out over worker pool", ready.len());

    let forcing = Forcing {
        u_current: &view.u_current,
        v_current: &view.v_current,
        u_wind: &view.u_wind,
        v_wind: &view.v_wind,
    };

    let trajectories: Vec<TrajectoryRecord> = ready
        .into_par_iter()
        .map(|mut prepared| {
            // Per-vessel RNG seeded from OS entropy so parallel runs are
            // decorrelated (§5 "Memory", §9 "RNG").
            let mut rng = StdRng::from_entropy();
            integrator::run(&mut prepared.vessel, &forcing, &integrator_params, &mut rng);

            TrajectoryRecord {
                launch_date: date_str.clone(),
                timestep_seconds: integrator_params.dt,
                coordinates: prepared.vessel.trajectory.iter().map(|p| (p.lon, p.lat)).collect(),
                distance_km: prepared.vessel.distance_km,
                mean_speed_kmh: prepared.vessel.mean_speed_kmh,
                route: prepared.route_for_record,
                destination: prepared.destination,
                termination: prepared.vessel.termination.unwrap(),
            }
        })
        .collect();

    log::info!("launch day {date_str}: {} trajectories complete", trajectories.len());
    LaunchDayResults { trajectories, skipped }
}

/// Drives a batch over `[start_date, end_date]` with launch stride
/// `launch_freq_days` (§4.6).
pub fn run(
    chart: &Chart,
    departures: &[LaunchPoint],
    start_date: NaiveDate,
    end_date: NaiveDate,
    launch_freq_days: i64,
    integrator_params: IntegratorParams,
    route_downsample_interval: usize,
) -> HashMap<String, LaunchDayResults> {
    log::info!("starting batch run: {start_date} to {end_date}, launch_freq_days={launch_freq_days}");
    let mut results = HashMap::new();
    let mut day = start_date;
    while day <= end_date {
        let date_str = day.format("%Y-%m-%d").to_string();
        let day_results = run_launch_day(chart, day, departures, integrator_params, route_downsample_interval);
        results.insert(date_str, day_results);
        day += chrono::Duration::days(launch_freq_days.max(1));
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoundingBox;
    use crate::field::Field;
    use ndarray::Array3;

    fn flat_field(value: f64, t: usize, lon: &[f64], lat: &[f64]) -> Field {
        let values = Array3::from_elem((t, lat.len(), lon.len()), value);
        Field::new(values, (0..t).map(|i| i as f64).collect(), lon.to_vec(), lat.to_vec()).unwrap()
    }

    fn small_chart() -> Chart {
        let longitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
        let u_current = flat_field(0.05, 2, &longitude, &latitude);
        let v_current = flat_field(0.0, 2, &longitude, &latitude);
        let u_wind = flat_field(0.0, 2, &longitude, &latitude);
        let v_wind = flat_field(0.0, 2, &longitude, &latitude);
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).unwrap();
        let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Chart::new(bbox, start_date, u_current, v_current, u_wind, v_wind, &[])
    }

    #[test]
    fn traverser_collects_one_trajectory_per_launch_day() {
        let chart = small_chart();
        let departures = vec![LaunchPoint {
            position: LonLat::new(1.0, 5.0),
            destination: LonLat::new(9.0, 5.0),
            params: VesselParams::drift(1, 0.0, 0.0, 0.0),
            replicate: 1,
        }];
        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let results = run(&chart, &departures, start, end, 1, integ_params, 1);

        assert_eq!(results.len(), 1);
        let day = &results["2024-01-01"];
        assert_eq!(day.trajectories.len(), 1);
        assert!(day.trajectories[0].coordinates.len() >= 1);
    }

    #[test]
    fn traverser_replicates_vessels_per_departure() {
        let chart = small_chart();
        let departures = vec![LaunchPoint {
            position: LonLat::new(1.0, 5.0),
            destination: LonLat::new(9.0, 5.0),
            params: VesselParams::drift(1, 0.0, 0.0, 0.0),
            replicate: 3,
        }];
        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 5000.0, tolerance: 1e-6 };

        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let results = run(&chart, &departures, start, start, 1, integ_params, 1);
        assert_eq!(results["2024-01-01"].trajectories.len(), 3);
    }

    #[test]
    fn unreachable_destination_is_skipped_not_panicked() {
        let longitude: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let latitude: Vec<f64> = (0..9).map(|i| i as f64).collect();
        let mut values = Array3::from_elem((2, 9, 9), 0.05);
        for y in 0..9 {
            values[[0, y, 4]] = f64::NAN;
            values[[1, y, 4]] = f64::NAN;
        }
        let u_current = Field::new(values, vec![0.0, 1.0], longitude.clone(), latitude.clone()).unwrap();
        let v_current = flat_field(0.0, 2, &longitude, &latitude);
        let u_wind = flat_field(0.0, 2, &longitude, &latitude);
        let v_wind = flat_field(0.0, 2, &longitude, &latitude);
        let bbox = BoundingBox::new(0.0, 0.0, 8.0, 8.0).unwrap();
        let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let chart = Chart::new(bbox, start_date, u_current, v_current, u_wind, v_wind, &[]);

        let departures = vec![LaunchPoint {
            position: LonLat::new(1.0, 4.0),
            destination: LonLat::new(7.0, 4.0),
            params: VesselParams::drift(1, 0.0, 0.0, 0.0),
            replicate: 1,
        }];
        let integ_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let results = run(&chart, &departures, start, start, 1, integ_params, 1);

        let day = &results["2024-01-01"];
        assert_eq!(day.trajectories.len(), 0);
        assert_eq!(day.skipped.len(), 1);
    }
}
