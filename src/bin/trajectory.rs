//! Illustrative CLI entry point (§6 "CLI surface"; not part of the core).
//! Wires together a tiny synthetic chart and runs a single vessel, mirroring
//! the uniform-east-current drift scenario from the test design (§8.1).

use chrono::NaiveDate;
use ndarray::Array3;
use ocean_trajectory::chart::Chart;
use ocean_trajectory::config::BoundingBox;
use ocean_trajectory::field::Field;
use ocean_trajectory::geodesy::LonLat;
use ocean_trajectory::integrator::IntegratorParams;
use ocean_trajectory::traverser::{self, LaunchPoint};
use ocean_trajectory::vessel::VesselParams;

fn flat_field(value: f64, t: usize, lon: &[f64], lat: &[f64]) -> Field {
    let values = Array3::from_elem((t, lat.len(), lon.len()), value);
    Field::new(values, (0..t).map(|i| i as f64).collect(), lon.to_vec(), lat.to_vec())
        .expect("synthetic demo field is well-formed")
}

fn main() {
    env_logger::builder().filter_level(log::LevelFilter::Info).init();
    println!("--- Ocean Trajectory CLI Debugger ---");

    let longitude: Vec<f64> = (0..11).map(|i| i as f64).collect();
    let latitude: Vec<f64> = (0..11).map(|i| i as f64).collect();

    let u_current = flat_field(0.1, 2, &longitude, &latitude);
    let v_current = flat_field(0.0, 2, &longitude, &latitude);
    let u_wind = flat_field(0.0, 2, &longitude, &latitude);
    let v_wind = flat_field(0.0, 2, &longitude, &latitude);

    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0).expect("valid bbox");
    let start_date = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let chart = Chart::new(bbox, start_date, u_current, v_current, u_wind, v_wind, &[(5.0, 2), (1.5, 4)]);

    let departures = vec![LaunchPoint {
        position: LonLat::new(1.0, 5.0),
        destination: LonLat::new(9.0, 5.0),
        params: VesselParams::drift(1, 0.03, 0.0, 0.0),
        replicate: 1,
    }];

    let integrator_params = IntegratorParams { dt: 3600.0, duration_days: 1.0, sigma: 0.0, tolerance: 1e-6 };

    let results = traverser::run(&chart, &departures, start_date, start_date, 1, integrator_params, 1);

    for (launch_date, day) in &results {
        println!("Launch day {launch_date}: {} trajectories, {} skipped", day.trajectories.len(), day.skipped.len());
        for record in &day.trajectories {
            println!(
                "  termination={:?} distance={:.2}km mean_speed={:.2}km/h points={}",
                record.termination,
                record.distance_km,
                record.mean_speed_kmh,
                record.coordinates.len()
            );
        }
        for skip in &day.skipped {
            println!("  skipped departure={:?}: {}", skip.departure, skip.reason);
        }
    }
}
