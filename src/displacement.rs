//! The displacement kernel (§4.4): three pure mode functions producing a
//! 2-D metric displacement `(dx, dy)` in metres for one timestep, plus
//! Gaussian noise injection. Units mix SI (m/s) and knots; conversions are
//! explicit, matching the source.

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::geodesy::{bearing, LonLat};
use crate::vessel::{DriftParams, SailingParams};

const KNOTS_PER_MS: f64 = 1.94;

fn ms_to_knots(v: f64) -> f64 {
    v * KNOTS_PER_MS
}

fn knots_to_ms(v: f64) -> f64 {
    v / KNOTS_PER_MS
}

/// Rotates a 2-D vector by `angle_rad` using the standard rotation matrix.
fn rotate(v: (f64, f64), angle_rad: f64) -> (f64, f64) {
    let (s, c) = angle_rad.sin_cos();
    (v.0 * c - v.1 * s, v.0 * s + v.1 * c)
}

/// §4.4.1 drift displacement for any craft except id 7.
pub fn drift_displacement(
    current: (f64, f64),
    wind: (f64, f64),
    params: DriftParams,
    dt: f64,
    rng: &mut impl Rng,
) -> (f64, f64) {
    let dxy_c = (current.0 * dt, current.1 * dt);

    let leeway_component = |w_ms: f64| -> f64 {
        let w_kn = ms_to_knots(w_ms);
        let leeway_kn = if w_kn.abs() > 6.0 {
            params.sl * w_kn + params.yt
        } else {
            (params.sl + params.yt / 6.0) * w_kn
        };
        knots_to_ms(leeway_kn)
    };

    let dxy_leeway = (leeway_component(wind.0) * dt, leeway_component(wind.1) * dt);

    let flip = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let dxy_deflected = rotate(dxy_leeway, (params.da * flip).to_radians());

    (dxy_deflected.0 + dxy_c.0, dxy_deflected.1 + dxy_c.1)
}

/// §4.4.2 Levison leeway table for craft id 7: component-wise piecewise
/// constant magnitude (knots) indexed by `|w|` in knots, sign restored
/// from `sign(w)`.
fn levison_leeway_knots(w_kn_abs: f64) -> f64 {
    match w_kn_abs {
        w if w < 1.0 => 0.0,
        w if w <= 3.0 => 0.5,
        w if w <= 6.0 => 1.0,
        w if w <= 10.0 => 2.0,
        w if w <= 16.0 => 3.0,
        w if w <= 21.0 => 4.5,
        w if w <= 27.0 => 6.0,
        w if w <= 33.0 => 7.0,
        w if w <= 40.0 => 6.0,
        _ => 4.5,
    }
}

/// §4.4.2 drift displacement for craft id 7.
pub fn drift_displacement_levison(current: (f64, f64), wind: (f64, f64), dt: f64) -> (f64, f64) {
    let dxy_c = (current.0 * dt, current.1 * dt);

    let leeway_component = |w_ms: f64| -> f64 {
        debug_assert!(w_ms.is_finite());
        let w_kn = ms_to_knots(w_ms);
        let magnitude_kn = levison_leeway_knots(w_kn.abs());
        knots_to_ms(magnitude_kn.copysign(w_kn))
    };

    let dxy_leeway = (leeway_component(wind.0) * dt, leeway_component(wind.1) * dt);
    (dxy_leeway.0 + dxy_c.0, dxy_leeway.1 + dxy_c.1)
}

/// §4.4.3 paddling displacement: drift displacement plus a straight push
/// toward the current target at `speed_ms`.
pub fn paddling_displacement(
    position: LonLat,
    target: LonLat,
    drift: (f64, f64),
    speed_ms: f64,
    dt: f64,
) -> (f64, f64) {
    let a = bearing(position, target).to_radians();
    let paddle = (speed_ms * dt * -a.sin(), speed_ms * dt * a.cos());
    (drift.0 + paddle.0, drift.1 + paddle.1)
}

fn wind_fraction_for_angle(b_deg: f64, params: &SailingParams) -> f64 {
    if b_deg <= 40.0 {
        params.wf_0_40
    } else if b_deg <= 80.0 {
        params.wf_40_80
    } else if b_deg <= 100.0 {
        params.wf_80_100
    } else if b_deg <= 110.0 {
        params.wf_100_110
    } else {
        params.wf_110_120
    }
}

/// §4.4.4 sailing displacement.
pub fn sailing_displacement(
    current: (f64, f64),
    wind: (f64, f64),
    position: LonLat,
    target: LonLat,
    params: SailingParams,
    dt: f64,
) -> (f64, f64) {
    let dxy_c = (current.0 * dt, current.1 * dt);

    let a = bearing(position, target).to_radians();
    let bearing_vec = (a.cos(), a.sin());

    let det = bearing_vec.0 * wind.1 - bearing_vec.1 * wind.0;
    let dot = bearing_vec.0 * wind.0 + bearing_vec.1 * wind.1;
    let b = det.atan2(dot).to_degrees().abs();

    let wf = wind_fraction_for_angle(b, &params);
    let wind_speed = (wind.0.powi(2) + wind.1.powi(2)).sqrt();
    let sailing_velocity = wf * wind_speed;

    let displacement = if b <= params.mt {
        sailing_velocity * dt
    } else {
        (b - params.mt).to_radians().cos() * sailing_velocity * dt
    };

    let dxy_sailing = (displacement * -a.sin(), displacement * a.cos());
    (dxy_sailing.0 + dxy_c.0, dxy_sailing.1 + dxy_c.1)
}

/// §4.4.5: adds independent Gaussian noise `N(0, sigma)` per axis, in
/// metres. `sigma = 0` is a legitimate degenerate case (no noise).
pub fn add_noise(dxy: (f64, f64), sigma: f64, rng: &mut impl Rng) -> (f64, f64) {
    if sigma <= 0.0 {
        return dxy;
    }
    let normal = Normal::new(0.0, sigma).expect("sigma must be finite and non-negative");
    (dxy.0 + normal.sample(rng), dxy.1 + normal.sample(rng))
}

/// Converts a metre displacement to kilometres, as fed into the great-circle
/// position update.
pub fn meters_to_km(dxy: (f64, f64)) -> (f64, f64) {
    (dxy.0 / 1000.0, dxy.1 / 1000.0)
}
