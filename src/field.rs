//! The raster forcing sampler: wraps a time/lon/lat cube into a trilinear
//! interpolator queryable at arbitrary (day, lon, lat).

use ndarray::Array3;

use crate::error::{CoreError, CoreResult};
use crate::geodesy::closest_index;

/// A 3-D forcing field, shaped `[T, LAT, LON]`, with strictly ascending axes.
/// NaN denotes land or out-of-domain.
#[derive(Debug, Clone)]
pub struct Field {
    values: Array3<f64>,
    time: Vec<f64>,
    longitude: Vec<f64>,
    latitude: Vec<f64>,
}

fn is_strictly_ascending(axis: &[f64]) -> bool {
    axis.windows(2).all(|w| w[0] < w[1])
}

impl Field {
    /// Builds a field, checking the axis invariants from the data model:
    /// monotone axes, longitude normalized to `[-180, 180]`, latitude to
    /// `[-90, 90]`.
    pub fn new(values: Array3<f64>, time: Vec<f64>, longitude: Vec<f64>, latitude: Vec<f64>) -> CoreResult<Self> {
        let (t, lat, lon) = values.dim();
        if t != time.len() || lat != latitude.len() || lon != longitude.len() {
            return Err(CoreError::Configuration(format!(
                "field shape {:?} does not match axis lengths (t={}, lat={}, lon={})",
                values.dim(),
                time.len(),
                latitude.len(),
                longitude.len()
            )));
        }
        if !is_strictly_ascending(&time) || !is_strictly_ascending(&longitude) || !is_strictly_ascending(&latitude) {
            return Err(CoreError::Configuration("field axes must be strictly ascending".into()));
        }
        if longitude.iter().any(|&v| !(-180.0..=180.0).contains(&v)) {
            return Err(CoreError::Configuration("longitude axis out of [-180, 180]".into()));
        }
        if latitude.iter().any(|&v| !(-90.0..=90.0).contains(&v)) {
            return Err(CoreError::Configuration("latitude axis out of [-90, 90]".into()));
        }
        Ok(Self { values, time, longitude, latitude })
    }

    pub fn time_axis(&self) -> &[f64] {
        &self.time
    }

    pub fn longitude_axis(&self) -> &[f64] {
        &self.longitude
    }

    pub fn latitude_axis(&self) -> &[f64] {
        &self.latitude
    }

    /// Raw value at an exact grid node (used by boundary tests and by the
    /// navigation grid builder, which reads an instantaneous slice).
    pub fn raw(&self, t_idx: usize, lat_idx: usize, lon_idx: usize) -> f64 {
        self.values[[t_idx, lat_idx, lon_idx]]
    }

    fn in_bounds(&self, t: f64, lon: f64, lat: f64) -> bool {
        t >= self.time[0]
            && t <= *self.time.last().unwrap()
            && lon >= self.longitude[0]
            && lon <= *self.longitude.last().unwrap()
            && lat >= self.latitude[0]
            && lat <= *self.latitude.last().unwrap()
    }

    /// Trilinear interpolation over `(t, lon, lat)`. Returns NaN when any
    /// coordinate is out of the closed bounding box or any of the eight
    /// corner samples is NaN.
    pub fn sample(&self, t: f64, lon: f64, lat: f64) -> f64 {
        if !self.in_bounds(t, lon, lat) {
            return f64::NAN;
        }

        let (t0, t1, ft) = bracket(&self.time, t);
        let (x0, x1, fx) = bracket(&self.longitude, lon);
        let (y0, y1, fy) = bracket(&self.latitude, lat);

        let c000 = self.values[[t0, y0, x0]];
        let c001 = self.values[[t0, y0, x1]];
        let c010 = self.values[[t0, y1, x0]];
        let c011 = self.values[[t0, y1, x1]];
        let c100 = self.values[[t1, y0, x0]];
        let c101 = self.values[[t1, y0, x1]];
        let c110 = self.values[[t1, y1, x0]];
        let c111 = self.values[[t1, y1, x1]];

        if [c000, c001, c010, c011, c100, c101, c110, c111]
            .iter()
            .any(|v| v.is_nan())
        {
            return f64::NAN;
        }

        let c00 = c000 * (1.0 - fx) + c001 * fx;
        let c01 = c010 * (1.0 - fx) + c011 * fx;
        let c10 = c100 * (1.0 - fx) + c101 * fx;
        let c11 = c110 * (1.0 - fx) + c111 * fx;

        let c0 = c00 * (1.0 - fy) + c01 * fy;
        let c1 = c10 * (1.0 - fy) + c11 * fy;

        c0 * (1.0 - ft) + c1 * ft
    }
}

/// Finds the bracketing indices `(lo, hi)` around `value` on a strictly
/// ascending axis, plus the fractional position in `[0, 1]`. Clamps at the
/// ends (the `in_bounds` check already ruled those out for NaN).
fn bracket(axis: &[f64], value: f64) -> (usize, usize, f64) {
    if axis.len() == 1 {
        return (0, 0, 0.0);
    }
    let idx = closest_index(axis, value);
    let (lo, hi) = if axis[idx] <= value {
        (idx, (idx + 1).min(axis.len() - 1))
    } else {
        (idx.saturating_sub(1), idx)
    };
    let span = axis[hi] - axis[lo];
    let frac = if span.abs() < 1e-12 { 0.0 } else { (value - axis[lo]) / span };
    (lo, hi, frac.clamp(0.0, 1.0))
}

/// Anything a (time, lon, lat) triple can be queried against. Implemented
/// by `Field` directly and by `WindowedField` for a launch-day-shifted
/// view, so the integrator doesn't care which it's holding.
pub trait Sampleable {
    fn sample(&self, t: f64, lon: f64, lat: f64) -> f64;
}

impl Sampleable for Field {
    fn sample(&self, t: f64, lon: f64, lat: f64) -> f64 {
        Field::sample(self, t, lon, lat)
    }
}

/// A time-shifted view over a `Field`, rebound per launch day by the
/// traverser (§4.2, `Chart::interpolate(date, duration)`): `t` is measured
/// from the launch date rather than from the chart's `start_date`.
pub struct WindowedField<'a> {
    field: &'a Field,
    offset_days: f64,
}

impl<'a> WindowedField<'a> {
    pub fn new(field: &'a Field, offset_days: f64) -> Self {
        Self { field, offset_days }
    }
}

impl<'a> Sampleable for WindowedField<'a> {
    fn sample(&self, t: f64, lon: f64, lat: f64) -> f64 {
        self.field.sample(t + self.offset_days, lon, lat)
    }
}
