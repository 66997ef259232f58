//! Chart: the composite of four forcing fields plus the derived
//! navigation grid, over a bounding box and date window (§3, §9).
//! Owned by the traverser and shared immutably by reference across
//! workers for the lifetime of a run.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::config::BoundingBox;
use crate::field::{Field, WindowedField};
use crate::grid::NavigationGrid;

pub struct Chart {
    pub bbox: BoundingBox,
    pub start_date: NaiveDate,
    pub u_current: Field,
    pub v_current: Field,
    pub u_wind: Field,
    pub v_wind: Field,
    pub navigation_grid: NavigationGrid,
}

impl Chart {
    /// Builds a chart from already-loaded fields (loading them from disk is
    /// the raster loader's job, out of scope here — §6). The navigation
    /// grid is derived once from the instantaneous `u_current` slice at
    /// `start_date` (time index 0), per §4.3.
    pub fn new(
        bbox: BoundingBox,
        start_date: NaiveDate,
        u_current: Field,
        v_current: Field,
        u_wind: Field,
        v_wind: Field,
        contour_bands: &[(f64, usize)],
    ) -> Self {
        log::info!("loading chart over bbox ({}, {}) - ({}, {}), start_date={start_date}", bbox.lon_min, bbox.lat_min, bbox.lon_max, bbox.lat_max);
        let land_mask = land_mask_from_slice(&u_current, 0);
        let navigation_grid = NavigationGrid::from_land_mask(&land_mask, contour_bands);

        Self { bbox, start_date, u_current, v_current, u_wind, v_wind, navigation_grid }
    }

    /// Rebinds a launch-day view over the four forcing fields: `t = 0`
    /// means `date`, per §4.2/§9.
    pub fn interpolate(&self, date: NaiveDate) -> InterpolatedChart<'_> {
        let offset_days = (date - self.start_date).num_days() as f64;
        log::debug!("interpolating chart view for {date} (offset_days={offset_days})");
        InterpolatedChart {
            u_current: WindowedField::new(&self.u_current, offset_days),
            v_current: WindowedField::new(&self.v_current, offset_days),
            u_wind: WindowedField::new(&self.u_wind, offset_days),
            v_wind: WindowedField::new(&self.v_wind, offset_days),
        }
    }
}

/// A launch-day-bound sampler view, handed to the integrator for one batch
/// of vessels.
pub struct InterpolatedChart<'a> {
    pub u_current: WindowedField<'a>,
    pub v_current: WindowedField<'a>,
    pub u_wind: WindowedField<'a>,
    pub v_wind: WindowedField<'a>,
}

fn land_mask_from_slice(field: &Field, time_idx: usize) -> Array2<bool> {
    let height = field.latitude_axis().len();
    let width = field.longitude_axis().len();
    let mut mask = Array2::from_elem((height, width), false);
    for y in 0..height {
        for x in 0..width {
            mask[[y, x]] = field.raw(time_idx, y, x).is_nan();
        }
    }
    mask
}
