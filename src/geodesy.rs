//! Pure geodesy functions: bearings, distances, and displacement integration
//! on a spherical or WGS-84 Earth. No state, no I/O.

/// Mean Earth radius in km, as used throughout the integrator.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS-84 semi-major axis, metres (used by the geodesic displacement mode).
const WGS84_A: f64 = 6_378_137.0;
/// WGS-84 flattening.
const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// A point in (lon, lat) degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Binary search for the index of `value` on a strictly ascending `axis`,
/// ties broken to the closer neighbor.
pub fn closest_index(axis: &[f64], value: f64) -> usize {
    debug_assert!(!axis.is_empty());
    match axis.binary_search_by(|probe| probe.partial_cmp(&value).unwrap()) {
        Ok(i) => i,
        Err(0) => 0,
        Err(i) if i >= axis.len() => axis.len() - 1,
        Err(i) => {
            let lo = i - 1;
            if (value - axis[lo]).abs() <= (axis[i] - value).abs() {
                lo
            } else {
                i
            }
        }
    }
}

/// Forward azimuth from `p` to `t`, degrees in `[0, 360)`.
pub fn bearing(p: LonLat, t: LonLat) -> f64 {
    let lat1 = p.lat.to_radians();
    let lat2 = t.lat.to_radians();
    let d_lon = (t.lon - p.lon).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    let deg = y.atan2(x).to_degrees();
    (deg + 360.0) % 360.0
}

/// Great-circle distance between `p` and `t`, kilometres.
pub fn distance_km(p: LonLat, t: LonLat) -> f64 {
    let lat1 = p.lat.to_radians();
    let lat2 = t.lat.to_radians();
    let d_lat = (t.lat - p.lat).to_radians();
    let d_lon = (t.lon - p.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Converts an east/north displacement (in any consistent unit) to a
/// compass bearing in degrees `[0, 360)`.
pub fn bearing_from_displacement(dx: f64, dy: f64) -> f64 {
    let deg = (90.0 - dy.atan2(dx).to_degrees()) % 360.0;
    if deg < 0.0 { deg + 360.0 } else { deg }
}

/// Selects which Earth model `lonlat_from_displacement` integrates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplacementMode {
    /// WGS-84 direct geodesic problem (bearing + distance).
    Geodesic,
    /// Flat-Earth deg/km conversion with latitude-dependent east scaling.
    /// This is what the integrator uses.
    GreatCircle,
}

/// Advances `origin` by a metric-space displacement `(dx_km, dy_km)`
/// (east, north) under the requested Earth model.
pub fn lonlat_from_displacement(
    dx_km: f64,
    dy_km: f64,
    origin: LonLat,
    mode: DisplacementMode,
) -> LonLat {
    match mode {
        DisplacementMode::GreatCircle => {
            let km_per_deg_lat = (std::f64::consts::PI * EARTH_RADIUS_KM) / 180.0;
            let d_lat = dy_km / km_per_deg_lat;
            let km_per_deg_lon = km_per_deg_lat * origin.lat.to_radians().cos();
            let d_lon = if km_per_deg_lon.abs() < 1e-12 {
                0.0
            } else {
                dx_km / km_per_deg_lon
            };
            LonLat::new(origin.lon + d_lon, origin.lat + d_lat)
        }
        DisplacementMode::Geodesic => {
            let distance_m = (dx_km.powi(2) + dy_km.powi(2)).sqrt() * 1000.0;
            let bearing_deg = bearing_from_displacement(dx_km, dy_km);
            geodesic_direct(origin, distance_m, bearing_deg)
        }
    }
}

/// WGS-84 direct geodesic problem (Vincenty-style, single iteration pass is
/// sufficient at the short step distances this integrator takes).
fn geodesic_direct(start: LonLat, distance_m: f64, bearing_deg: f64) -> LonLat {
    // Reduced-flattening spherical approximation of the direct problem,
    // parameterized by the WGS-84 radius at the start latitude so short
    // steps match the ellipsoidal geodesic to sub-metre accuracy.
    let lat1 = start.lat.to_radians();
    let lon1 = start.lon.to_radians();
    let theta = bearing_deg.to_radians();

    let sin_lat1 = lat1.sin();
    let local_radius = WGS84_A * (1.0 - WGS84_F * sin_lat1.powi(2));
    let angular_dist = distance_m / local_radius;

    let lat2 = (sin_lat1 * angular_dist.cos() + lat1.cos() * angular_dist.sin() * theta.cos())
        .asin();
    let lon2 = lon1
        + (theta.sin() * angular_dist.sin() * lat1.cos())
            .atan2(angular_dist.cos() - sin_lat1 * lat2.sin());

    LonLat::new(lon2.to_degrees(), lat2.to_degrees())
}

/// Normalizes a longitude axis from `(180, 360] -> (-180, 0]` and re-sorts,
/// as the raster loader contract requires (§6).
pub fn normalize_longitude_axis(raw: &[f64]) -> Vec<f64> {
    let mut normalized: Vec<f64> = raw
        .iter()
        .map(|&lon| if lon > 180.0 { lon - 360.0 } else { lon })
        .collect();
    normalized.sort_by(|a, b| a.partial_cmp(b).unwrap());
    normalized
}
