//! Typed configuration records consumed at the core's boundary (§6):
//! the vessel parameter table and a bounding box. Loading these from disk
//! (YAML, JSON, CLI flags) is the caller's job; the core only defines and
//! consumes the shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::vessel::VesselParams;

/// `(lon_min, lat_min, lon_max, lat_max)`, half-open in index space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lat_min: f64,
    pub lon_max: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn new(lon_min: f64, lat_min: f64, lon_max: f64, lat_max: f64) -> CoreResult<Self> {
        if lon_min >= lon_max || lat_min >= lat_max {
            return Err(CoreError::Configuration(format!(
                "invalid bounding box: ({lon_min}, {lat_min}, {lon_max}, {lat_max})"
            )));
        }
        Ok(Self { lon_min, lat_min, lon_max, lat_max })
    }
}

/// Raw, serde-facing row of the vessel parameter table: `{ mode: { craft_id:
/// { param: value } } }` (§6), before being resolved into a typed
/// `VesselParams`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VesselParamRow {
    #[serde(default)]
    pub sl: f64,
    #[serde(default)]
    pub yt: f64,
    #[serde(default)]
    pub da: f64,
    #[serde(default)]
    pub paddling_speed_ms: f64,
    #[serde(default)]
    pub mt: f64,
    #[serde(default)]
    pub wf_0_40: f64,
    #[serde(default)]
    pub wf_40_80: f64,
    #[serde(default)]
    pub wf_80_100: f64,
    #[serde(default)]
    pub wf_100_110: f64,
    #[serde(default)]
    pub wf_110_120: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKey {
    Drift,
    Paddling,
    Sailing,
}

/// The nested vessel parameter config, loaded once and passed to the
/// constructor verbatim (§6).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VesselConfigTable {
    pub table: HashMap<ModeKey, HashMap<u32, VesselParamRow>>,
}

impl VesselConfigTable {
    /// Resolves one `(mode, craft_id)` entry into a typed `VesselParams`,
    /// per §7 "configuration errors (unknown mode, unknown craft id,
    /// missing vessel parameters)".
    pub fn resolve(&self, mode: ModeKey, craft_id: u32) -> CoreResult<VesselParams> {
        let by_craft = self.table.get(&mode).ok_or_else(|| {
            CoreError::Configuration(format!("unknown mode {mode:?}"))
        })?;
        let row = by_craft.get(&craft_id).ok_or_else(|| {
            CoreError::Configuration(format!("no vessel parameters for craft id {craft_id}"))
        })?;

        Ok(match mode {
            ModeKey::Drift => VesselParams::drift(craft_id, row.sl, row.yt, row.da),
            ModeKey::Paddling => {
                VesselParams::paddling(craft_id, row.sl, row.yt, row.da, row.paddling_speed_ms)
            }
            ModeKey::Sailing => VesselParams::sailing(
                craft_id,
                crate::vessel::SailingParams {
                    mt: row.mt,
                    wf_0_40: row.wf_0_40,
                    wf_40_80: row.wf_40_80,
                    wf_80_100: row.wf_80_100,
                    wf_100_110: row.wf_100_110,
                    wf_110_120: row.wf_110_120,
                },
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_rejects_degenerate_ranges() {
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 10.0).is_err());
        assert!(BoundingBox::new(0.0, 10.0, 10.0, 0.0).is_err());
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_ok());
    }

    #[test]
    fn resolve_unknown_craft_is_configuration_error() {
        let table = VesselConfigTable::default();
        let result = table.resolve(ModeKey::Drift, 1);
        assert!(matches!(result, Err(CoreError::Configuration(_))));
    }

    #[test]
    fn resolve_known_craft_seven_selects_levison() {
        let mut table = VesselConfigTable::default();
        let mut by_craft = HashMap::new();
        by_craft.insert(7, VesselParamRow::default());
        table.table.insert(ModeKey::Drift, by_craft);

        let params = table.resolve(ModeKey::Drift, 7).unwrap();
        assert!(matches!(params.mode, crate::vessel::Mode::DriftLevison(_)));
    }
}
