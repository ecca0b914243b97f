//! Radio commands a real Nanlite fixture would receive for a given record.
//!
//! The simulator never transmits anything; sessions log the computed output
//! so a client under test can be checked against what hardware would do.

use crate::light::LightState;

const CCT_MIN_KELVIN: i64 = 2700;
const CCT_MAX_KELVIN: i64 = 7500;

/// Hardware-range values, ready for the fixture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceOutput {
    /// White light: intensity 0..100, colour temperature 0..100, green/magenta 0..100.
    Cct { intensity: u8, cct: u8, gm: u8 },
    /// Colour light: hue 0..360, saturation 0..100, intensity 0..100.
    Hsi { hue: u16, sat: u8, intensity: u8 },
}

impl DeviceOutput {
    /// `None` for modes the fixture does not understand.
    pub fn from_state(state: &LightState) -> Option<Self> {
        match state.mode.as_str() {
            "cct" => Some(Self::Cct {
                intensity: percent(state.dim),
                cct: kelvin_to_percent(state.ct),
                gm: tint_to_percent(state.gm),
            }),
            "hsi" => Some(Self::Hsi {
                hue: state.hue.clamp(0, 360) as u16,
                sat: percent(state.sat),
                intensity: percent(state.dim),
            }),
            _ => None,
        }
    }
}

fn percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// 2700K..7500K onto 0..100.
fn kelvin_to_percent(kelvin: i64) -> u8 {
    let kelvin = kelvin.clamp(CCT_MIN_KELVIN, CCT_MAX_KELVIN);
    ((kelvin - CCT_MIN_KELVIN) * 100 / (CCT_MAX_KELVIN - CCT_MIN_KELVIN)) as u8
}

/// -100..100 onto 0..100.
fn tint_to_percent(gm: i64) -> u8 {
    ((gm.clamp(-100, 100) + 100) / 2) as u8
}
