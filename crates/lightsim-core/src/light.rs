use serde::{Deserialize, Serialize};

/// Stored state of one light. Every field is always present.
///
/// `mode` is kept verbatim (usually `"cct"` or `"hsi"`) and the numeric
/// fields carry no range limits; the store accepts whatever clients send.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightState {
    pub mode: String,
    pub dim: i64,
    pub ct: i64,
    pub gm: i64,
    pub hue: i64,
    pub sat: i64,
}

impl LightState {
    /// The two fixtures the simulator starts with when no config overrides them.
    pub fn default_fixture() -> Vec<LightState> {
        vec![
            LightState {
                mode: "cct".into(),
                dim: 10,
                ct: 3200,
                gm: 0,
                hue: 0,
                sat: 0,
            },
            LightState {
                mode: "hsi".into(),
                dim: 50,
                ct: 5600,
                gm: 0,
                hue: 120,
                sat: 100,
            },
        ]
    }

    /// Overwrite every field the patch sets; leave the rest alone.
    pub fn apply(&mut self, patch: &StatePatch) {
        if let Some(mode) = &patch.mode {
            self.mode.clone_from(mode);
        }
        if let Some(dim) = patch.dim {
            self.dim = dim;
        }
        if let Some(ct) = patch.ct {
            self.ct = ct;
        }
        if let Some(gm) = patch.gm {
            self.gm = gm;
        }
        if let Some(hue) = patch.hue {
            self.hue = hue;
        }
        if let Some(sat) = patch.sat {
            self.sat = sat;
        }
    }
}

/// Partial update carried by a command. `None` means "leave unchanged",
/// whether the key was absent or sent as `null`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ct: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gm: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sat: Option<i64>,
}

impl StatePatch {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    /// Names of the fields this patch overwrites, in wire order.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("mode", self.mode.is_some()),
            ("dim", self.dim.is_some()),
            ("ct", self.ct.is_some()),
            ("gm", self.gm.is_some()),
            ("hue", self.hue.is_some()),
            ("sat", self.sat.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }
}
