//! Capacity verdicts

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::loads::LimitState;

/// Utilization at or above which an element is flagged for review
pub const WARNING_THRESHOLD: f64 = 0.8;
/// Utilization at or above which an element fails
pub const FAIL_THRESHOLD: f64 = 1.0;

/// Outcome class of a utilization ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VerdictStatus {
    Ok,
    Warning,
    Fail,
}

impl VerdictStatus {
    /// Classify a utilization; NaN is treated as a failure
    pub fn from_utilization(u: f64) -> Self {
        if u.is_nan() || u >= FAIL_THRESHOLD {
            VerdictStatus::Fail
        } else if u >= WARNING_THRESHOLD {
            VerdictStatus::Warning
        } else {
            VerdictStatus::Ok
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerdictStatus::Ok => "OK",
            VerdictStatus::Warning => "WARNING",
            VerdictStatus::Fail => "FAIL",
        }
    }
}

impl fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure mode a utilization refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    /// Combined axial and bending stress of a steel member
    Strength,
    Shear,
    /// Flexural buckling with moment amplification
    Buckling,
    /// Lateral-torsional buckling of an unbraced I-section
    LateralTorsional,
    Deflection,
    /// Reinforcement demand of an RC section
    Flexure,
    CrackWidth,
    SpanDepth,
    /// Punching shear around a column
    Punching,
    /// RC column P-M interaction
    AxialBending,
    BoltShear,
    BoltBearing,
    BoltTension,
    BoltCombined,
    WeldStrength,
    BasePlateBearing,
    BasePlateThickness,
    SoilBearing,
    EdgePressure,
    PileGroup,
}

impl FailureMode {
    /// Modes checked under serviceability combinations
    pub fn is_serviceability(&self) -> bool {
        matches!(
            self,
            FailureMode::Deflection | FailureMode::CrackWidth | FailureMode::SpanDepth
        )
    }

    /// Limit state whose combinations drive this mode
    pub fn limit_state(&self) -> LimitState {
        if self.is_serviceability() {
            LimitState::Sls
        } else {
            LimitState::Uls
        }
    }
}

/// Utilization of one failure mode, before it is attached to an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeResult {
    pub mode: FailureMode,
    /// Demand over capacity
    #[serde(with = "non_finite")]
    pub utilization: f64,
    /// Named intermediate quantities (capacities, required areas, factors)
    #[serde(with = "non_finite::map")]
    pub quantities: BTreeMap<String, f64>,
}

impl ModeResult {
    pub fn new(mode: FailureMode, utilization: f64) -> Self {
        Self {
            mode,
            utilization,
            quantities: BTreeMap::new(),
        }
    }

    /// Attach a named quantity
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.quantities.insert(name.to_string(), value);
        self
    }

    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.quantities.get(name).copied()
    }
}

/// Verdict for one (element, combination, failure mode)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityVerdict {
    pub element: String,
    /// Element check kind, e.g. `steel_member`
    pub kind: String,
    pub combination: String,
    pub mode: FailureMode,
    #[serde(with = "non_finite")]
    pub utilization: f64,
    pub status: VerdictStatus,
    #[serde(with = "non_finite::map")]
    pub quantities: BTreeMap<String, f64>,
}

impl CapacityVerdict {
    pub fn from_mode(element: &str, kind: &str, combination: &str, result: ModeResult) -> Self {
        Self {
            element: element.to_string(),
            kind: kind.to_string(),
            combination: combination.to_string(),
            mode: result.mode,
            status: VerdictStatus::from_utilization(result.utilization),
            utilization: result.utilization,
            quantities: result.quantities,
        }
    }
}

/// Demand over capacity; zero demand is zero, a non-positive capacity is infinite
pub(crate) fn ratio(demand: f64, capacity: f64) -> f64 {
    let demand = demand.abs();
    if demand == 0.0 {
        0.0
    } else if capacity <= 0.0 {
        f64::INFINITY
    } else {
        demand / capacity
    }
}

/// JSON has no infinity or NaN; those values travel as `"inf"`, `"-inf"` and `"NaN"`
pub(crate) mod non_finite {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    impl Repr {
        fn into_f64<E: Error>(self) -> Result<f64, E> {
            match self {
                Repr::Number(v) => Ok(v),
                Repr::Text(text) => match text.as_str() {
                    "inf" => Ok(f64::INFINITY),
                    "-inf" => Ok(f64::NEG_INFINITY),
                    "NaN" => Ok(f64::NAN),
                    other => Err(E::custom(format!("expected a number, got \"{}\"", other))),
                },
            }
        }
    }

    fn tag(value: f64) -> &'static str {
        if value.is_nan() {
            "NaN"
        } else if value > 0.0 {
            "inf"
        } else {
            "-inf"
        }
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else {
            serializer.serialize_str(tag(*value))
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?.into_f64()
    }

    pub mod map {
        use std::collections::BTreeMap;

        use serde::ser::SerializeMap;
        use serde::{Deserialize, Deserializer, Serializer};

        use super::{tag, Repr};

        pub fn serialize<S: Serializer>(
            values: &BTreeMap<String, f64>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(values.len()))?;
            for (name, &value) in values {
                if value.is_finite() {
                    map.serialize_entry(name, &value)?;
                } else {
                    map.serialize_entry(name, tag(value))?;
                }
            }
            map.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<BTreeMap<String, f64>, D::Error> {
            BTreeMap::<String, Repr>::deserialize(deserializer)?
                .into_iter()
                .map(|(name, repr)| Ok((name, repr.into_f64::<D::Error>()?)))
                .collect()
        }
    }
}
