//! Water-quality parameters the prediction model was trained on.
//! Variant order is the model's feature order.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Parameter {
    Ph,
    Hardness,
    DissolvedOxygen,
    Bod,
    HeavyMetals,
    Nitrates,
    Phosphates,
    Turbidity,
    Conductivity,
}

/// Values keyed by parameter. Iterates in model feature order.
pub type ParameterValues = BTreeMap<Parameter, f64>;

pub const ALL_PARAMETERS: [Parameter; 9] = [
    Parameter::Ph,
    Parameter::Hardness,
    Parameter::DissolvedOxygen,
    Parameter::Bod,
    Parameter::HeavyMetals,
    Parameter::Nitrates,
    Parameter::Phosphates,
    Parameter::Turbidity,
    Parameter::Conductivity,
];

static CAMEL_HUMP: Lazy<Regex> = Lazy::new(|| Regex::new(r"([A-Z])").expect("static regex"));

impl Parameter {
    pub fn id(self) -> &'static str {
        match self {
            Parameter::Ph => "ph",
            Parameter::Hardness => "hardness",
            Parameter::DissolvedOxygen => "dissolvedOxygen",
            Parameter::Bod => "bod",
            Parameter::HeavyMetals => "heavyMetals",
            Parameter::Nitrates => "nitrates",
            Parameter::Phosphates => "phosphates",
            Parameter::Turbidity => "turbidity",
            Parameter::Conductivity => "conductivity",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Parameter::Ph => "Measures acidity/alkalinity (Standard: 6.5-8.5)",
            Parameter::Hardness => "Calcium/magnesium levels (Standard: 60-120 mg/L)",
            Parameter::DissolvedOxygen => "Oxygen available for aquatic life (Standard: 5-7 mg/L)",
            Parameter::Bod => "Biological Oxygen Demand (Standard: <5 mg/L)",
            Parameter::HeavyMetals => "Toxic metals like lead (Standard: <10 µg/L)",
            Parameter::Nitrates => "Nutrient pollution indicator (Standard: <10 mg/L)",
            Parameter::Phosphates => "Cause of algal blooms (Standard: <0.1 mg/L)",
            Parameter::Turbidity => "Water clarity measure (Standard: <5 NTU)",
            Parameter::Conductivity => "Ion concentration (Standard: 150-500 µS/cm)",
        }
    }

    /// pH is dimensionless.
    pub fn unit(self) -> Option<&'static str> {
        match self {
            Parameter::Ph => None,
            Parameter::Hardness
            | Parameter::DissolvedOxygen
            | Parameter::Bod
            | Parameter::Nitrates
            | Parameter::Phosphates => Some("mg/L"),
            Parameter::HeavyMetals => Some("µg/L"),
            Parameter::Turbidity => Some("NTU"),
            Parameter::Conductivity => Some("µS/cm"),
        }
    }

    pub fn display_name(self) -> String {
        match self {
            Parameter::Ph => "pH".to_string(),
            other => title_case(other.id()),
        }
    }

    /// Display name with the unit in parentheses, e.g. `Turbidity (NTU)`.
    pub fn label(self) -> String {
        match self.unit() {
            Some(unit) => format!("{} ({unit})", self.display_name()),
            None => self.display_name(),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Parameter {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_PARAMETERS
            .iter()
            .copied()
            .find(|p| p.id() == s)
            .ok_or_else(|| WizardError::UnknownParameter(s.to_string()))
    }
}

/// Splits a camel-case identifier at each capital and capitalizes every word:
/// `heavyMetals` -> `Heavy Metals`.
pub fn title_case(s: &str) -> String {
    CAMEL_HUMP
        .replace_all(s, " $1")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    let rest: String = chars.collect();
                    format!("{}{}", first.to_uppercase(), rest.to_lowercase())
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
