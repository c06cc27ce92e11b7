//! Parameter Keys and Alias Resolution
//!
//! Lab extraction produces free-form column names ("N_percent", "Exch. K (meq%)",
//! "Available_P_mgkg"). They are resolved to a closed set of nutrient keys here.
//! Names that do not resolve are dropped by the comparator, never coerced.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sample domain a standard applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Soil,
    Leaf,
}

impl Domain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Soil => "soil",
            Domain::Leaf => "leaf",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = crate::error::EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "soil" => Ok(Domain::Soil),
            "leaf" => Ok(Domain::Leaf),
            _ => Err(crate::error::EngineError::UnknownReportType(s.to_string())),
        }
    }
}

/// Known nutrient / soil-chemistry parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ParameterKey {
    #[serde(rename = "pH")]
    Ph,
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "Organic_Carbon")]
    OrganicCarbon,
    #[serde(rename = "Total_P")]
    TotalPhosphorus,
    #[serde(rename = "Available_P")]
    AvailablePhosphorus,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "Ca")]
    Calcium,
    #[serde(rename = "Mg")]
    Magnesium,
    #[serde(rename = "CEC")]
    Cec,
    #[serde(rename = "B")]
    Boron,
    #[serde(rename = "Cu")]
    Copper,
    #[serde(rename = "Zn")]
    Zinc,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 13] = [
        ParameterKey::Ph,
        ParameterKey::Nitrogen,
        ParameterKey::OrganicCarbon,
        ParameterKey::TotalPhosphorus,
        ParameterKey::AvailablePhosphorus,
        ParameterKey::Phosphorus,
        ParameterKey::Potassium,
        ParameterKey::Calcium,
        ParameterKey::Magnesium,
        ParameterKey::Cec,
        ParameterKey::Boron,
        ParameterKey::Copper,
        ParameterKey::Zinc,
    ];

    /// Short code used in standards tables and monitoring text
    pub fn code(&self) -> &'static str {
        match self {
            ParameterKey::Ph => "pH",
            ParameterKey::Nitrogen => "N",
            ParameterKey::OrganicCarbon => "Organic_Carbon",
            ParameterKey::TotalPhosphorus => "Total_P",
            ParameterKey::AvailablePhosphorus => "Available_P",
            ParameterKey::Phosphorus => "P",
            ParameterKey::Potassium => "K",
            ParameterKey::Calcium => "Ca",
            ParameterKey::Magnesium => "Mg",
            ParameterKey::Cec => "CEC",
            ParameterKey::Boron => "B",
            ParameterKey::Copper => "Cu",
            ParameterKey::Zinc => "Zn",
        }
    }

    /// Human-readable name used in issue descriptions
    pub fn display_name(&self) -> &'static str {
        match self {
            ParameterKey::Ph => "pH",
            ParameterKey::Nitrogen => "Nitrogen",
            ParameterKey::OrganicCarbon => "Organic Carbon",
            ParameterKey::TotalPhosphorus => "Total Phosphorus",
            ParameterKey::AvailablePhosphorus => "Available Phosphorus",
            ParameterKey::Phosphorus => "Phosphorus",
            ParameterKey::Potassium => "Potassium",
            ParameterKey::Calcium => "Calcium",
            ParameterKey::Magnesium => "Magnesium",
            ParameterKey::Cec => "CEC",
            ParameterKey::Boron => "Boron",
            ParameterKey::Copper => "Copper",
            ParameterKey::Zinc => "Zinc",
        }
    }

    /// Parse a standards-table key (the `code()` form, case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One alias group: normalized names that map to a key, optionally domain-restricted
struct AliasGroup {
    key: ParameterKey,
    domain: Option<Domain>,
    names: &'static [&'static str],
}

// Names are stored normalized: lowercase ASCII alphanumerics only.
static ALIASES: &[AliasGroup] = &[
    AliasGroup { key: ParameterKey::Ph, domain: None, names: &["ph"] },
    AliasGroup {
        key: ParameterKey::Nitrogen,
        domain: None,
        names: &["n", "npercent", "nitrogen", "nitrogenpercent", "totaln"],
    },
    AliasGroup {
        key: ParameterKey::OrganicCarbon,
        domain: Some(Domain::Soil),
        names: &["organiccarbon", "organiccarbonpercent", "orgc", "oc"],
    },
    AliasGroup {
        key: ParameterKey::TotalPhosphorus,
        domain: Some(Domain::Soil),
        names: &["totalp", "totalpmgkg", "totalphosphorus"],
    },
    AliasGroup {
        key: ParameterKey::AvailablePhosphorus,
        domain: Some(Domain::Soil),
        names: &["availablep", "availablepmgkg", "availp", "availpmgkg", "availablephosphorus"],
    },
    AliasGroup {
        key: ParameterKey::Phosphorus,
        domain: Some(Domain::Leaf),
        names: &["p", "ppercent", "phosphorus"],
    },
    AliasGroup {
        key: ParameterKey::Potassium,
        domain: Some(Domain::Leaf),
        names: &["k", "kpercent", "potassium"],
    },
    AliasGroup {
        key: ParameterKey::Potassium,
        domain: Some(Domain::Soil),
        names: &["k", "exchk", "exchkmeq", "exchangeablek", "exchangeablekmeq"],
    },
    AliasGroup {
        key: ParameterKey::Calcium,
        domain: Some(Domain::Leaf),
        names: &["ca", "capercent", "camgkg", "calcium"],
    },
    AliasGroup {
        key: ParameterKey::Calcium,
        domain: Some(Domain::Soil),
        names: &["ca", "exchca", "exchcameq", "exchangeableca", "exchangeablecameq"],
    },
    AliasGroup {
        key: ParameterKey::Magnesium,
        domain: Some(Domain::Leaf),
        names: &["mg", "mgpercent", "mgmgkg", "magnesium"],
    },
    AliasGroup {
        key: ParameterKey::Magnesium,
        domain: Some(Domain::Soil),
        names: &["mg", "exchmg", "exchmgmeq", "exchangeablemg", "exchangeablemgmeq"],
    },
    AliasGroup {
        key: ParameterKey::Cec,
        domain: Some(Domain::Soil),
        names: &["cec", "cecmeq", "cationexchangecapacity"],
    },
    AliasGroup { key: ParameterKey::Boron, domain: Some(Domain::Leaf), names: &["b", "bmgkg", "boron"] },
    AliasGroup { key: ParameterKey::Copper, domain: Some(Domain::Leaf), names: &["cu", "cumgkg", "copper"] },
    AliasGroup { key: ParameterKey::Zinc, domain: Some(Domain::Leaf), names: &["zn", "znmgkg", "zinc"] },
];

/// Strip everything except ASCII alphanumerics and lowercase the rest
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Resolve a lab column name to a parameter key for the given domain
pub fn resolve_alias(name: &str, domain: Domain) -> Option<ParameterKey> {
    let normalized = normalize(name);
    if normalized.is_empty() {
        return None;
    }

    ALIASES
        .iter()
        .filter(|group| group.domain.map_or(true, |d| d == domain))
        .find(|group| group.names.contains(&normalized.as_str()))
        .map(|group| group.key)
}
