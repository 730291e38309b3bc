use std::{fmt, str::FromStr};

use serde::Serialize;

/// The closed set of waste categories, shared by storage, requests and classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum WasteCategory {
    #[serde(rename = "recyclable")]
    Recyclable,
    #[serde(rename = "compostable")]
    Compostable,
    #[serde(rename = "general waste")]
    GeneralWaste,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown waste category: {0:?}")]
pub struct UnknownCategory(pub String);

impl WasteCategory {
    pub const ALL: [WasteCategory; 3] = [Self::Recyclable, Self::Compostable, Self::GeneralWaste];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recyclable => "recyclable",
            Self::Compostable => "compostable",
            Self::GeneralWaste => "general waste",
        }
    }

    /// Reads a model answer: trimmed and lower-cased, then matched exactly.
    pub fn from_completion(text: &str) -> Option<Self> {
        text.trim().to_lowercase().parse().ok()
    }
}

impl FromStr for WasteCategory {
    type Err = UnknownCategory;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_labels_only() {
        assert_eq!("recyclable".parse(), Ok(WasteCategory::Recyclable));
        assert_eq!("compostable".parse(), Ok(WasteCategory::Compostable));
        assert_eq!("general waste".parse(), Ok(WasteCategory::GeneralWaste));
        assert!("Recyclable".parse::<WasteCategory>().is_err());
        assert!(" recyclable".parse::<WasteCategory>().is_err());
        assert!("general_waste".parse::<WasteCategory>().is_err());
    }

    #[test]
    fn completion_is_normalised_before_matching() {
        assert_eq!(
            WasteCategory::from_completion("  Recyclable \n"),
            Some(WasteCategory::Recyclable)
        );
        assert_eq!(
            WasteCategory::from_completion("GENERAL WASTE"),
            Some(WasteCategory::GeneralWaste)
        );
        assert_eq!(WasteCategory::from_completion("plastic bottle"), None);
        assert_eq!(WasteCategory::from_completion("recyclable."), None);
        assert_eq!(WasteCategory::from_completion("general  waste"), None);
        assert_eq!(WasteCategory::from_completion(""), None);
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&WasteCategory::GeneralWaste).unwrap();
        assert_eq!(json, "\"general waste\"");
        assert_eq!(WasteCategory::Compostable.to_string(), "compostable");
    }
}
