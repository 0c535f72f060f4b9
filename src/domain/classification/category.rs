//! Service categories and their keyword table

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::scoring::text::keyword_density;

/// Government service category of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    LandRecord,
    PoliceVerification,
    RationCard,
    VehicleRegistration,
    BuildingPermission,
    RevenueMutation,
    Other,
}

impl Category {
    /// Every category in table order
    pub const ALL: [Category; 7] = [
        Category::LandRecord,
        Category::PoliceVerification,
        Category::RationCard,
        Category::VehicleRegistration,
        Category::BuildingPermission,
        Category::RevenueMutation,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LandRecord => "LAND_RECORD",
            Self::PoliceVerification => "POLICE_VERIFICATION",
            Self::RationCard => "RATION_CARD",
            Self::VehicleRegistration => "VEHICLE_REGISTRATION",
            Self::BuildingPermission => "BUILDING_PERMISSION",
            Self::RevenueMutation => "REVENUE_MUTATION",
            Self::Other => "OTHER",
        }
    }

    pub fn from_str_opt(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == value)
    }

    /// Keywords that signal this category. `Other` has none.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::LandRecord => &["land", "property", "survey", "plot", "acre", "deed"],
            Self::PoliceVerification => {
                &["police", "verification", "clearance", "character", "antecedents"]
            }
            Self::RationCard => &["ration", "card", "food", "pds", "subsidy"],
            Self::VehicleRegistration => {
                &["vehicle", "registration", "rc", "car", "bike", "transport"]
            }
            Self::BuildingPermission => {
                &["building", "construction", "permission", "plan", "approval"]
            }
            Self::RevenueMutation => &["revenue", "mutation", "transfer", "ownership", "khata"],
            Self::Other => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Best category by local keyword density, with its raw density.
///
/// Ties keep the earlier category; no keyword match at all yields `Other` at 0.
pub fn best_category(text: &str) -> (Category, f32) {
    let mut best = (Category::Other, 0.0);

    for category in Category::ALL {
        if category.keywords().is_empty() {
            continue;
        }

        let density = keyword_density(text, category.keywords());
        if density > best.1 {
            best = (category, density);
        }
    }

    best
}

/// A category picked by the generator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryLabel {
    pub category: Category,
    /// Support score of the evidence that selected the category
    pub score: f32,
}

impl CategoryLabel {
    pub fn new(category: Category, score: f32) -> Self {
        Self { category, score }
    }

    pub fn other() -> Self {
        Self::new(Category::Other, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_category() {
        let (category, density) =
            best_category("Application for ration card under PDS food subsidy scheme");

        assert_eq!(category, Category::RationCard);
        assert!((density - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_keywords_is_other() {
        assert_eq!(best_category("hello world"), (Category::Other, 0.0));
    }

    #[test]
    fn test_serializes_screaming_snake() {
        let json = serde_json::to_string(&Category::LandRecord).unwrap();
        assert_eq!(json, "\"LAND_RECORD\"");
        assert_eq!(Category::from_str_opt("OTHER"), Some(Category::Other));
    }
}
