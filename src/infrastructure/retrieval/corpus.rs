//! Reference documents: the built-in policy set and optional corpus files

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::domain::DomainError;
use crate::domain::classification::{CATEGORY_METADATA_KEY, Category};
use crate::domain::pipeline::Evidence;

/// One reference document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl CorpusDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Evidence for this document with the given retrieval score
    pub fn to_evidence(&self, base_score: f32) -> Evidence {
        let evidence = Evidence::new(&self.id, &self.text, base_score);
        match self.category {
            Some(category) => evidence.with_metadata(CATEGORY_METADATA_KEY, json!(category)),
            None => evidence,
        }
    }
}

/// Government service policies used for question answering and classification support
pub fn builtin_policies() -> Vec<CorpusDocument> {
    vec![
        CorpusDocument::new(
            "policy_land",
            "Land Record services include property registration, survey documents, and ownership verification. Requires property deed, survey number, and identity proof. Managed by Revenue Department.",
        )
        .with_category(Category::LandRecord),
        CorpusDocument::new(
            "policy_police",
            "Police Verification services for character certificate, employment clearance, and passport verification. Requires identity proof, address proof, and purpose statement. Managed by Police Department.",
        )
        .with_category(Category::PoliceVerification),
        CorpusDocument::new(
            "policy_vehicle",
            "Vehicle Registration includes new registration, transfer of ownership, and RC renewal. Requires purchase invoice, insurance, pollution certificate. Managed by Transport Department.",
        )
        .with_category(Category::VehicleRegistration),
        CorpusDocument::new(
            "policy_building",
            "Building Permission for construction approval, plan sanction, and occupancy certificate. Requires site plan, structural design, and NOC. Managed by Municipal Corporation.",
        )
        .with_category(Category::BuildingPermission),
        CorpusDocument::new(
            "policy_ration",
            "Ration Card for food subsidy under Public Distribution System. Requires income proof, address proof, and family details. Managed by Food & Civil Supplies Department.",
        )
        .with_category(Category::RationCard),
    ]
}

/// Load a JSON array of `{id, text, category?}` documents
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<CorpusDocument>, DomainError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
        DomainError::configuration(format!("Failed to read corpus {}: {}", path.display(), e))
    })?;

    let documents: Vec<CorpusDocument> = serde_json::from_str(&raw).map_err(|e| {
        DomainError::configuration(format!("Invalid corpus {}: {}", path.display(), e))
    })?;

    info!(path = %path.display(), documents = documents.len(), "Loaded corpus");
    Ok(documents)
}
