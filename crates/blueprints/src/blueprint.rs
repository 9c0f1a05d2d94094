//! Blueprint records served by the API. The catalog is fixed.

use serde::{Deserialize, Serialize};

/// Id reported for every created blueprint.
pub const NEW_BLUEPRINT_ID: &str = "new";

/// Name used when a create request omits one.
pub const DEFAULT_BLUEPRINT_NAME: &str = "nuevo";

/// Summary view of a blueprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlueprintSummary {
    pub id: String,
    pub name: String,
}

impl BlueprintSummary {
    fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateBlueprintRequest {
    #[serde(default)]
    pub name: Option<String>,
}

/// All blueprints, in listing order.
pub fn catalog() -> Vec<BlueprintSummary> {
    vec![
        BlueprintSummary::new("b1", "Casa de campo"),
        BlueprintSummary::new("b2", "Edificio urbano"),
    ]
}

/// Build the record returned for a create request. Nothing is stored.
pub fn create(request: CreateBlueprintRequest) -> BlueprintSummary {
    BlueprintSummary {
        id: NEW_BLUEPRINT_ID.to_string(),
        name: request
            .name
            .unwrap_or_else(|| DEFAULT_BLUEPRINT_NAME.to_string()),
    }
}
