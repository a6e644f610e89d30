use serde::{Deserialize, Serialize};

/// An item on the plan's shopping list. The name doubles as the key of the
/// product image cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub name: String,

    #[serde(default)]
    pub quantity: String,

    #[serde(default)]
    pub estimated_cost: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
