use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{listing::ListingState, models::CategoryWithParent};

/// Category create/edit form.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Default for CategoryForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            parent_id: None,
            is_active: true,
        }
    }
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<CategoryWithParent>,
    pub listing: ListingState,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ParentOptionsQuery {
    /// Category being edited; left out of the choices.
    pub exclude: Option<Uuid>,
}
