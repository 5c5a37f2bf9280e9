use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{listing::ListingState, models::Order};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    /// Only orders in this status, e.g. `pending`.
    pub status: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<Order>,
    pub listing: ListingState,
}
