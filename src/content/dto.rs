use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AlternativesQuery {
    pub product: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AlternativesResponse {
    pub alternatives: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TipsResponse {
    pub tips: Vec<String>,
}
