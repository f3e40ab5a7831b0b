//! Response types for API endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Challenges newly awarded by an evaluation.
#[derive(Debug, Serialize, ToSchema)]
pub struct EvaluateChallengesResponse {
    pub awarded: Vec<String>,
}

/// A rejected row of a collectible import, `row` counted from 1.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportRowError {
    pub row: usize,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportReport {
    pub imported: u64,
    pub errors: Vec<ImportRowError>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: String,
}

impl SuccessResponse {
    pub fn new(message: &str) -> Self {
        Self {
            success: message.to_string(),
        }
    }
}
