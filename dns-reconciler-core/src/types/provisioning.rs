//! Zone provisioning inputs and results

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateZoneOptions {
    /// Stored by providers that support zone comments.
    pub comment: Option<String>,
    /// Skip domain-name syntax validation.
    pub skip_validation: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneCreationResult {
    pub success: bool,
    pub domain_name: String,
    /// Set whenever the remote zone exists, including the orphaned case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_id: Option<String>,
    pub name_servers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CoreError>,
    pub warnings: Vec<String>,
}

impl ZoneCreationResult {
    pub fn failed(domain_name: impl Into<String>, error: CoreError) -> Self {
        Self {
            success: false,
            domain_name: domain_name.into(),
            zone_id: None,
            name_servers: Vec::new(),
            domain_id: None,
            error: Some(error),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchZoneCreationResult {
    pub results: Vec<ZoneCreationResult>,
    pub success_count: usize,
    pub failed_count: usize,
}
