//! Domain type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Delegation state of a domain's remote zone.
///
/// Zone provisioning only ever writes `Pending` (and `Failed` during orphan
/// cleanup). `Completed` belongs to the delegation-verification process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelegationStatus {
    Pending,
    Completed,
    Failed,
}

impl DelegationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for DelegationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DelegationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown delegation status: {other}")),
        }
    }
}

/// A locally owned domain, optionally linked to a remote zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: i64,
    /// Canonical name: lowercase, no trailing dot. Unique.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_zone_id: Option<String>,
    pub delegation_status: DelegationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_synced_at: Option<DateTime<Utc>>,
    /// Cached count of this domain's record rows.
    pub record_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Domain {
    /// The linked remote zone id, if any.
    pub fn zone_id(&self) -> Option<&str> {
        self.remote_zone_id.as_deref()
    }
}

/// Insert payload for a new domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDomain {
    pub name: String,
    pub remote_zone_id: Option<String>,
    pub delegation_status: DelegationStatus,
    pub zone_created_at: Option<DateTime<Utc>>,
}

impl NewDomain {
    /// A domain with no zone yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            remote_zone_id: None,
            delegation_status: DelegationStatus::Pending,
            zone_created_at: None,
        }
    }
}
