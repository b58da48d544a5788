//! Zone discovery results

use chrono::{DateTime, Utc};
use serde::Serialize;

use dns_reconciler_provider::RemoteZoneSummary;

use crate::validation::normalize_zone_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryAction {
    /// Exactly one zone owns the name.
    UseExisting,
    /// No zone owns the name.
    CreateNew,
    /// Several zones could own the name; ownership is not guessed.
    ManualReview,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneMatch {
    /// The zone name equals the domain name.
    Exact,
    /// The zone is a parent of the domain name.
    Parent,
}

/// A remote zone matched during discovery, name in trailing-dot form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredZone {
    pub id: String,
    pub name: String,
    pub record_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    pub match_kind: ZoneMatch,
}

impl DiscoveredZone {
    pub fn from_summary(zone: &RemoteZoneSummary, match_kind: ZoneMatch) -> Self {
        Self {
            id: zone.id.clone(),
            name: normalize_zone_name(&zone.name),
            record_count: zone.record_count,
            created_at: zone.created_at,
            match_kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResult {
    /// Domain name in trailing-dot form.
    pub domain: String,
    /// `true` only together with [`DiscoveryAction::UseExisting`].
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<DiscoveredZone>,
    pub candidates: Vec<DiscoveredZone>,
    pub action: DiscoveryAction,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
