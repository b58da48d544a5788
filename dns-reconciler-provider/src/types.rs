use serde::{Deserialize, Serialize};

// ============ Provider Types ============

/// Identifies which DNS provider implementation to use.
///
/// Each variant is gated behind its corresponding feature flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    /// Cloudflare DNS. Requires feature `cloudflare`.
    #[cfg(feature = "cloudflare")]
    Cloudflare,
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare => write!(f, "cloudflare"),
        }
    }
}

/// Credentials for constructing a provider with [`create_provider`](crate::create_provider).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderCredentials {
    /// Cloudflare API token. `account_id` is only needed to create zones.
    #[cfg(feature = "cloudflare")]
    Cloudflare {
        #[serde(rename = "apiToken")]
        api_token: String,
        #[serde(rename = "accountId", default, skip_serializing_if = "Option::is_none")]
        account_id: Option<String>,
    },
}

impl ProviderCredentials {
    /// The provider these credentials belong to.
    pub fn provider_type(&self) -> ProviderType {
        match self {
            #[cfg(feature = "cloudflare")]
            Self::Cloudflare { .. } => ProviderType::Cloudflare,
        }
    }
}

// ============ Zone Types ============

/// Read-only projection of a remote zone, as returned by zone listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteZoneSummary {
    /// Provider-specific zone identifier.
    pub id: String,
    /// Zone name as reported by the provider (trailing dot optional).
    pub name: String,
    /// Number of records in the zone, if the provider reports it.
    pub record_count: u32,
    /// When the zone was created, if known.
    #[serde(with = "crate::utils::datetime", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Full detail of a single remote zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDetail {
    /// Provider-specific zone identifier.
    pub id: String,
    /// Zone name.
    pub name: String,
    /// Number of records in the zone.
    pub record_count: u32,
    /// When the zone was created, if known.
    #[serde(with = "crate::utils::datetime", default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    /// Private (VPC-internal) zone.
    pub private_zone: bool,
    /// Authoritative name servers assigned to the zone.
    pub name_servers: Vec<String>,
    /// Free-form comment attached at creation, if the provider keeps one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ZoneDetail {
    /// Project the detail onto a [`RemoteZoneSummary`].
    pub fn summary(&self) -> RemoteZoneSummary {
        RemoteZoneSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            record_count: self.record_count,
            created_at: self.created_at,
        }
    }
}

/// Result of a successful remote zone creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedZone {
    /// Provider-specific identifier of the new zone.
    pub zone_id: String,
    /// Name servers the domain must be delegated to.
    pub name_servers: Vec<String>,
}

// ============ DNS Record Types ============

/// DNS record type identifier.
///
/// Serialized as uppercase strings (`"A"`, `"AAAA"`, `"CNAME"`, etc.).
/// `NS` and `SOA` exist so that provider-managed entries can be recognized and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    /// IPv4 address record.
    A,
    /// IPv6 address record.
    Aaaa,
    /// Canonical name (alias) record.
    Cname,
    /// Mail exchange record.
    Mx,
    /// Text record.
    Txt,
    /// Service locator record.
    Srv,
    /// Pointer (reverse lookup) record.
    Ptr,
    /// Name server record (provider-managed at the apex).
    Ns,
    /// Start of authority record (provider-managed).
    Soa,
}

impl DnsRecordType {
    /// Every record type this workspace knows about.
    pub const ALL: [Self; 9] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Mx,
        Self::Txt,
        Self::Srv,
        Self::Ptr,
        Self::Ns,
        Self::Soa,
    ];

    /// Uppercase wire name (`"AAAA"` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Srv => "SRV",
            Self::Ptr => "PTR",
            Self::Ns => "NS",
            Self::Soa => "SOA",
        }
    }

    /// SOA and NS entries belong to the provider and are never mirrored.
    pub fn is_provider_managed(self) -> bool {
        matches!(self, Self::Ns | Self::Soa)
    }
}

impl std::fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DnsRecordType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| format!("unknown record type: {s}"))
    }
}

/// A record as exchanged with the remote provider.
///
/// `name` is relative to the zone (`"@"` for the apex). `value` uses the textual
/// presentation form: MX is `"<priority> <exchange>"`, SRV is
/// `"<priority> <weight> <port> <target>"`, everything else is the bare value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRecord {
    /// Relative record name.
    pub name: String,
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: DnsRecordType,
    /// Presentation-form value.
    pub value: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// MX/SRV priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    /// SRV weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u16>,
}

impl RemoteRecord {
    /// Convenience constructor for records without priority/weight.
    pub fn new(
        name: impl Into<String>,
        record_type: DnsRecordType,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            name: name.into(),
            record_type,
            value: value.into(),
            ttl,
            priority: None,
            weight: None,
        }
    }

    /// Identity used when matching against other record sets: `(name, type)`.
    pub fn key(&self) -> (String, DnsRecordType) {
        (self.name.to_ascii_lowercase(), self.record_type)
    }
}
