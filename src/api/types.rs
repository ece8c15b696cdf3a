//! Cloud controller resource types

use serde::{Deserialize, Serialize};

/// Envelope around every cloud controller resource
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Resource<T> {
    pub metadata: Metadata,
    pub entity: T,
}

/// Resource metadata
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Metadata {
    pub guid: String,

    #[serde(default)]
    pub url: String,
}

/// One page of a resource listing
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResources<T> {
    /// Relative URL of the next page, if any
    #[serde(default)]
    pub next_url: Option<String>,

    #[serde(default = "Vec::new")]
    pub resources: Vec<Resource<T>>,
}

/// Error body returned by the cloud controller
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: i64,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub error_code: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BuildpackEntity {
    pub name: String,

    #[serde(default)]
    pub position: Option<i64>,

    #[serde(default)]
    pub enabled: Option<bool>,

    #[serde(default)]
    pub locked: Option<bool>,

    #[serde(default)]
    pub filename: Option<String>,
}

/// A buildpack as known to the platform
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buildpack {
    pub guid: String,
    pub name: String,
    pub position: Option<i64>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
    pub filename: Option<String>,
}

impl From<Resource<BuildpackEntity>> for Buildpack {
    fn from(resource: Resource<BuildpackEntity>) -> Self {
        Self {
            guid: resource.metadata.guid,
            name: resource.entity.name,
            position: resource.entity.position,
            enabled: resource.entity.enabled,
            locked: resource.entity.locked,
            filename: resource.entity.filename,
        }
    }
}

/// Partial buildpack update.
///
/// Only the fields that are `Some` are sent; `None` leaves the server value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildpackUpdate {
    #[serde(skip)]
    pub guid: String,

    #[serde(skip)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked: Option<bool>,
}

impl BuildpackUpdate {
    /// Start an empty update for `buildpack`
    pub fn for_buildpack(buildpack: &Buildpack) -> Self {
        Self {
            guid: buildpack.guid.clone(),
            name: buildpack.name.clone(),
            ..Default::default()
        }
    }

    /// Whether any field was requested
    pub fn has_changes(&self) -> bool {
        self.position.is_some() || self.enabled.is_some() || self.locked.is_some()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct QuotaEntity {
    pub name: String,

    #[serde(default)]
    pub memory_limit: i64,

    #[serde(default)]
    pub total_routes: i64,

    #[serde(default)]
    pub total_services: i64,

    #[serde(default)]
    pub non_basic_services_allowed: bool,
}

/// A named bundle of resource limits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quota {
    pub guid: String,
    pub name: String,
    /// Memory limit in megabytes
    pub memory_limit: i64,
    pub routes_limit: i64,
    pub services_limit: i64,
    pub non_basic_services_allowed: bool,
}

impl From<Resource<QuotaEntity>> for Quota {
    fn from(resource: Resource<QuotaEntity>) -> Self {
        Self {
            guid: resource.metadata.guid,
            name: resource.entity.name,
            memory_limit: resource.entity.memory_limit,
            routes_limit: resource.entity.total_routes,
            services_limit: resource.entity.total_services,
            non_basic_services_allowed: resource.entity.non_basic_services_allowed,
        }
    }
}

impl From<&Quota> for QuotaEntity {
    fn from(quota: &Quota) -> Self {
        Self {
            name: quota.name.clone(),
            memory_limit: quota.memory_limit,
            total_routes: quota.routes_limit,
            total_services: quota.services_limit,
            non_basic_services_allowed: quota.non_basic_services_allowed,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SecurityGroupEntity {
    pub name: String,

    #[serde(default)]
    pub rules: Vec<serde_json::Value>,
}

/// A named set of egress rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityGroup {
    pub guid: String,
    pub name: String,
    pub rules: Vec<serde_json::Value>,
}

impl From<Resource<SecurityGroupEntity>> for SecurityGroup {
    fn from(resource: Resource<SecurityGroupEntity>) -> Self {
        Self {
            guid: resource.metadata.guid,
            name: resource.entity.name,
            rules: resource.entity.rules,
        }
    }
}
