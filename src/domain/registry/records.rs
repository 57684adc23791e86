//! Organization, cluster and bundle records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::foundation::ValidationError;

/// Checks a resource name used as a path segment.
///
/// Names must be non-empty and must not contain `/` or whitespace, so that
/// they always occupy exactly one path segment.
pub fn validate_name(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    if value.contains('/') {
        return Err(ValidationError::invalid_format(field, "must not contain '/'"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(ValidationError::invalid_format(field, "must not contain whitespace"));
    }
    Ok(())
}

/// Top-level tenant.
#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub name: String,
    pub description: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        creator: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("name", &name)?;
        let now = Utc::now();
        Ok(Self {
            name,
            description: description.into(),
            creator: creator.into(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.updated_at = Utc::now();
    }
}

/// A deployment target owned by an organization.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub name: String,
    pub organization: String,
    pub description: String,
    /// Kubeconfig used to reach the cluster; never echoed back.
    #[serde(skip)]
    pub kube_config: Option<String>,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cluster {
    pub fn new(
        organization: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        creator: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("name", &name)?;
        let now = Utc::now();
        Ok(Self {
            name,
            organization: organization.into(),
            description: description.into(),
            kube_config: None,
            creator: creator.into(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn with_kube_config(mut self, kube_config: Option<String>) -> Self {
        self.kube_config = kube_config;
        self
    }

    pub fn update(&mut self, description: Option<String>, kube_config: Option<String>) {
        if let Some(description) = description {
            self.description = description;
        }
        if kube_config.is_some() {
            self.kube_config = kube_config;
        }
        self.updated_at = Utc::now();
    }
}

/// A named model bundle inside a cluster.
#[derive(Debug, Clone, Serialize)]
pub struct Bundle {
    pub name: String,
    pub organization: String,
    pub cluster: String,
    pub description: String,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bundle {
    pub fn new(
        organization: impl Into<String>,
        cluster: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        creator: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        validate_name("name", &name)?;
        let now = Utc::now();
        Ok(Self {
            name,
            organization: organization.into(),
            cluster: cluster.into(),
            description: description.into(),
            creator: creator.into(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.updated_at = Utc::now();
    }
}
