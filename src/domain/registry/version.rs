//! Bundle versions and their upload lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{validate_name, RegistryError};

/// Upload state of a bundle version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    #[default]
    Pending,
    Uploading,
    Success,
    Failed,
}

impl UploadStatus {
    /// Validates a transition from this status to another.
    ///
    /// Valid transitions:
    /// - Pending -> Uploading
    /// - Failed -> Uploading (retry)
    /// - Uploading -> Success
    /// - Uploading -> Failed
    pub fn can_transition_to(&self, target: &UploadStatus) -> bool {
        use UploadStatus::*;
        matches!(
            (self, target),
            (Pending, Uploading) | (Failed, Uploading) | (Uploading, Success) | (Uploading, Failed)
        )
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UploadStatus::Pending => "pending",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Success => "success",
            UploadStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// One immutable build of a bundle.
#[derive(Debug, Clone, Serialize)]
pub struct BundleVersion {
    pub version: String,
    pub organization: String,
    pub cluster: String,
    pub bundle: String,
    pub description: String,
    pub upload_status: UploadStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_status_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_finished_at: Option<DateTime<Utc>>,
    pub creator: String,
    pub created_at: DateTime<Utc>,
}

impl BundleVersion {
    pub fn new(
        organization: impl Into<String>,
        cluster: impl Into<String>,
        bundle: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
        creator: impl Into<String>,
    ) -> Result<Self, RegistryError> {
        let version = version.into();
        validate_name("version", &version)?;
        Ok(Self {
            version,
            organization: organization.into(),
            cluster: cluster.into(),
            bundle: bundle.into(),
            description: description.into(),
            upload_status: UploadStatus::Pending,
            upload_status_reason: None,
            upload_started_at: None,
            upload_finished_at: None,
            creator: creator.into(),
            created_at: Utc::now(),
        })
    }

    /// Moves the version into `Uploading`.
    pub fn start_upload(&mut self) -> Result<(), RegistryError> {
        self.transition(UploadStatus::Uploading, "start uploading")?;
        self.upload_status_reason = None;
        self.upload_started_at = Some(Utc::now());
        self.upload_finished_at = None;
        Ok(())
    }

    /// Completes an upload with a terminal status.
    pub fn finish_upload(
        &mut self,
        status: UploadStatus,
        reason: Option<String>,
    ) -> Result<(), RegistryError> {
        if !matches!(status, UploadStatus::Success | UploadStatus::Failed) {
            return Err(RegistryError::InvalidUploadTransition {
                from: self.upload_status,
                action: "finish uploading",
            });
        }
        self.transition(status, "finish uploading")?;
        self.upload_status_reason = reason;
        self.upload_finished_at = Some(Utc::now());
        Ok(())
    }

    fn transition(&mut self, target: UploadStatus, action: &'static str) -> Result<(), RegistryError> {
        if !self.upload_status.can_transition_to(&target) {
            return Err(RegistryError::InvalidUploadTransition {
                from: self.upload_status,
                action,
            });
        }
        self.upload_status = target;
        Ok(())
    }
}
