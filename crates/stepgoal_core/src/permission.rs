//! Runtime permission state for scanner and step tracking.
//!
//! # Invariants
//! - Denials are logged and recorded; nothing here re-requests.
//! - A permission never observed reads as `Unknown`, which is not granted.

use log::{error, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Camera,
    ActivityRecognition,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::ActivityRecognition => "activity_recognition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    Granted,
    Denied,
    #[default]
    Unknown,
}

/// Last known grant state for each permission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PermissionGate {
    camera: PermissionStatus,
    activity_recognition: PermissionStatus,
}

impl PermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, permission: Permission) -> PermissionStatus {
        match permission {
            Permission::Camera => self.camera,
            Permission::ActivityRecognition => self.activity_recognition,
        }
    }

    pub fn is_granted(&self, permission: Permission) -> bool {
        self.status(permission) == PermissionStatus::Granted
    }

    /// Records a request result from the host.
    pub fn record(&mut self, permission: Permission, granted: bool) -> PermissionStatus {
        let status = if granted {
            info!(
                "event=permission_result module=permission status=granted permission={}",
                permission.as_str()
            );
            PermissionStatus::Granted
        } else {
            error!(
                "event=permission_result module=permission status=denied permission={}",
                permission.as_str()
            );
            PermissionStatus::Denied
        };

        match permission {
            Permission::Camera => self.camera = status,
            Permission::ActivityRecognition => self.activity_recognition = status,
        }
        status
    }
}
