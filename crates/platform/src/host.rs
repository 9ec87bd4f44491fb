//! Host platform descriptor.

use serde::{Deserialize, Serialize};

/// First Android API level (6.0) where drawing over other apps needs a
/// runtime grant instead of an install-time manifest permission.
pub const OVERLAY_RUNTIME_GRANT_API_LEVEL: u32 = 23;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Android,
    Ios,
    #[default]
    Other,
}

impl Os {
    pub fn label(&self) -> &'static str {
        match self {
            Os::Android => "android",
            Os::Ios => "ios",
            Os::Other => "other",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The platform the coordinator is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Platform {
    pub os: Os,
    /// OS API level (Android SDK int). Zero when unknown or not applicable.
    #[serde(default)]
    pub api_level: u32,
}

impl Platform {
    pub fn android(api_level: u32) -> Self {
        Self {
            os: Os::Android,
            api_level,
        }
    }

    pub fn ios() -> Self {
        Self {
            os: Os::Ios,
            api_level: 0,
        }
    }

    pub fn other() -> Self {
        Self::default()
    }

    pub fn is_android(&self) -> bool {
        self.os == Os::Android
    }

    /// Whether the overlay permission has to be requested at runtime.
    ///
    /// Older Android releases grant it at install time from the manifest.
    pub fn requires_runtime_overlay_grant(&self) -> bool {
        self.is_android() && self.api_level >= OVERLAY_RUNTIME_GRANT_API_LEVEL
    }

    /// Whether notification channels exist on this platform.
    pub fn supports_notification_channels(&self) -> bool {
        self.is_android()
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.api_level > 0 {
            write!(f, "{} (api {})", self.os, self.api_level)
        } else {
            write!(f, "{}", self.os)
        }
    }
}
