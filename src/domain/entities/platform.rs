use serde::{Deserialize, Serialize};

/// Execution environment the service was constructed for.
///
/// Detected once by the host at startup and passed in through the service
/// configuration; every component consults the capability gate rather than
/// re-detecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

impl Platform {
    pub fn is_native(&self) -> bool {
        !matches!(self, Platform::Web)
    }

    /// The app store backing this platform, if any.
    pub fn store(&self) -> Option<StorePlatform> {
        match self {
            Platform::Ios => Some(StorePlatform::Ios),
            Platform::Android => Some(StorePlatform::Android),
            Platform::Web => None,
        }
    }
}

/// Store a purchase originated from. A purchase made on the web fallback
/// path carries no store platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorePlatform {
    Ios,
    Android,
}
