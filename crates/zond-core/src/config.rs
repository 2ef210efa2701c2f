use serde::{Deserialize, Serialize};

/// Tracker configuration, immutable once the tracker is built.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Property id hits are reported against (`tid`), e.g. "UA-12345-6".
    #[serde(default)]
    pub tracking_id: String,
    /// Reporting domain sent as `dh`.
    #[serde(default)]
    pub domain: Option<String>,
    /// Application name sent as `an`.
    #[serde(default)]
    pub app_name: Option<String>,
    /// Application version sent as `av`.
    #[serde(default)]
    pub app_version: Option<String>,
    /// Externally supplied client id. When absent one is read from or
    /// created in the preference store.
    #[serde(default)]
    pub client_id: Option<String>,
}

impl TrackerConfig {
    /// Minimal configuration carrying just a property id.
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            ..Self::default()
        }
    }

    /// Set the reporting domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the application name and version attached to every hit.
    pub fn with_app(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self.app_version = Some(version.into());
        self
    }

    /// Use an externally managed client id instead of the persisted one.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }
}
