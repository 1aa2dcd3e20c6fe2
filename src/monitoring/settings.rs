//! ダッシュボード設定 (プロセス内のみ保持)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSettings {
    pub anomaly_threshold: f64,
    pub network_sensitivity: String,
    pub real_time_analysis: bool,
    pub auto_learning: bool,
    /// Minutes
    pub session_timeout: u32,
    pub max_login_attempts: u32,
    pub two_factor_auth: bool,
    pub dark_mode: bool,
    pub auto_refresh: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            anomaly_threshold: 0.0025,
            network_sensitivity: "medium".to_string(),
            real_time_analysis: true,
            auto_learning: true,
            session_timeout: 30,
            max_login_attempts: 5,
            two_factor_auth: false,
            dark_mode: true,
            auto_refresh: true,
        }
    }
}

/// Partial update; absent keys keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsUpdate {
    pub anomaly_threshold: Option<f64>,
    pub network_sensitivity: Option<String>,
    pub real_time_analysis: Option<bool>,
    pub auto_learning: Option<bool>,
    pub session_timeout: Option<u32>,
    pub max_login_attempts: Option<u32>,
    pub two_factor_auth: Option<bool>,
    pub dark_mode: Option<bool>,
    pub auto_refresh: Option<bool>,
}

impl SettingsUpdate {
    /// Parse a request body; anything but a JSON object with well-typed
    /// known keys is rejected. Unknown keys are ignored.
    pub fn from_json(body: &Value) -> Option<Self> {
        if !body.is_object() {
            return None;
        }
        serde_json::from_value(body.clone()).ok()
    }
}

impl DashboardSettings {
    pub fn apply(&mut self, update: SettingsUpdate) {
        macro_rules! merge {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = update.$field {
                    self.$field = value;
                })*
            };
        }

        merge!(
            anomaly_threshold,
            network_sensitivity,
            real_time_analysis,
            auto_learning,
            session_timeout,
            max_login_attempts,
            two_factor_auth,
            dark_mode,
            auto_refresh,
        );
    }
}

/// Shared settings handle
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    inner: Arc<RwLock<DashboardSettings>>,
}

impl SettingsStore {
    pub fn new(settings: DashboardSettings) -> Self {
        Self {
            inner: Arc::new(RwLock::new(settings)),
        }
    }

    pub async fn get(&self) -> DashboardSettings {
        self.inner.read().await.clone()
    }

    pub async fn update(&self, update: SettingsUpdate) -> DashboardSettings {
        let mut settings = self.inner.write().await;
        settings.apply(update);
        settings.clone()
    }
}
