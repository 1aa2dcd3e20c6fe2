//! ダッシュボード向けテレメトリ
//!
//! ホスト状態は `sysinfo` から取得し、それ以外のカウンター・アラート・
//! ログはプレースホルダーです。

pub mod sample;
pub mod settings;
pub mod system;

pub use sample::{DashboardMetrics, NetworkAnalysis, NetworkStats};
pub use settings::{DashboardSettings, SettingsStore, SettingsUpdate};
pub use system::SystemStatus;
