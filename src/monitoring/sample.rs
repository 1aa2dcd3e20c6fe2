//! Placeholder telemetry
//!
//! Nothing here is measured. Counters are drawn from fixed ranges so the
//! dashboard has something to render. `/metrics` values are seeded by the
//! UTC hour and stay put within that hour; network samples are fresh on
//! every call.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 1時間単位のシード値
pub fn hour_bucket(now: DateTime<Utc>) -> u64 {
    now.timestamp().max(0) as u64 / 3600
}

/// ダッシュボードのサマリーカウンター
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub anomaly_count: u32,
    pub attack_count: u32,
    pub system_health: u32,
    pub active_users: u32,
    pub total_packets: u64,
    pub suspicious_flows: u32,
    pub blocked_requests: u32,
    pub bandwidth_usage: u32,
}

impl DashboardMetrics {
    /// Deterministic sample for one hour bucket
    pub fn for_hour(bucket: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(bucket);
        Self {
            anomaly_count: rng.gen_range(8..=25),
            attack_count: rng.gen_range(3..=12),
            system_health: rng.gen_range(95..=100),
            active_users: rng.gen_range(15..=35),
            total_packets: rng.gen_range(1_000_000..=2_000_000),
            suspicious_flows: rng.gen_range(15..=45),
            blocked_requests: rng.gen_range(5..=20),
            bandwidth_usage: rng.gen_range(500..=1200),
        }
    }

    pub fn current() -> Self {
        Self::for_hour(hour_bucket(Utc::now()))
    }
}

/// `/api/network/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_packets: u32,
    pub suspicious_flows: u32,
    pub blocked_requests: u32,
    pub bandwidth_usage: f64,
}

impl NetworkStats {
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        Self {
            total_packets: rng.gen_range(100..=1000),
            suspicious_flows: rng.gen_range(0..=5),
            blocked_requests: rng.gen_range(0..=3),
            bandwidth_usage: rng.gen_range(100.0..1000.0),
        }
    }
}

pub const NETWORK_LABELS: [&str; 4] = ["Normal", "DDoS", "Malware", "Unknown"];

/// `/api/network/analyze`
///
/// The attack flag and label are drawn independently of each other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkAnalysis {
    pub flow_bytes_per_second: f64,
    pub packet_length_std: f64,
    pub flow_packets_per_second: f64,
    pub attack: bool,
    pub label: String,
}

impl NetworkAnalysis {
    pub fn sample<R: Rng>(rng: &mut R) -> Self {
        let label = NETWORK_LABELS.choose(rng).copied().unwrap_or("Unknown");
        Self {
            flow_bytes_per_second: rng.gen_range(500.0..2500.0),
            packet_length_std: rng.gen_range(20.0..120.0),
            flow_packets_per_second: rng.gen_range(5.0..55.0),
            attack: rng.gen_bool(0.5),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub timestamp: String,
    pub source: String,
    pub status: String,
}

pub fn alerts() -> Vec<Alert> {
    vec![
        Alert {
            id: 1,
            kind: "critical".to_string(),
            title: "DDoS Attack Detected".to_string(),
            description: "Large volume of traffic detected from multiple IP addresses."
                .to_string(),
            timestamp: "2024-01-15T10:30:00Z".to_string(),
            source: "Network Monitor".to_string(),
            status: "active".to_string(),
        },
        Alert {
            id: 2,
            kind: "warning".to_string(),
            title: "High CPU Usage".to_string(),
            description: "Server-03 CPU usage exceeded 90% for the last 10 minutes.".to_string(),
            timestamp: "2024-01-15T10:15:00Z".to_string(),
            source: "System Monitor".to_string(),
            status: "active".to_string(),
        },
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub source: String,
}

impl LogEntry {
    fn new(timestamp: &str, level: &str, message: &str, source: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            level: level.to_string(),
            message: message.to_string(),
            source: source.to_string(),
        }
    }
}

pub fn logs() -> Vec<LogEntry> {
    vec![
        LogEntry::new("2024-01-15T10:45:00Z", "INFO", "User admin logged in successfully", "auth"),
        LogEntry::new(
            "2024-01-15T10:44:30Z",
            "WARNING",
            "High CPU usage detected on server-03",
            "monitor",
        ),
        LogEntry::new("2024-01-15T10:44:00Z", "INFO", "Security scan completed successfully", "scanner"),
    ]
}
