use std::time::{Duration, SystemTime};

use serde::Serialize;
use sysinfo::System;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub scored: u64,
    pub failed: u64,
    pub uptime: String,
    pub health: SystemHealth,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemHealth {
    pub cpu_percent: f32,
    pub memory_mb: u64,
    pub memory_percent: f32,
}

#[derive(Debug, Default)]
struct RequestCounters {
    scored: u64,
    failed: u64,
}

pub struct TelemetryStore {
    start_time: SystemTime,
    counters: Mutex<RequestCounters>,
    system: Mutex<System>,
}

impl TelemetryStore {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();

        TelemetryStore {
            start_time: SystemTime::now(),
            counters: Mutex::new(RequestCounters::default()),
            system: Mutex::new(system),
        }
    }

    pub async fn record_scored(&self) {
        let mut counters = self.counters.lock().await;
        counters.scored = counters.scored.saturating_add(1);
    }

    pub async fn record_failed(&self) {
        let mut counters = self.counters.lock().await;
        counters.failed = counters.failed.saturating_add(1);
    }

    pub async fn snapshot(&self) -> StatsSnapshot {
        let (scored, failed) = {
            let counters = self.counters.lock().await;
            (counters.scored, counters.failed)
        };

        StatsSnapshot {
            scored,
            failed,
            uptime: format_uptime(
                SystemTime::now()
                    .duration_since(self.start_time)
                    .unwrap_or(Duration::from_secs(0)),
            ),
            health: self.health_snapshot().await,
        }
    }

    async fn health_snapshot(&self) -> SystemHealth {
        let mut system = self.system.lock().await;
        system.refresh_cpu();
        system.refresh_memory();

        let cpu_percent = system.global_cpu_info().cpu_usage();
        let total_mem = system.total_memory();
        let used_mem = system.used_memory();
        let memory_percent = if total_mem > 0 {
            (used_mem as f32 / total_mem as f32) * 100.0
        } else {
            0.0
        };

        SystemHealth {
            cpu_percent,
            memory_mb: used_mem / 1024 / 1024,
            memory_percent,
        }
    }
}

fn format_uptime(duration: Duration) -> String {
    let total_minutes = duration.as_secs() / 60;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    format!("{}d {}h {}m", days, hours, minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats_days_hours_minutes() {
        let duration = Duration::from_secs(26 * 3600 + 5 * 60);
        assert_eq!(format_uptime(duration), "1d 2h 5m");
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 0h 0m");
    }

    #[tokio::test]
    async fn counters_accumulate() {
        let store = TelemetryStore::new();
        store.record_scored().await;
        store.record_scored().await;
        store.record_failed().await;

        let snapshot = store.snapshot().await;
        assert_eq!(snapshot.scored, 2);
        assert_eq!(snapshot.failed, 1);
    }
}
