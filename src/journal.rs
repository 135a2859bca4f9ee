use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::config::JournalConfig;
use crate::health::handler::Evaluation;

/// Evaluation Journal - recent scoring requests kept in memory
///
/// Lets an operator see what a machine scored over the last few requests.
/// Nothing is written to disk; entries beyond `max_entries` are rotated out.
#[derive(Debug, Clone, serde::Serialize)]
pub struct JournalEntry {
    pub timestamp: String,
    pub factory: String,
    pub machine_scores: IndexMap<String, String>,
    pub unknown_parts: usize,
    pub latency_us: u64,
}

pub struct Journal {
    config: JournalConfig,
    entries: RwLock<Vec<JournalEntry>>,
    total_recorded: AtomicU64,
}

impl Journal {
    pub fn new(config: &JournalConfig) -> Self {
        Self {
            config: config.clone(),
            entries: RwLock::new(Vec::new()),
            total_recorded: AtomicU64::new(0),
        }
    }

    /// Record one evaluation
    pub fn record(&self, evaluation: &Evaluation, latency: Duration) {
        if !self.config.enabled {
            return;
        }

        let entry = JournalEntry {
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            factory: evaluation.report.factory.clone(),
            machine_scores: evaluation.report.machine_scores.clone(),
            unknown_parts: evaluation.unknown_parts(),
            latency_us: latency.as_micros() as u64,
        };

        let mut entries = self.entries.write();
        entries.push(entry);
        self.total_recorded.fetch_add(1, Ordering::Relaxed);

        // Rotation: keep within max_entries
        if entries.len() > self.config.max_entries {
            let drain_count = entries.len() - self.config.max_entries;
            entries.drain(..drain_count);
            debug!("Journal rotated {} entries", drain_count);
        }
    }

    /// Search newest first, optionally only entries that scored `machine`
    pub fn search(&self, machine: Option<&str>, limit: usize) -> Vec<JournalEntry> {
        let entries = self.entries.read();
        entries.iter()
            .rev() // Most recent first
            .filter(|e| match machine {
                Some(m) => e.machine_scores.contains_key(m),
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub fn recent(&self, count: usize) -> Vec<JournalEntry> {
        self.search(None, count)
    }

    pub fn get_stats(&self) -> serde_json::Value {
        let entries = self.entries.read();
        serde_json::json!({
            "enabled": self.config.enabled,
            "current_entries": entries.len(),
            "max_entries": self.config.max_entries,
            "total_recorded": self.total_recorded.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownMachinePolicy;
    use crate::health::handler::get_machine_health;
    use serde_json::json;

    fn evaluation(machines: serde_json::Value) -> Evaluation {
        get_machine_health(&json!({ "machines": machines }), UnknownMachinePolicy::Zero).unwrap()
    }

    fn journal(max_entries: usize) -> Journal {
        Journal::new(&JournalConfig { enabled: true, max_entries })
    }

    #[test]
    fn test_records_newest_first() {
        let j = journal(10);
        j.record(&evaluation(json!({ "weldingRobot": { "errorRate": "0.05" } })), Duration::from_micros(5));
        j.record(&evaluation(json!({ "assemblyLine": { "speed": "10" } })), Duration::from_micros(7));

        let recent = j.recent(10);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].machine_scores.contains_key("assemblyLine"));
        assert_eq!(recent[0].latency_us, 7);
        assert_eq!(recent[1].factory, "100.00");
    }

    #[test]
    fn test_search_by_machine() {
        let j = journal(10);
        j.record(&evaluation(json!({ "weldingRobot": {} })), Duration::ZERO);
        j.record(&evaluation(json!({ "assemblyLine": {} })), Duration::ZERO);
        j.record(&evaluation(json!({ "weldingRobot": {}, "assemblyLine": {} })), Duration::ZERO);

        assert_eq!(j.search(Some("weldingRobot"), 10).len(), 2);
        assert_eq!(j.search(Some("paintingStation"), 10).len(), 0);
        assert_eq!(j.search(None, 1).len(), 1);
    }

    #[test]
    fn test_rotation_keeps_newest() {
        let j = journal(2);
        for value in ["0.05", "0.82", "2.5"] {
            j.record(&evaluation(json!({ "weldingRobot": { "errorRate": value } })), Duration::ZERO);
        }
        let entries = j.recent(10);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].factory, "0.00");
        assert_eq!(entries[1].factory, "50.00");
        assert_eq!(j.get_stats()["total_recorded"], 3);
    }

    #[test]
    fn test_disabled_journal_records_nothing() {
        let j = Journal::new(&JournalConfig { enabled: false, max_entries: 10 });
        j.record(&evaluation(json!({})), Duration::ZERO);
        assert!(j.recent(10).is_empty());
        assert_eq!(j.get_stats()["total_recorded"], 0);
    }
}
