use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::HealthError;
use crate::health::handler::{get_machine_health, HealthReport};
use crate::health::thresholds;
use crate::health::types::MachineType;
use crate::journal::Journal;
use crate::metrics::MetricsCounters;

/// Core scoring engine - wraps the request handler with journal and metrics
pub struct HealthEngine {
    pub config: Arc<Config>,
    pub journal: Arc<Journal>,
    pub metrics: Arc<MetricsCounters>,
}

impl HealthEngine {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        thresholds::validate()?;
        let part_count: usize = MachineType::ALL.iter().map(|m| m.parts().len()).sum();
        info!(
            "Threshold table loaded: {} machine types, {} part types",
            MachineType::ALL.len(),
            part_count
        );

        let journal = Arc::new(Journal::new(&config.journal));
        Ok(Self {
            config: Arc::new(config),
            journal,
            metrics: Arc::new(MetricsCounters::new()),
        })
    }

    /// Score a raw request body
    pub fn evaluate(&self, body: &[u8]) -> Result<HealthReport, HealthError> {
        let start = Instant::now();

        let evaluation = serde_json::from_slice::<serde_json::Value>(body)
            .map_err(|e| {
                debug!("Request body is not JSON: {}", e);
                HealthError::InvalidInput
            })
            .and_then(|value| get_machine_health(&value, self.config.scoring.unknown_machine));

        let evaluation = match evaluation {
            Ok(e) => e,
            Err(e) => {
                warn!("Rejected scoring request: {}", e);
                self.metrics.record_rejected();
                return Err(e);
            }
        };

        let elapsed = start.elapsed();
        for outcome in &evaluation.machines {
            debug!(
                "Machine {}: {:?} (included: {})",
                outcome.machine, outcome.health, outcome.included
            );
        }
        let unknown_machines = evaluation.unknown_machines();
        if unknown_machines > 0 {
            warn!("{} machine(s) with unknown type in request", unknown_machines);
        }
        info!(
            "Scored {} machine(s), factory {} in {}us",
            evaluation.machines.len(),
            evaluation.report.factory,
            elapsed.as_micros()
        );

        self.metrics.record_evaluation(&evaluation, elapsed.as_micros() as u64);
        self.journal.record(&evaluation, elapsed);

        Ok(evaluation.report)
    }

    /// Machine types, their parts and reference bands, for client pickers
    pub fn catalog(&self) -> serde_json::Value {
        let machines: Vec<serde_json::Value> = MachineType::ALL
            .iter()
            .map(|machine| {
                let parts: Vec<serde_json::Value> = machine
                    .parts()
                    .iter()
                    .map(|part| {
                        let t = part.thresholds();
                        serde_json::json!({
                            "name": part.name(),
                            "unit": t.unit,
                            "optimal": t.optimal,
                            "normal": t.normal,
                            "abnormal": t.abnormal,
                        })
                    })
                    .collect();
                serde_json::json!({ "name": machine.name(), "parts": parts })
            })
            .collect();
        serde_json::json!({ "machines": machines })
    }

    pub fn stats(&self) -> serde_json::Value {
        use std::sync::atomic::Ordering;

        let m = &self.metrics;
        let machines: serde_json::Map<String, serde_json::Value> = MachineType::ALL
            .iter()
            .filter_map(|machine| {
                m.tally(*machine).map(|t| {
                    let avg = if t.evaluations > 0 { t.score_sum / t.evaluations as f64 } else { 0.0 };
                    (
                        machine.name().to_string(),
                        serde_json::json!({
                            "evaluations": t.evaluations,
                            "last_score": t.last_score,
                            "avg_score": avg,
                        }),
                    )
                })
            })
            .collect();

        serde_json::json!({
            "uptime_secs": m.start_time.elapsed().as_secs(),
            "requests_total": m.requests_total.load(Ordering::Relaxed),
            "rejected_total": m.rejected_total.load(Ordering::Relaxed),
            "machines_total": m.machines_total.load(Ordering::Relaxed),
            "unknown_machines": m.unknown_machines.load(Ordering::Relaxed),
            "unknown_parts": m.unknown_parts.load(Ordering::Relaxed),
            "last_factory_score": m.last_factory_score(),
            "machines": machines,
            "journal": self.journal.get_stats(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownMachinePolicy;

    fn engine() -> HealthEngine {
        HealthEngine::new(Config::default()).unwrap()
    }

    #[test]
    fn test_evaluate_records_journal_and_metrics() {
        let engine = engine();
        let report = engine
            .evaluate(br#"{"machines":{"weldingRobot":{"errorRate":"0.5"}}}"#)
            .unwrap();
        assert_eq!(report.factory, "72.22");

        let stats = engine.stats();
        assert_eq!(stats["requests_total"], 1);
        assert_eq!(stats["machines"]["weldingRobot"]["evaluations"], 1);
        assert_eq!(engine.journal.recent(5).len(), 1);
    }

    #[test]
    fn test_evaluate_rejects_bad_bodies() {
        let engine = engine();
        assert_eq!(engine.evaluate(b"{}"), Err(HealthError::InvalidInput));
        assert_eq!(engine.evaluate(br#"{"machines":null}"#), Err(HealthError::InvalidInput));
        assert_eq!(engine.evaluate(b"not json"), Err(HealthError::InvalidInput));
        assert_eq!(engine.evaluate(b""), Err(HealthError::InvalidInput));

        let stats = engine.stats();
        assert_eq!(stats["rejected_total"], 4);
        assert!(engine.journal.recent(5).is_empty());
    }

    #[test]
    fn test_evaluate_uses_configured_policy() {
        let mut config = Config::default();
        config.scoring.unknown_machine = UnknownMachinePolicy::Exclude;
        let engine = HealthEngine::new(config).unwrap();

        let report = engine
            .evaluate(br#"{"machines":{"forklift":{},"assemblyLine":{"speed":"10"}}}"#)
            .unwrap();
        assert_eq!(report.factory, "100.00");
        assert_eq!(report.machine_scores.len(), 1);
        assert_eq!(engine.stats()["unknown_machines"], 1);
    }

    #[test]
    fn test_catalog_lists_every_machine() {
        let catalog = engine().catalog();
        let machines = catalog["machines"].as_array().unwrap();
        assert_eq!(machines.len(), 4);
        assert_eq!(machines[0]["name"], "weldingRobot");
        assert_eq!(machines[0]["parts"].as_array().unwrap().len(), 8);
        assert_eq!(machines[0]["parts"][0]["name"], "errorRate");
        assert_eq!(machines[0]["parts"][0]["optimal"]["max"], 0.1);
    }
}
