//! Prometheus-compatible metrics exporter for factory-health
//!
//! Endpoint: GET /metrics (on the web port, default 3001)

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use dashmap::DashMap;

use crate::health::calculator::MachineHealth;
use crate::health::engine::HealthEngine;
use crate::health::handler::Evaluation;
use crate::health::types::MachineType;

/// Running numbers for one machine type
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineTally {
    pub evaluations: u64,
    pub last_score: f64,
    pub score_sum: f64,
}

/// Counters updated from request processing
pub struct MetricsCounters {
    /// Scoring requests received
    pub requests_total: AtomicU64,
    /// Requests rejected as malformed
    pub rejected_total: AtomicU64,
    /// Machines scored (including unknown ones)
    pub machines_total: AtomicU64,
    /// Machines whose type was not in the threshold table
    pub unknown_machines: AtomicU64,
    /// Readings dropped because the part was not recognized
    pub unknown_parts: AtomicU64,
    /// Per-machine-type tallies (known types only, keeps label cardinality fixed)
    pub machines: DashMap<MachineType, MachineTally>,
    /// Last factory score, stored as f64 bits
    last_factory_bits: AtomicU64,
    /// Evaluation latency sum (in microseconds, for computing average)
    pub latency_sum_us: AtomicU64,
    /// Server start time
    pub start_time: Instant,
}

impl MetricsCounters {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            rejected_total: AtomicU64::new(0),
            machines_total: AtomicU64::new(0),
            unknown_machines: AtomicU64::new(0),
            unknown_parts: AtomicU64::new(0),
            machines: DashMap::new(),
            last_factory_bits: AtomicU64::new(0f64.to_bits()),
            latency_sum_us: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_rejected(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evaluation(&self, evaluation: &Evaluation, latency_us: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        self.last_factory_bits.store(evaluation.factory_score.to_bits(), Ordering::Relaxed);

        for outcome in &evaluation.machines {
            self.machines_total.fetch_add(1, Ordering::Relaxed);
            match outcome.health {
                MachineHealth::UnknownMachine => {
                    self.unknown_machines.fetch_add(1, Ordering::Relaxed);
                }
                MachineHealth::Score { value, unknown_parts, .. } => {
                    self.unknown_parts.fetch_add(unknown_parts as u64, Ordering::Relaxed);
                    if let Some(machine) = MachineType::from_name(&outcome.machine) {
                        let mut tally = self.machines.entry(machine).or_default();
                        tally.evaluations += 1;
                        tally.last_score = value;
                        tally.score_sum += value;
                    }
                }
            }
        }
    }

    pub fn last_factory_score(&self) -> f64 {
        f64::from_bits(self.last_factory_bits.load(Ordering::Relaxed))
    }

    pub fn tally(&self, machine: MachineType) -> Option<MachineTally> {
        self.machines.get(&machine).map(|t| *t)
    }
}

impl Default for MetricsCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate Prometheus-format metrics text
pub fn render_metrics(engine: &HealthEngine) -> String {
    let mut out = String::with_capacity(4096);
    let c = &engine.metrics;

    let uptime = c.start_time.elapsed().as_secs_f64();
    write_help_type(&mut out, "factory_health_up", "Whether the scoring service is up.", "gauge");
    writeln!(out, "factory_health_up 1").ok();

    write_help_type(&mut out, "factory_health_uptime_seconds_total", "Uptime since service start in seconds.", "counter");
    writeln!(out, "factory_health_uptime_seconds_total {:.3}", uptime).ok();

    // ──────────────────────────────────────────────
    // Requests
    // ──────────────────────────────────────────────
    let requests = c.requests_total.load(Ordering::Relaxed);
    let rejected = c.rejected_total.load(Ordering::Relaxed);
    write_help_type(&mut out, "factory_health_requests_total", "Total scoring requests received.", "counter");
    writeln!(out, "factory_health_requests_total {}", requests).ok();

    write_help_type(&mut out, "factory_health_rejected_total", "Total scoring requests rejected as malformed.", "counter");
    writeln!(out, "factory_health_rejected_total {}", rejected).ok();

    let evaluated = requests.saturating_sub(rejected);
    let latency_avg = if evaluated > 0 {
        (c.latency_sum_us.load(Ordering::Relaxed) as f64 / evaluated as f64) / 1_000_000.0 // us → seconds
    } else {
        0.0
    };
    write_help_type(&mut out, "factory_health_evaluation_seconds_avg", "Average time to score one request.", "gauge");
    writeln!(out, "factory_health_evaluation_seconds_avg {:.6}", latency_avg).ok();

    // ──────────────────────────────────────────────
    // Machines and parts
    // ──────────────────────────────────────────────
    write_help_type(&mut out, "factory_health_machines_total", "Total machines scored.", "counter");
    writeln!(out, "factory_health_machines_total {}", c.machines_total.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "factory_health_unknown_machines_total", "Total machines with a type missing from the threshold table.", "counter");
    writeln!(out, "factory_health_unknown_machines_total {}", c.unknown_machines.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "factory_health_unknown_parts_total", "Total readings dropped for an unrecognized part.", "counter");
    writeln!(out, "factory_health_unknown_parts_total {}", c.unknown_parts.load(Ordering::Relaxed)).ok();

    write_help_type(&mut out, "factory_health_machine_evaluations_total", "Evaluations per machine type.", "counter");
    for machine in MachineType::ALL {
        if let Some(t) = c.tally(machine) {
            writeln!(out, "factory_health_machine_evaluations_total{{machine=\"{}\"}} {}", machine, t.evaluations).ok();
        }
    }

    write_help_type(&mut out, "factory_health_machine_score", "Last health score per machine type (0-100).", "gauge");
    for machine in MachineType::ALL {
        if let Some(t) = c.tally(machine) {
            writeln!(out, "factory_health_machine_score{{machine=\"{}\"}} {:.4}", machine, t.last_score).ok();
        }
    }

    write_help_type(&mut out, "factory_health_factory_score", "Last factory score (0-100).", "gauge");
    writeln!(out, "factory_health_factory_score {:.4}", c.last_factory_score()).ok();

    // ──────────────────────────────────────────────
    // Journal
    // ──────────────────────────────────────────────
    let journal_stats = engine.journal.get_stats();
    write_help_type(&mut out, "factory_health_journal_entries", "Evaluations currently held in the journal.", "gauge");
    writeln!(out, "factory_health_journal_entries {}", journal_stats["current_entries"].as_u64().unwrap_or(0)).ok();

    write_help_type(&mut out, "factory_health_build_info", "factory-health build information.", "gauge");
    writeln!(out, "factory_health_build_info{{version=\"{}\"}} 1", env!("CARGO_PKG_VERSION")).ok();

    out
}

// ── helpers ─────────────────────────────────────────

fn write_help_type(out: &mut String, name: &str, help: &str, metric_type: &str) {
    writeln!(out, "# HELP {} {}", name, help).ok();
    writeln!(out, "# TYPE {} {}", name, metric_type).ok();
}
