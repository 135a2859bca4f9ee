use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::config::UnknownMachinePolicy;
use crate::error::HealthError;
use crate::health::calculator::{calculate_machine_health, MachineHealth};
use crate::health::types::PartReading;

/// Response body of the scoring endpoint. Scores are two-decimal strings and
/// machine keys keep the order they had in the request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub factory: String,
    pub machine_scores: IndexMap<String, String>,
}

/// Per-machine result kept alongside the report for logging and metrics
#[derive(Debug, Clone, PartialEq)]
pub struct MachineOutcome {
    pub machine: String,
    pub health: MachineHealth,
    /// Whether the machine counted towards the factory score
    pub included: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub report: HealthReport,
    pub factory_score: f64,
    pub machines: Vec<MachineOutcome>,
}

impl Evaluation {
    pub fn unknown_parts(&self) -> usize {
        self.machines.iter().map(|m| m.health.unknown_parts()).sum()
    }

    pub fn unknown_machines(&self) -> usize {
        self.machines
            .iter()
            .filter(|m| m.health == MachineHealth::UnknownMachine)
            .count()
    }
}

/// Score every machine in a `{"machines": {...}}` body.
pub fn get_machine_health(body: &Value, policy: UnknownMachinePolicy) -> Result<Evaluation, HealthError> {
    let machines = body
        .get("machines")
        .and_then(Value::as_object)
        .ok_or(HealthError::InvalidInput)?;

    let mut outcomes = Vec::with_capacity(machines.len());
    let mut machine_scores = IndexMap::with_capacity(machines.len());
    let mut total = 0.0;
    let mut counted = 0;

    for (machine, parts) in machines {
        let readings = readings_from(parts);
        let health = calculate_machine_health(machine, &readings);

        let included = !(health == MachineHealth::UnknownMachine && policy == UnknownMachinePolicy::Exclude);
        if included {
            let score = health.score();
            total += score;
            counted += 1;
            machine_scores.insert(machine.clone(), format_score(score));
        }

        outcomes.push(MachineOutcome {
            machine: machine.clone(),
            health,
            included,
        });
    }

    let factory_score = if counted == 0 { 0.0 } else { total / counted as f64 };

    Ok(Evaluation {
        report: HealthReport {
            factory: format_score(factory_score),
            machine_scores,
        },
        factory_score,
        machines: outcomes,
    })
}

/// Part map of one machine → readings, in request order.
/// Anything other than an object yields no readings.
fn readings_from(parts: &Value) -> Vec<PartReading> {
    match parts {
        Value::Object(map) => map
            .iter()
            .map(|(name, raw)| PartReading::new(name.as_str(), reading_value(raw)))
            .collect(),
        _ => Vec::new(),
    }
}

fn reading_value(raw: &Value) -> f64 {
    match raw {
        Value::String(s) => parse_float(s),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

/// Two-decimal string. Exact half-cent ties round away from zero and
/// negative zero prints as "0.00".
pub fn format_score(score: f64) -> String {
    if score == 0.0 {
        return "0.00".to_string();
    }

    // a tie needs the exact value to be a multiple of 1/8 (x.125, x.375, ...)
    let cents = score * 100.0;
    if (score * 8.0).fract() == 0.0 && cents.fract().abs() == 0.5 {
        return format!("{:.2}", (cents + 0.5 * score.signum()) / 100.0);
    }

    format!("{:.2}", score)
}

/// Lenient float parsing: leading whitespace is skipped and the longest
/// numeric prefix is used ("4.0 mm" → 4.0). No numeric prefix gives NaN.
pub fn parse_float(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }

    if s[end..].starts_with("Infinity") {
        return if bytes[0] == b'-' { f64::NEG_INFINITY } else { f64::INFINITY };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return f64::NAN;
    }

    // exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().unwrap_or(f64::NAN)
}
