use crate::health::types::{MachineType, PartReading};

/// Outcome of scoring a single reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PartHealth {
    /// 0-100 health score
    Score(f64),
    /// Machine type not in the threshold table
    UnknownMachine,
    /// Part name not monitored on a known machine
    UnknownPart,
}

impl PartHealth {
    /// Numeric view used by older clients: unknown machine is 0, unknown part is -1.
    pub fn sentinel(&self) -> f64 {
        match self {
            PartHealth::Score(s) => *s,
            PartHealth::UnknownMachine => 0.0,
            PartHealth::UnknownPart => -1.0,
        }
    }
}

/// Aggregate outcome for one machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MachineHealth {
    Score {
        value: f64,
        /// Readings that contributed to the mean
        scored_parts: usize,
        /// Readings dropped because the part name was not recognized
        unknown_parts: usize,
    },
    UnknownMachine,
}

impl MachineHealth {
    /// Health value; an unknown machine counts as 0.
    pub fn score(&self) -> f64 {
        match self {
            MachineHealth::Score { value, .. } => *value,
            MachineHealth::UnknownMachine => 0.0,
        }
    }

    pub fn unknown_parts(&self) -> usize {
        match self {
            MachineHealth::Score { unknown_parts, .. } => *unknown_parts,
            MachineHealth::UnknownMachine => 0,
        }
    }
}

pub fn calculate_part_health(machine_name: &str, reading: &PartReading) -> PartHealth {
    match MachineType::from_name(machine_name) {
        Some(machine) => score_reading(machine, reading),
        None => PartHealth::UnknownMachine,
    }
}

fn score_reading(machine: MachineType, reading: &PartReading) -> PartHealth {
    match machine.part(&reading.name) {
        Some(part) => PartHealth::Score(part.thresholds().score(reading.value)),
        None => PartHealth::UnknownPart,
    }
}

/// Mean of the recognized part scores. Unrecognized parts are left out;
/// an empty or fully unrecognized list scores 0.
pub fn calculate_machine_health(machine_name: &str, readings: &[PartReading]) -> MachineHealth {
    let Some(machine) = MachineType::from_name(machine_name) else {
        return MachineHealth::UnknownMachine;
    };

    let mut sum = 0.0;
    let mut scored_parts = 0;
    let mut unknown_parts = 0;
    for reading in readings {
        match score_reading(machine, reading) {
            PartHealth::Score(s) => {
                sum += s;
                scored_parts += 1;
            }
            _ => unknown_parts += 1,
        }
    }

    let value = if scored_parts == 0 { 0.0 } else { sum / scored_parts as f64 };
    MachineHealth::Score { value, scored_parts, unknown_parts }
}
