use serde::Serialize;

use crate::health::types::{
    AssemblyLinePart, MachineType, PaintingStationPart, PartType, QualityControlPart,
    WeldingRobotPart,
};

/// Inclusive numeric range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn encloses(&self, inner: &Band) -> bool {
        self.min <= inner.min && inner.max <= self.max
    }
}

/// Reference bands for one part type: optimal ⊆ normal ⊆ abnormal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PartThresholds {
    pub unit: &'static str,
    pub optimal: Band,
    pub normal: Band,
    pub abnormal: Band,
}

impl PartThresholds {
    const fn new(unit: &'static str, optimal: Band, normal: Band, abnormal: Band) -> Self {
        Self { unit, optimal, normal, abnormal }
    }

    /// Score a reading on the 0-100 scale.
    ///
    /// 100 anywhere in the optimal band, falling linearly to 50 at the edge of
    /// the normal band and to 0 at the edge of the abnormal band. The slope on
    /// each side is set by the width of the margin on that side. Values outside
    /// the abnormal band (and NaN) score 0. Band edges land exactly on 50 and 0.
    pub fn score(&self, value: f64) -> f64 {
        if self.optimal.contains(value) {
            return 100.0;
        }

        if self.normal.contains(value) {
            let (distance, margin) = if value < self.optimal.min {
                (self.optimal.min - value, self.optimal.min - self.normal.min)
            } else {
                (value - self.optimal.max, self.normal.max - self.optimal.max)
            };
            return (50.0 + 50.0 * (1.0 - distance / margin)).clamp(0.0, 100.0);
        }

        if self.abnormal.contains(value) {
            let (distance, margin) = if value < self.normal.min {
                (self.normal.min - value, self.normal.min - self.abnormal.min)
            } else {
                (value - self.normal.max, self.abnormal.max - self.normal.max)
            };
            return (50.0 * (1.0 - distance / margin)).clamp(0.0, 100.0);
        }

        0.0
    }

    fn check(&self) -> Result<(), String> {
        for (label, band) in [("optimal", &self.optimal), ("normal", &self.normal), ("abnormal", &self.abnormal)] {
            if !(band.min.is_finite() && band.max.is_finite()) || band.min > band.max {
                return Err(format!("{} band [{}, {}] is not a valid range", label, band.min, band.max));
            }
        }
        if !self.normal.encloses(&self.optimal) {
            return Err("optimal band is not inside the normal band".into());
        }
        if !self.abnormal.encloses(&self.normal) {
            return Err("normal band is not inside the abnormal band".into());
        }
        Ok(())
    }
}

// ── welding robot ───────────────────────────────────
const WELD_ERROR_RATE: PartThresholds = PartThresholds::new("%", Band::new(0.0, 0.1), Band::new(0.0, 0.82), Band::new(0.0, 2.5));
const WELD_VIBRATION_LEVEL: PartThresholds = PartThresholds::new("mm/s", Band::new(0.0, 2.0), Band::new(0.0, 10.0), Band::new(0.0, 20.0));
const WELD_ELECTRODE_WEAR: PartThresholds = PartThresholds::new("mm", Band::new(0.0, 0.7), Band::new(0.0, 1.15), Band::new(0.0, 2.0));
const WELD_SHIELDING_PRESSURE: PartThresholds = PartThresholds::new("L/min", Band::new(16.0, 20.0), Band::new(11.0, 25.0), Band::new(5.0, 30.0));
const WELD_WIRE_FEED_RATE: PartThresholds = PartThresholds::new("m/min", Band::new(5.0, 7.0), Band::new(3.0, 11.0), Band::new(2.0, 15.0));
const WELD_ARC_STABILITY: PartThresholds = PartThresholds::new("%", Band::new(98.0, 100.0), Band::new(90.0, 100.0), Band::new(60.0, 100.0));
const WELD_SEAM_WIDTH: PartThresholds = PartThresholds::new("mm", Band::new(2.0, 3.0), Band::new(1.2, 4.0), Band::new(0.5, 6.0));
const WELD_COOLING_EFFICIENCY: PartThresholds = PartThresholds::new("%", Band::new(95.0, 100.0), Band::new(70.0, 100.0), Band::new(50.0, 100.0));

// ── painting station ────────────────────────────────
const PAINT_FLOW_RATE: PartThresholds = PartThresholds::new("L/min", Band::new(20.0, 30.0), Band::new(15.0, 35.0), Band::new(10.0, 40.0));
const PAINT_PRESSURE: PartThresholds = PartThresholds::new("bar", Band::new(2.0, 3.0), Band::new(1.5, 3.5), Band::new(1.0, 4.5));
const PAINT_COLOR_CONSISTENCY: PartThresholds = PartThresholds::new("%", Band::new(95.0, 100.0), Band::new(85.0, 100.0), Band::new(70.0, 100.0));
const PAINT_NOZZLE_CONDITION: PartThresholds = PartThresholds::new("%", Band::new(90.0, 100.0), Band::new(75.0, 100.0), Band::new(50.0, 100.0));

// ── assembly line ───────────────────────────────────
const ASSEMBLY_ALIGNMENT_ACCURACY: PartThresholds = PartThresholds::new("mm", Band::new(0.0, 0.5), Band::new(0.0, 1.0), Band::new(0.0, 2.0));
const ASSEMBLY_SPEED: PartThresholds = PartThresholds::new("units/min", Band::new(8.0, 12.0), Band::new(5.0, 15.0), Band::new(2.0, 20.0));
const ASSEMBLY_FITTING_TOLERANCE: PartThresholds = PartThresholds::new("mm", Band::new(0.0, 0.05), Band::new(0.0, 0.1), Band::new(0.0, 0.2));
const ASSEMBLY_BELT_SPEED: PartThresholds = PartThresholds::new("m/s", Band::new(1.0, 1.5), Band::new(0.8, 2.0), Band::new(0.5, 2.5));

// ── quality control station ─────────────────────────
const QC_CAMERA_CALIBRATION: PartThresholds = PartThresholds::new("%", Band::new(98.0, 100.0), Band::new(95.0, 100.0), Band::new(85.0, 100.0));
const QC_LIGHT_INTENSITY: PartThresholds = PartThresholds::new("lux", Band::new(900.0, 1100.0), Band::new(750.0, 1250.0), Band::new(500.0, 1500.0));
const QC_SOFTWARE_VERSION: PartThresholds = PartThresholds::new("months behind", Band::new(0.0, 3.0), Band::new(0.0, 12.0), Band::new(0.0, 24.0));
const QC_CRITERIA_SETTINGS: PartThresholds = PartThresholds::new("%", Band::new(95.0, 100.0), Band::new(85.0, 100.0), Band::new(70.0, 100.0));

impl PartType {
    pub fn thresholds(&self) -> &'static PartThresholds {
        match self {
            PartType::Welding(p) => match p {
                WeldingRobotPart::ErrorRate => &WELD_ERROR_RATE,
                WeldingRobotPart::VibrationLevel => &WELD_VIBRATION_LEVEL,
                WeldingRobotPart::ElectrodeWear => &WELD_ELECTRODE_WEAR,
                WeldingRobotPart::ShieldingPressure => &WELD_SHIELDING_PRESSURE,
                WeldingRobotPart::WireFeedRate => &WELD_WIRE_FEED_RATE,
                WeldingRobotPart::ArcStability => &WELD_ARC_STABILITY,
                WeldingRobotPart::SeamWidth => &WELD_SEAM_WIDTH,
                WeldingRobotPart::CoolingEfficiency => &WELD_COOLING_EFFICIENCY,
            },
            PartType::Painting(p) => match p {
                PaintingStationPart::FlowRate => &PAINT_FLOW_RATE,
                PaintingStationPart::Pressure => &PAINT_PRESSURE,
                PaintingStationPart::ColorConsistency => &PAINT_COLOR_CONSISTENCY,
                PaintingStationPart::NozzleCondition => &PAINT_NOZZLE_CONDITION,
            },
            PartType::Assembly(p) => match p {
                AssemblyLinePart::AlignmentAccuracy => &ASSEMBLY_ALIGNMENT_ACCURACY,
                AssemblyLinePart::Speed => &ASSEMBLY_SPEED,
                AssemblyLinePart::FittingTolerance => &ASSEMBLY_FITTING_TOLERANCE,
                AssemblyLinePart::BeltSpeed => &ASSEMBLY_BELT_SPEED,
            },
            PartType::QualityControl(p) => match p {
                QualityControlPart::CameraCalibration => &QC_CAMERA_CALIBRATION,
                QualityControlPart::LightIntensity => &QC_LIGHT_INTENSITY,
                QualityControlPart::SoftwareVersion => &QC_SOFTWARE_VERSION,
                QualityControlPart::CriteriaSettings => &QC_CRITERIA_SETTINGS,
            },
        }
    }
}

/// Check every table entry once at startup.
pub fn validate() -> anyhow::Result<()> {
    for machine in MachineType::ALL {
        for part in machine.parts() {
            part.thresholds()
                .check()
                .map_err(|e| anyhow::anyhow!("Invalid thresholds for {}.{}: {}", machine, part.name(), e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_rate() -> &'static PartThresholds {
        PartType::Welding(WeldingRobotPart::ErrorRate).thresholds()
    }

    #[test]
    fn test_table_is_valid() {
        validate().unwrap();
    }

    #[test]
    fn test_band_edges() {
        let t = error_rate();
        assert_eq!(t.score(0.0), 100.0);
        assert_eq!(t.score(0.1), 100.0);
        assert_eq!(t.score(0.82), 50.0);
        assert_eq!(t.score(2.5), 0.0);
        assert_eq!(t.score(2.6), 0.0);
    }

    #[test]
    fn test_every_band_edge_is_exact() {
        for machine in MachineType::ALL {
            for part in machine.parts() {
                let t = part.thresholds();
                for edge in [t.normal.min, t.normal.max] {
                    if !t.optimal.contains(edge) {
                        assert_eq!(t.score(edge), 50.0, "{} normal edge {}", part.name(), edge);
                    }
                }
                for edge in [t.abnormal.min, t.abnormal.max] {
                    if !t.normal.contains(edge) {
                        let score = t.score(edge);
                        assert_eq!(score, 0.0, "{} abnormal edge {}", part.name(), edge);
                        assert!(score.is_sign_positive(), "{} abnormal edge {} is -0", part.name(), edge);
                    }
                }
            }
        }
    }

    #[test]
    fn test_lower_side_interpolation() {
        // optimal 16-20, normal from 11, abnormal from 5
        let t = PartType::Welding(WeldingRobotPart::ShieldingPressure).thresholds();
        assert_eq!(t.score(12.0), 60.0);
        assert_eq!(t.score(11.0), 50.0);
        assert_eq!(t.score(8.0), 25.0);
        assert_eq!(t.score(4.0), 0.0);
    }

    #[test]
    fn test_score_stays_in_range() {
        for machine in MachineType::ALL {
            for part in machine.parts() {
                let t = part.thresholds();
                let span = t.abnormal.max - t.abnormal.min;
                for step in -10..=30 {
                    let value = t.abnormal.min + span * step as f64 / 20.0;
                    let score = t.score(value);
                    assert!((0.0..=100.0).contains(&score), "{} {} -> {}", part.name(), value, score);
                }
            }
        }
    }

    #[test]
    fn test_nan_scores_zero() {
        assert_eq!(error_rate().score(f64::NAN), 0.0);
        assert_eq!(error_rate().score(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_check_rejects_misnested_bands() {
        let broken = PartThresholds::new("%", Band::new(0.0, 5.0), Band::new(0.0, 1.0), Band::new(0.0, 10.0));
        assert!(broken.check().is_err());
        let inverted = PartThresholds::new("%", Band::new(1.0, 0.0), Band::new(0.0, 1.0), Band::new(0.0, 10.0));
        assert!(inverted.check().is_err());
    }
}
