/// Machine classes known to the threshold table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MachineType {
    WeldingRobot,
    PaintingStation,
    AssemblyLine,
    QualityControlStation,
}

impl MachineType {
    pub const ALL: [MachineType; 4] = [
        MachineType::WeldingRobot,
        MachineType::PaintingStation,
        MachineType::AssemblyLine,
        MachineType::QualityControlStation,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "weldingRobot" => Some(MachineType::WeldingRobot),
            "paintingStation" => Some(MachineType::PaintingStation),
            "assemblyLine" => Some(MachineType::AssemblyLine),
            "qualityControlStation" => Some(MachineType::QualityControlStation),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MachineType::WeldingRobot => "weldingRobot",
            MachineType::PaintingStation => "paintingStation",
            MachineType::AssemblyLine => "assemblyLine",
            MachineType::QualityControlStation => "qualityControlStation",
        }
    }

    /// Every part type monitored on this machine, in display order
    pub fn parts(&self) -> Vec<PartType> {
        match self {
            MachineType::WeldingRobot => WeldingRobotPart::ALL.iter().copied().map(PartType::Welding).collect(),
            MachineType::PaintingStation => PaintingStationPart::ALL.iter().copied().map(PartType::Painting).collect(),
            MachineType::AssemblyLine => AssemblyLinePart::ALL.iter().copied().map(PartType::Assembly).collect(),
            MachineType::QualityControlStation => QualityControlPart::ALL.iter().copied().map(PartType::QualityControl).collect(),
        }
    }

    /// Resolve a part name in the scope of this machine
    pub fn part(&self, name: &str) -> Option<PartType> {
        match self {
            MachineType::WeldingRobot => WeldingRobotPart::from_name(name).map(PartType::Welding),
            MachineType::PaintingStation => PaintingStationPart::from_name(name).map(PartType::Painting),
            MachineType::AssemblyLine => AssemblyLinePart::from_name(name).map(PartType::Assembly),
            MachineType::QualityControlStation => QualityControlPart::from_name(name).map(PartType::QualityControl),
        }
    }
}

impl std::fmt::Display for MachineType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeldingRobotPart {
    ErrorRate,
    VibrationLevel,
    ElectrodeWear,
    ShieldingPressure,
    WireFeedRate,
    ArcStability,
    SeamWidth,
    CoolingEfficiency,
}

impl WeldingRobotPart {
    pub const ALL: [WeldingRobotPart; 8] = [
        WeldingRobotPart::ErrorRate,
        WeldingRobotPart::VibrationLevel,
        WeldingRobotPart::ElectrodeWear,
        WeldingRobotPart::ShieldingPressure,
        WeldingRobotPart::WireFeedRate,
        WeldingRobotPart::ArcStability,
        WeldingRobotPart::SeamWidth,
        WeldingRobotPart::CoolingEfficiency,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeldingRobotPart::ErrorRate => "errorRate",
            WeldingRobotPart::VibrationLevel => "vibrationLevel",
            WeldingRobotPart::ElectrodeWear => "electrodeWear",
            WeldingRobotPart::ShieldingPressure => "shieldingPressure",
            WeldingRobotPart::WireFeedRate => "wireFeedRate",
            WeldingRobotPart::ArcStability => "arcStability",
            WeldingRobotPart::SeamWidth => "seamWidth",
            WeldingRobotPart::CoolingEfficiency => "coolingEfficiency",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintingStationPart {
    FlowRate,
    Pressure,
    ColorConsistency,
    NozzleCondition,
}

impl PaintingStationPart {
    pub const ALL: [PaintingStationPart; 4] = [
        PaintingStationPart::FlowRate,
        PaintingStationPart::Pressure,
        PaintingStationPart::ColorConsistency,
        PaintingStationPart::NozzleCondition,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            PaintingStationPart::FlowRate => "flowRate",
            PaintingStationPart::Pressure => "pressure",
            PaintingStationPart::ColorConsistency => "colorConsistency",
            PaintingStationPart::NozzleCondition => "nozzleCondition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssemblyLinePart {
    AlignmentAccuracy,
    Speed,
    FittingTolerance,
    BeltSpeed,
}

impl AssemblyLinePart {
    pub const ALL: [AssemblyLinePart; 4] = [
        AssemblyLinePart::AlignmentAccuracy,
        AssemblyLinePart::Speed,
        AssemblyLinePart::FittingTolerance,
        AssemblyLinePart::BeltSpeed,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AssemblyLinePart::AlignmentAccuracy => "alignmentAccuracy",
            AssemblyLinePart::Speed => "speed",
            AssemblyLinePart::FittingTolerance => "fittingTolerance",
            AssemblyLinePart::BeltSpeed => "beltSpeed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QualityControlPart {
    CameraCalibration,
    LightIntensity,
    SoftwareVersion,
    CriteriaSettings,
}

impl QualityControlPart {
    pub const ALL: [QualityControlPart; 4] = [
        QualityControlPart::CameraCalibration,
        QualityControlPart::LightIntensity,
        QualityControlPart::SoftwareVersion,
        QualityControlPart::CriteriaSettings,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|p| p.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            QualityControlPart::CameraCalibration => "cameraCalibration",
            QualityControlPart::LightIntensity => "lightIntensity",
            QualityControlPart::SoftwareVersion => "softwareVersion",
            QualityControlPart::CriteriaSettings => "criteriaSettings",
        }
    }
}

/// A part type, scoped to the machine it belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartType {
    Welding(WeldingRobotPart),
    Painting(PaintingStationPart),
    Assembly(AssemblyLinePart),
    QualityControl(QualityControlPart),
}

impl PartType {
    pub fn machine(&self) -> MachineType {
        match self {
            PartType::Welding(_) => MachineType::WeldingRobot,
            PartType::Painting(_) => MachineType::PaintingStation,
            PartType::Assembly(_) => MachineType::AssemblyLine,
            PartType::QualityControl(_) => MachineType::QualityControlStation,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PartType::Welding(p) => p.name(),
            PartType::Painting(p) => p.name(),
            PartType::Assembly(p) => p.name(),
            PartType::QualityControl(p) => p.name(),
        }
    }
}

/// One caller-supplied reading. The name stays a string so that
/// unrecognized parts can be reported instead of rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct PartReading {
    pub name: String,
    pub value: f64,
}

impl PartReading {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self { name: name.into(), value }
    }
}
