// src/steering/zones.rs
//
// Zone rule table.
//
// The frame width is cut at one third, one half and two thirds. Rules are
// written once for the marker expected on the LEFT edge of the lane (the
// "inner" marker for the current lap direction). Rules for the marker on the
// right edge are generated by mirroring every band and every steering class,
// so both sides stay symmetric whatever the magnitudes are.

use serde::{Deserialize, Serialize};

// ============================================================================
// ZONES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneMark {
    LeftThird,
    Center,
    RightThird,
}

impl ZoneMark {
    pub fn mirrored(self) -> Self {
        match self {
            ZoneMark::LeftThird => ZoneMark::RightThird,
            ZoneMark::Center => ZoneMark::Center,
            ZoneMark::RightThird => ZoneMark::LeftThird,
        }
    }
}

/// Zone boundaries for one frame width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zones {
    pub width: f32,
    pub left_third: f32,
    pub center: f32,
    pub right_third: f32,
}

impl Zones {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            left_third: width / 3.0,
            center: width / 2.0,
            right_third: width * 2.0 / 3.0,
        }
    }

    #[inline]
    pub fn at(&self, mark: ZoneMark) -> f32 {
        match mark {
            ZoneMark::LeftThird => self.left_third,
            ZoneMark::Center => self.center,
            ZoneMark::RightThird => self.right_third,
        }
    }
}

/// Open horizontal interval bounded by zone marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Below(ZoneMark),
    Between(ZoneMark, ZoneMark),
    Above(ZoneMark),
}

impl Band {
    pub fn contains(&self, x: f32, zones: &Zones) -> bool {
        match *self {
            Band::Below(mark) => x < zones.at(mark),
            Band::Between(lo, hi) => x > zones.at(lo) && x < zones.at(hi),
            Band::Above(mark) => x > zones.at(mark),
        }
    }

    pub fn mirrored(self) -> Self {
        match self {
            Band::Below(mark) => Band::Above(mark.mirrored()),
            Band::Between(lo, hi) => Band::Between(hi.mirrored(), lo.mirrored()),
            Band::Above(mark) => Band::Below(mark.mirrored()),
        }
    }
}

// ============================================================================
// STEERING CLASSES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Magnitude {
    Mild,
    Sharp,
    Sharpest,
}

/// The seven discrete outcomes of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SteeringClass {
    Straight,
    Left(Magnitude),
    Right(Magnitude),
}

impl SteeringClass {
    pub fn mirrored(self) -> Self {
        match self {
            SteeringClass::Straight => SteeringClass::Straight,
            SteeringClass::Left(m) => SteeringClass::Right(m),
            SteeringClass::Right(m) => SteeringClass::Left(m),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SteeringClass::Straight => "straight",
            SteeringClass::Left(Magnitude::Mild) => "left_mild",
            SteeringClass::Left(Magnitude::Sharp) => "left_sharp",
            SteeringClass::Left(Magnitude::Sharpest) => "left_sharpest",
            SteeringClass::Right(Magnitude::Mild) => "right_mild",
            SteeringClass::Right(Magnitude::Sharp) => "right_sharp",
            SteeringClass::Right(Magnitude::Sharpest) => "right_sharpest",
        }
    }
}

/// Steering values per magnitude class. Left is positive, right negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringMagnitudes {
    pub mild: f32,
    pub sharp: f32,
    pub sharpest: f32,
}

impl Default for SteeringMagnitudes {
    fn default() -> Self {
        Self {
            mild: 0.11,
            sharp: 0.17,
            sharpest: 0.225,
        }
    }
}

impl SteeringMagnitudes {
    pub fn value(&self, class: SteeringClass) -> f32 {
        let magnitude = |m: Magnitude| match m {
            Magnitude::Mild => self.mild,
            Magnitude::Sharp => self.sharp,
            Magnitude::Sharpest => self.sharpest,
        };
        match class {
            SteeringClass::Straight => 0.0,
            SteeringClass::Left(m) => magnitude(m),
            SteeringClass::Right(m) => -magnitude(m),
        }
    }
}

// ============================================================================
// RULE TABLE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Both { inner: Band, outer: Band },
    Inner(Band),
    Outer(Band),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneRule {
    pub condition: Condition,
    pub class: SteeringClass,
}

impl ZoneRule {
    /// Only detected markers (`Some`) can satisfy a condition.
    fn matches(&self, inner: Option<f32>, outer: Option<f32>, zones: &Zones) -> bool {
        let hit = |x: Option<f32>, band: Band| x.map_or(false, |x| band.contains(x, zones));
        match self.condition {
            Condition::Both {
                inner: inner_band,
                outer: outer_band,
            } => hit(inner, inner_band) && hit(outer, outer_band),
            Condition::Inner(band) => hit(inner, band),
            Condition::Outer(band) => hit(outer, band),
        }
    }
}

/// Inner-marker rules in priority order: the further the left-edge marker has
/// drifted right, the harder the turn right.
const INNER_RULES: [(Band, SteeringClass); 3] = [
    (
        Band::Between(ZoneMark::LeftThird, ZoneMark::RightThird),
        SteeringClass::Right(Magnitude::Mild),
    ),
    (
        Band::Between(ZoneMark::Center, ZoneMark::RightThird),
        SteeringClass::Right(Magnitude::Sharp),
    ),
    (
        Band::Above(ZoneMark::RightThird),
        SteeringClass::Right(Magnitude::Sharpest),
    ),
];

#[derive(Debug, Clone)]
pub struct ZoneTable {
    rules: Vec<ZoneRule>,
}

impl ZoneTable {
    pub fn canonical() -> Self {
        let straight_band = Band::Below(ZoneMark::LeftThird);
        let mut rules = vec![ZoneRule {
            condition: Condition::Both {
                inner: straight_band,
                outer: straight_band.mirrored(),
            },
            class: SteeringClass::Straight,
        }];

        rules.extend(INNER_RULES.iter().map(|&(band, class)| ZoneRule {
            condition: Condition::Inner(band),
            class,
        }));
        rules.extend(INNER_RULES.iter().map(|&(band, class)| ZoneRule {
            condition: Condition::Outer(band.mirrored()),
            class: class.mirrored(),
        }));

        Self { rules }
    }

    pub fn rules(&self) -> &[ZoneRule] {
        &self.rules
    }

    /// First matching rule, top to bottom.
    pub fn evaluate(
        &self,
        inner: Option<f32>,
        outer: Option<f32>,
        zones: &Zones,
    ) -> Option<&ZoneRule> {
        self.rules.iter().find(|rule| rule.matches(inner, outer, zones))
    }
}

impl Default for ZoneTable {
    fn default() -> Self {
        Self::canonical()
    }
}
