//! Car part vocabulary.
//!
//! A [`CarPart`] is a [`PartKind`] with an optional [`Side`]. Labels follow
//! the detector and frontend conventions: unsided (`Front-door`, `Hood`) or
//! sided (`Left-Front-door`, `Right-Headlight`). Any label outside the
//! vocabulary collapses into [`CarPart::UNMAPPED`] so results never grow
//! untyped keys.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// Vehicle side for parts that come in pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }
}

// ---------------------------------------------------------------------------
// Part kind
// ---------------------------------------------------------------------------

/// The kind of a car part, independent of side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    Windshield,
    BackWindshield,
    FrontWindow,
    BackWindow,
    FrontDoor,
    BackDoor,
    FrontWheel,
    BackWheel,
    FrontBumper,
    BackBumper,
    Headlight,
    TailLight,
    Hood,
    Trunk,
    LicensePlate,
    Mirror,
    Roof,
    Grille,
    RockerPanel,
    QuarterPanel,
    Fender,
    /// A label the detector produced that is not in the vocabulary.
    Unmapped,
}

impl PartKind {
    /// Every mapped kind, in vocabulary order.
    pub const ALL: [PartKind; 21] = [
        Self::Windshield,
        Self::BackWindshield,
        Self::FrontWindow,
        Self::BackWindow,
        Self::FrontDoor,
        Self::BackDoor,
        Self::FrontWheel,
        Self::BackWheel,
        Self::FrontBumper,
        Self::BackBumper,
        Self::Headlight,
        Self::TailLight,
        Self::Hood,
        Self::Trunk,
        Self::LicensePlate,
        Self::Mirror,
        Self::Roof,
        Self::Grille,
        Self::RockerPanel,
        Self::QuarterPanel,
        Self::Fender,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Windshield => "Windshield",
            Self::BackWindshield => "Back-windshield",
            Self::FrontWindow => "Front-window",
            Self::BackWindow => "Back-window",
            Self::FrontDoor => "Front-door",
            Self::BackDoor => "Back-door",
            Self::FrontWheel => "Front-wheel",
            Self::BackWheel => "Back-wheel",
            Self::FrontBumper => "Front-bumper",
            Self::BackBumper => "Back-bumper",
            Self::Headlight => "Headlight",
            Self::TailLight => "Tail-light",
            Self::Hood => "Hood",
            Self::Trunk => "Trunk",
            Self::LicensePlate => "License-plate",
            Self::Mirror => "Mirror",
            Self::Roof => "Roof",
            Self::Grille => "Grille",
            Self::RockerPanel => "Rocker-panel",
            Self::QuarterPanel => "Quarter-panel",
            Self::Fender => "Fender",
            Self::Unmapped => "Unmapped",
        }
    }

    /// Case-insensitive lookup of a mapped kind by label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(label))
    }

    /// Whether the part exists once per side of the vehicle.
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            Self::FrontWindow
                | Self::BackWindow
                | Self::FrontDoor
                | Self::BackDoor
                | Self::FrontWheel
                | Self::BackWheel
                | Self::Headlight
                | Self::TailLight
                | Self::Mirror
                | Self::RockerPanel
                | Self::QuarterPanel
                | Self::Fender
        )
    }
}

// ---------------------------------------------------------------------------
// Car part
// ---------------------------------------------------------------------------

/// A car part identifier: kind plus optional side.
///
/// Serializes as its label so it can key JSON objects directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct CarPart {
    pub side: Option<Side>,
    pub kind: PartKind,
}

impl CarPart {
    /// Bucket for every label outside the vocabulary.
    pub const UNMAPPED: CarPart = CarPart {
        side: None,
        kind: PartKind::Unmapped,
    };

    pub const fn new(kind: PartKind) -> Self {
        Self { side: None, kind }
    }

    pub const fn sided(side: Side, kind: PartKind) -> Self {
        Self {
            side: Some(side),
            kind,
        }
    }

    /// Strict parse. Returns `None` for unknown labels and for a side
    /// prefix on a part that does not come in pairs.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        if let Some((side, rest)) = split_side(label) {
            let kind = PartKind::from_label(rest)?;
            return kind.is_paired().then_some(Self::sided(side, kind));
        }
        PartKind::from_label(label).map(Self::new)
    }

    /// Lenient parse used at the detector boundary: unknown labels are
    /// logged and routed to [`CarPart::UNMAPPED`].
    pub fn from_label(label: &str) -> Self {
        if label.trim().eq_ignore_ascii_case(PartKind::Unmapped.label()) {
            return Self::UNMAPPED;
        }
        Self::parse(label).unwrap_or_else(|| {
            tracing::warn!(label, "Unmapped car part label");
            Self::UNMAPPED
        })
    }

    pub fn is_mapped(&self) -> bool {
        self.kind != PartKind::Unmapped
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

/// Split a `Left-`/`Right-` prefix (case-insensitive) off a label.
fn split_side(label: &str) -> Option<(Side, &str)> {
    [Side::Left, Side::Right].into_iter().find_map(|side| {
        let prefix = side.label();
        let head = label.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        label[prefix.len()..]
            .strip_prefix('-')
            .map(|rest| (side, rest))
    })
}

impl fmt::Display for CarPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.side {
            Some(side) => write!(f, "{}-{}", side.label(), self.kind.label()),
            None => f.write_str(self.kind.label()),
        }
    }
}

impl From<String> for CarPart {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<&str> for CarPart {
    fn from(value: &str) -> Self {
        Self::from_label(value)
    }
}

impl From<CarPart> for String {
    fn from(value: CarPart) -> Self {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unsided_detector_labels() {
        assert_eq!(
            CarPart::parse("Front-door"),
            Some(CarPart::new(PartKind::FrontDoor))
        );
        assert_eq!(CarPart::parse("hood"), Some(CarPart::new(PartKind::Hood)));
        assert_eq!(
            CarPart::parse(" License-plate "),
            Some(CarPart::new(PartKind::LicensePlate))
        );
    }

    #[test]
    fn parses_sided_labels() {
        assert_eq!(
            CarPart::parse("Left-Front-door"),
            Some(CarPart::sided(Side::Left, PartKind::FrontDoor))
        );
        assert_eq!(
            CarPart::parse("Right-Tail-light"),
            Some(CarPart::sided(Side::Right, PartKind::TailLight))
        );
        assert_eq!(
            CarPart::parse("Left-Mirror"),
            Some(CarPart::sided(Side::Left, PartKind::Mirror))
        );
    }

    #[test]
    fn side_on_unpaired_part_is_rejected() {
        assert_eq!(CarPart::parse("Left-Hood"), None);
        assert_eq!(CarPart::parse("Right-Windshield"), None);
    }

    #[test]
    fn unknown_labels_are_unmapped() {
        assert_eq!(CarPart::parse("Spoiler"), None);
        assert_eq!(CarPart::from_label("Spoiler"), CarPart::UNMAPPED);
        assert_eq!(CarPart::from_label("Left-"), CarPart::UNMAPPED);
        assert_eq!(CarPart::from_label(""), CarPart::UNMAPPED);
        assert!(!CarPart::UNMAPPED.is_mapped());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for kind in PartKind::ALL {
            let part = CarPart::new(kind);
            assert_eq!(CarPart::parse(&part.label()), Some(part));
            if kind.is_paired() {
                for side in [Side::Left, Side::Right] {
                    let sided = CarPart::sided(side, kind);
                    assert_eq!(CarPart::parse(&sided.label()), Some(sided));
                }
            }
        }
    }

    #[test]
    fn unmapped_label_parses_back_to_unmapped() {
        assert_eq!(CarPart::from_label("Unmapped"), CarPart::UNMAPPED);
    }

    #[test]
    fn serializes_as_label_string() {
        let part = CarPart::sided(Side::Right, PartKind::Fender);
        let json = serde_json::to_string(&part).unwrap();
        assert_eq!(json, "\"Right-Fender\"");
        let back: CarPart = serde_json::from_str(&json).unwrap();
        assert_eq!(back, part);
    }
}
