//! Report snapshot consumed by the map.
//!
//! This module owns the data layout for everything the map draws: systems,
//! fleets and the viewing player's diplomatic context. Values are read-only
//! snapshots built once per report load; the map never mutates them.

use crate::error::{Error, Result};
use crate::torus::Xy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod sample;

// ---------------------------------------------------------------------------
// Core value types
// ---------------------------------------------------------------------------

/// Identifier of a player (the report's `numero`). `0` is neutral.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct OwnerId(pub u32);

impl OwnerId {
    pub const NEUTRAL: Self = Self(0);

    pub fn is_neutral(self) -> bool {
        self == Self::NEUTRAL
    }
}

/// Number of planets a given owner holds inside one system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetShare {
    pub owner: OwnerId,
    pub planets: u32,
}

/// The viewing player and their diplomatic lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub numero: OwnerId,
    /// Member lists of the alliances the player belongs to.
    #[serde(default)]
    pub alliances: Vec<Vec<OwnerId>>,
    /// Players under a non-aggression pact with the viewing player.
    #[serde(default)]
    pub pna: Vec<OwnerId>,
}

// ---------------------------------------------------------------------------
// Systems
// ---------------------------------------------------------------------------

/// A system the viewing player holds at least one planet in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSystem {
    pub name: String,
    pub pos: Xy,
    pub star_type: u8,
    pub owners: Vec<OwnerId>,
    pub scan_radius: u32,
    #[serde(default)]
    pub planet_owner_counts: Option<Vec<PlanetShare>>,
}

/// A foreign system seen through detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedSystem {
    pub name: String,
    pub pos: Xy,
    pub star_type: u8,
    pub owners: Vec<OwnerId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemRecord {
    Player(PlayerSystem),
    Detected(DetectedSystem),
}

impl SystemRecord {
    pub fn name(&self) -> &str {
        match self {
            Self::Player(s) => &s.name,
            Self::Detected(s) => &s.name,
        }
    }

    pub fn pos(&self) -> Xy {
        match self {
            Self::Player(s) => s.pos,
            Self::Detected(s) => s.pos,
        }
    }

    pub fn star_type(&self) -> u8 {
        match self {
            Self::Player(s) => s.star_type,
            Self::Detected(s) => s.star_type,
        }
    }

    pub fn owners(&self) -> &[OwnerId] {
        match self {
            Self::Player(s) => &s.owners,
            Self::Detected(s) => &s.owners,
        }
    }

    /// Detected systems carry no scanners of ours.
    pub fn scan_radius(&self) -> u32 {
        match self {
            Self::Player(s) => s.scan_radius,
            Self::Detected(_) => 0,
        }
    }

    pub fn planet_owner_counts(&self) -> Option<&[PlanetShare]> {
        match self {
            Self::Player(s) => s.planet_owner_counts.as_deref(),
            Self::Detected(_) => None,
        }
    }

    /// Owners with duplicates removed, in first-seen order.
    pub fn distinct_owners(&self) -> Vec<OwnerId> {
        let mut out: Vec<OwnerId> = Vec::with_capacity(self.owners().len());
        for owner in self.owners() {
            if !out.contains(owner) {
                out.push(*owner);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Fleets
// ---------------------------------------------------------------------------

/// One of the viewing player's fleets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFleet {
    pub name: String,
    pub pos: Xy,
    pub owner: OwnerId,
    pub scan_radius: u32,
    /// Destination cell; only used to draw a heading arrow.
    #[serde(default)]
    pub direction: Option<Xy>,
}

/// A foreign fleet seen through detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedFleet {
    pub pos: Xy,
    pub owner: OwnerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FleetRecord {
    Player(PlayerFleet),
    Detected(DetectedFleet),
}

impl FleetRecord {
    pub fn pos(&self) -> Xy {
        match self {
            Self::Player(f) => f.pos,
            Self::Detected(f) => f.pos,
        }
    }

    pub fn owner(&self) -> OwnerId {
        match self {
            Self::Player(f) => f.owner,
            Self::Detected(f) => f.owner,
        }
    }

    pub fn scan_radius(&self) -> u32 {
        match self {
            Self::Player(f) => f.scan_radius,
            Self::Detected(_) => 0,
        }
    }

    pub fn direction(&self) -> Option<Xy> {
        match self {
            Self::Player(f) => f.direction,
            Self::Detected(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Everything the map needs from a parsed turn report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub player: PlayerInfo,
    #[serde(default)]
    pub systems: Vec<SystemRecord>,
    #[serde(default)]
    pub fleets: Vec<FleetRecord>,
}

impl Report {
    /// Where the camera starts when the host does not say otherwise.
    pub fn home(&self) -> Option<Xy> {
        self.systems.iter().find_map(|s| match s {
            SystemRecord::Player(p) => Some(p.pos),
            SystemRecord::Detected(_) => None,
        })
    }

    /// Every owner appearing anywhere in the report, sorted and deduplicated.
    pub fn known_owners(&self) -> Vec<OwnerId> {
        let mut owners: Vec<OwnerId> = self
            .systems
            .iter()
            .flat_map(|s| s.owners().iter().copied())
            .chain(self.fleets.iter().map(FleetRecord::owner))
            .chain(std::iter::once(self.player.numero))
            .filter(|o| !o.is_neutral())
            .collect();
        owners.sort_unstable();
        owners.dedup();
        owners
    }

    /// Parse a RON report snapshot.
    ///
    /// # Errors
    /// Returns [`Error::Parse`] when the text is not a valid report.
    pub fn from_ron_str(text: &str, origin: &Path) -> Result<Self> {
        ron::from_str(text).map_err(|source| Error::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Read a report snapshot from disk.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the file cannot be read and [`Error::Parse`]
    /// if it does not hold a report.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let report = Self::from_ron_str(&text, path)?;
        log::info!(
            "loaded report from {} ({} systems, {} fleets)",
            path.display(),
            report.systems.len(),
            report.fleets.len()
        );
        Ok(report)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detected_entities_are_not_scan_sources() {
        let sys = SystemRecord::Detected(DetectedSystem {
            name: "Vega".into(),
            pos: Xy::new(3, 3),
            star_type: 4,
            owners: vec![OwnerId(9)],
        });
        let fleet = FleetRecord::Detected(DetectedFleet {
            pos: Xy::new(3, 3),
            owner: OwnerId(9),
        });
        assert_eq!(sys.scan_radius(), 0);
        assert_eq!(fleet.scan_radius(), 0);
        assert_eq!(fleet.direction(), None);
    }

    #[test]
    fn distinct_owners_keeps_first_seen_order() {
        let sys = SystemRecord::Detected(DetectedSystem {
            name: "Deneb".into(),
            pos: Xy::new(1, 1),
            star_type: 2,
            owners: vec![OwnerId(4), OwnerId(2), OwnerId(4), OwnerId(0)],
        });
        assert_eq!(sys.distinct_owners(), vec![OwnerId(4), OwnerId(2), OwnerId(0)]);
    }

    #[test]
    fn home_is_first_player_system() {
        let report = Report::sample();
        let first_owned = report.systems.iter().find_map(|s| match s {
            SystemRecord::Player(p) => Some(p.pos),
            SystemRecord::Detected(_) => None,
        });
        assert_eq!(report.home(), first_owned);
        assert!(Report::default().home().is_none());
    }

    #[test]
    fn empty_report_views_as_neutral() {
        let report = Report::default();
        assert_eq!(OwnerId::default(), OwnerId::NEUTRAL);
        assert!(report.player.numero.is_neutral());
        assert!(report.known_owners().is_empty());
    }

    #[test]
    fn known_owners_skip_neutral() {
        let owners = Report::sample().known_owners();
        assert!(!owners.contains(&OwnerId::NEUTRAL));
        assert!(owners.windows(2).all(|w| w[0] < w[1]), "sorted and unique");
    }

    #[test]
    fn report_loads_from_ron_snapshot() {
        let text = r#"(
            player: (numero: 7, alliances: [[7, 8]], pna: [12]),
            systems: [
                Player((
                    name: "Sol",
                    pos: "1_20_21",
                    star_type: 5,
                    owners: [7, 12],
                    scan_radius: 2,
                    planet_owner_counts: Some([(owner: 7, planets: 3), (owner: 12, planets: 1)]),
                )),
                Detected((name: "Rigel", pos: "1_bad", star_type: 11, owners: [0])),
            ],
            fleets: [
                Player((name: "Home Guard", pos: "1_20_21", owner: 7, scan_radius: 1, direction: Some("1_22_21"))),
                Detected((pos: "1_25_25", owner: 9)),
            ],
        )"#;
        let report: Report = ron::from_str(text).expect("snapshot parses");
        assert_eq!(report.player.numero, OwnerId(7));
        assert_eq!(report.systems[0].pos(), Xy { x: 20, y: 21 });
        assert_eq!(report.systems[1].pos(), crate::torus::FALLBACK_POSITION);
        assert_eq!(report.fleets[0].direction(), Some(Xy { x: 22, y: 21 }));
        assert_eq!(report.systems[0].planet_owner_counts().map(<[_]>::len), Some(2));
    }

    #[test]
    fn sample_survives_a_ron_round_trip() {
        let text = ron::to_string(&Report::sample()).expect("sample serializes");
        let back = Report::from_ron_str(&text, Path::new("sample.ron")).expect("sample parses");
        assert_eq!(back, Report::sample());
    }

    #[test]
    fn broken_snapshot_names_its_file() {
        let err = Report::from_ron_str("(player: ", Path::new("turn-12.ron")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("turn-12.ron"), "{err}");
    }

    #[test]
    fn missing_snapshot_is_io_error() {
        let err = Report::load(Path::new("/nonexistent/starmap/report.ron")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
