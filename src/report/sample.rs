//! Built-in report used when the host has none to give.

use super::{
    DetectedFleet, DetectedSystem, FleetRecord, OwnerId, PlanetShare, PlayerFleet, PlayerInfo,
    PlayerSystem, Report, SystemRecord,
};
use crate::torus::Xy;

const SELF_ID: OwnerId = OwnerId(7);
const ALLY_ID: OwnerId = OwnerId(8);
const PNA_ID: OwnerId = OwnerId(12);
const HOSTILE_A: OwnerId = OwnerId(9);
const HOSTILE_B: OwnerId = OwnerId(15);

fn owned(name: &str, x: i32, y: i32, star_type: u8, scan_radius: u32) -> SystemRecord {
    SystemRecord::Player(PlayerSystem {
        name: name.to_owned(),
        pos: Xy::new(x, y),
        star_type,
        owners: vec![SELF_ID],
        scan_radius,
        planet_owner_counts: None,
    })
}

fn detected(name: &str, x: i32, y: i32, star_type: u8, owners: &[OwnerId]) -> SystemRecord {
    SystemRecord::Detected(DetectedSystem {
        name: name.to_owned(),
        pos: Xy::new(x, y),
        star_type,
        owners: owners.to_vec(),
    })
}

impl Report {
    /// A small hand-made galaxy around `(20, 20)` with a few systems straddling
    /// the wrap edges.
    pub fn sample() -> Self {
        let systems = vec![
            owned("Sol", 20, 20, 5, 3),
            owned("Alpha Centauri", 22, 23, 3, 2),
            owned("Barnard", 39, 2, 1, 1),
            SystemRecord::Player(PlayerSystem {
                name: "Tau Ceti".to_owned(),
                pos: Xy::new(17, 18),
                star_type: 7,
                owners: vec![SELF_ID, HOSTILE_A, PNA_ID],
                scan_radius: 2,
                planet_owner_counts: Some(vec![
                    PlanetShare {
                        owner: SELF_ID,
                        planets: 4,
                    },
                    PlanetShare {
                        owner: HOSTILE_A,
                        planets: 2,
                    },
                    PlanetShare {
                        owner: PNA_ID,
                        planets: 1,
                    },
                ]),
            }),
            detected("Sirius", 25, 15, 9, &[ALLY_ID]),
            detected("Procyon", 14, 26, 6, &[PNA_ID]),
            detected("Altair", 28, 28, 10, &[HOSTILE_A]),
            detected("Vega", 1, 40, 4, &[OwnerId::NEUTRAL]),
            detected("Deneb", 12, 12, 8, &[HOSTILE_A, HOSTILE_B]),
            detected("Rigel", 30, 10, 2, &[]),
        ];

        let fleets = vec![
            FleetRecord::Player(PlayerFleet {
                name: "Home Guard".to_owned(),
                pos: Xy::new(20, 20),
                owner: SELF_ID,
                scan_radius: 1,
                direction: None,
            }),
            FleetRecord::Player(PlayerFleet {
                name: "Vanguard".to_owned(),
                pos: Xy::new(21, 24),
                owner: SELF_ID,
                scan_radius: 2,
                direction: Some(Xy::new(25, 27)),
            }),
            FleetRecord::Player(PlayerFleet {
                name: "Rim Patrol".to_owned(),
                pos: Xy::new(40, 1),
                owner: SELF_ID,
                scan_radius: 1,
                direction: Some(Xy::new(2, 39)),
            }),
            FleetRecord::Detected(DetectedFleet {
                pos: Xy::new(24, 16),
                owner: ALLY_ID,
            }),
            FleetRecord::Detected(DetectedFleet {
                pos: Xy::new(23, 26),
                owner: HOSTILE_B,
            }),
        ];

        Self {
            player: PlayerInfo {
                numero: SELF_ID,
                alliances: vec![vec![SELF_ID, ALLY_ID]],
                pna: vec![PNA_ID],
            },
            systems,
            fleets,
        }
    }
}
