//! Ownership color resolution.
//!
//! Maps the owners of a cell or entity to one display color, taking the
//! viewing player's alliances and non-aggression pacts into account.

use crate::config::Palette;
use crate::report::{OwnerId, PlayerInfo};
use egui::Color32;

/// Diplomatic standing of a single non-neutral owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Standing {
    Own,
    Allied,
    NonAggression,
    Hostile,
}

pub struct OwnershipResolver<'a> {
    player: &'a PlayerInfo,
    palette: &'a Palette,
}

impl<'a> OwnershipResolver<'a> {
    pub fn new(player: &'a PlayerInfo, palette: &'a Palette) -> Self {
        Self { player, palette }
    }

    pub fn standing(&self, owner: OwnerId) -> Standing {
        if owner == self.player.numero {
            Standing::Own
        } else if self.player.alliances.iter().any(|a| a.contains(&owner)) {
            Standing::Allied
        } else if self.player.pna.contains(&owner) {
            Standing::NonAggression
        } else {
            Standing::Hostile
        }
    }

    pub fn standing_color(&self, standing: Standing) -> Color32 {
        match standing {
            Standing::Own => self.palette.own,
            Standing::Allied => self.palette.allied,
            Standing::NonAggression => self.palette.non_aggression,
            Standing::Hostile => self.palette.hostile,
        }
    }

    /// Display color for an owner set.
    ///
    /// Empty sets are "unknown", all-neutral sets are "neutral". Several
    /// non-neutral owners collapse to their shared color when they all
    /// resolve alike and to "mixed" otherwise.
    pub fn resolve(&self, owners: &[OwnerId]) -> Color32 {
        if owners.is_empty() {
            return self.palette.unknown;
        }

        let mut claimants: Vec<OwnerId> = owners.iter().copied().filter(|o| !o.is_neutral()).collect();
        claimants.sort_unstable();
        claimants.dedup();

        match claimants.as_slice() {
            [] => self.palette.neutral,
            [single] => self.standing_color(self.standing(*single)),
            [first, rest @ ..] => {
                let color = self.resolve(&[*first]);
                if rest.iter().all(|o| self.resolve(&[*o]) == color) {
                    color
                } else {
                    self.palette.mixed
                }
            }
        }
    }

    /// Color of one owner taken alone, neutral included.
    pub fn owner_color(&self, owner: OwnerId) -> Color32 {
        self.resolve(&[owner])
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
