//! Wrap-around coordinate arithmetic for the galaxy grid.
//!
//! The map is a torus: both axes run `1..=AXIS_SIZE` and stepping past one
//! edge re-enters from the opposite edge. Every coordinate that leaves this
//! module is normalized.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of cells along each axis of the galaxy.
pub const AXIS_SIZE: i32 = 40;

/// Coordinate used when a raw position string cannot be parsed.
pub const FALLBACK_POSITION: Xy = Xy { x: 1, y: 1 };

/// Galaxy number written by [`format_position`].
const DEFAULT_GALAXY: u32 = 1;

// ---------------------------------------------------------------------------
// Core value type
// ---------------------------------------------------------------------------

/// A cell on the galaxy grid.
///
/// `x` is the row (vertical) index and `y` the column (horizontal) index,
/// matching the order of the report wire format `"<galaxy>_<row>_<col>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Xy {
    pub x: i32,
    pub y: i32,
}

impl Xy {
    /// Build a coordinate, normalizing both components onto the torus.
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            x: wrap(x),
            y: wrap(y),
        }
    }

    /// Move by `(d_row, d_col)` cells, wrapping on both axes.
    pub fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self {
            x: delta(self.x, d_row, AXIS_SIZE),
            y: delta(self.y, d_col, AXIS_SIZE),
        }
    }
}

impl Default for Xy {
    fn default() -> Self {
        Self {
            x: AXIS_SIZE / 2,
            y: AXIS_SIZE / 2,
        }
    }
}

impl fmt::Display for Xy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

/// Normalize `v` onto `[1, size]`.
///
/// Same result as repeatedly adding or subtracting `size` until `v` lands in
/// range, without the loop. Total for every `i32` and every positive `size`;
/// `size <= 0` returns `v` unchanged since there is no ring to wrap onto.
pub fn wrap_on(v: i32, size: i32) -> i32 {
    if size <= 0 {
        return v;
    }
    (i64::from(v) - 1).rem_euclid(i64::from(size)) as i32 + 1
}

/// Normalize `v` onto `[1, AXIS_SIZE]`.
pub fn wrap(v: i32) -> i32 {
    wrap_on(v, AXIS_SIZE)
}

/// World coordinate found `offset` cells away from `center` on an axis of
/// `axis_size` cells.
pub fn delta(center: i32, offset: i32, axis_size: i32) -> i32 {
    wrap_on(center.saturating_add(offset), axis_size)
}

/// Shortest signed step count from `from` to `to` on the ring.
///
/// The result lies in `(-AXIS_SIZE / 2, AXIS_SIZE / 2]`.
pub fn signed_delta(from: i32, to: i32) -> i32 {
    let d = (i64::from(to) - i64::from(from)).rem_euclid(i64::from(AXIS_SIZE)) as i32;
    if d > AXIS_SIZE / 2 { d - AXIS_SIZE } else { d }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Parse a report position `"<galaxy>_<row>_<col>"`.
///
/// The row lands in [`Xy::x`] and the column in [`Xy::y`]. Anything that is
/// not three `_`-separated integers yields [`FALLBACK_POSITION`].
pub fn parse_position(raw: &str) -> Xy {
    let mut parts = raw.trim().split('_');
    let parsed = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(galaxy), Some(row), Some(col), None) => galaxy
            .parse::<i64>()
            .ok()
            .and(row.parse::<i32>().ok().zip(col.parse::<i32>().ok())),
        _ => None,
    };

    match parsed {
        Some((row, col)) => Xy::new(row, col),
        None => {
            log::warn!("malformed position {raw:?}, using {FALLBACK_POSITION}");
            FALLBACK_POSITION
        }
    }
}

/// Inverse of [`parse_position`] for galaxy 1.
pub fn format_position(pos: Xy) -> String {
    format!("{DEFAULT_GALAXY}_{}_{}", pos.x, pos.y)
}

impl Serialize for Xy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_position(*self))
    }
}

impl<'de> Deserialize<'de> for Xy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PositionVisitor;

        impl de::Visitor<'_> for PositionVisitor {
            type Value = Xy;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a position string \"<galaxy>_<row>_<col>\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Xy, E> {
                Ok(parse_position(v))
            }
        }

        deserializer.deserialize_str(PositionVisitor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
