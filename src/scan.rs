//! Scan coverage aggregation.
//!
//! Every system and fleet with a scan radius covers a Chebyshev square
//! around its cell. Coverage from all sources is merged into one set of
//! screen cells so overlapping ranges are drawn exactly once.

use crate::camera::{ScreenCell, Viewport};
use crate::report::Report;
use crate::torus::{AXIS_SIZE, Xy};
use rustc_hash::FxHashSet;

/// Beyond this radius a square already covers the whole ring.
const MAX_EFFECTIVE_RADIUS: i32 = AXIS_SIZE / 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSource {
    pub center: Xy,
    pub radius: u32,
}

/// All scan sources in a report, skipping those with no range.
pub fn sources(report: &Report) -> impl Iterator<Item = ScanSource> + '_ {
    let systems = report.systems.iter().map(|s| ScanSource {
        center: s.pos(),
        radius: s.scan_radius(),
    });
    let fleets = report.fleets.iter().map(|f| ScanSource {
        center: f.pos(),
        radius: f.scan_radius(),
    });
    systems.chain(fleets).filter(|s| s.radius > 0)
}

/// Deduplicated set of on-screen cells covered by at least one scanner.
#[derive(Debug, Clone, Default)]
pub struct ScanOverlay {
    cells: FxHashSet<ScreenCell>,
}

impl ScanOverlay {
    pub fn aggregate(viewport: &Viewport, sources: impl IntoIterator<Item = ScanSource>) -> Self {
        let mut cells = FxHashSet::default();
        if viewport.is_empty() {
            return Self { cells };
        }

        for source in sources {
            let r = i32::try_from(source.radius)
                .unwrap_or(i32::MAX)
                .min(MAX_EFFECTIVE_RADIUS);
            for d_row in -r..=r {
                for d_col in -r..=r {
                    if let Some(cell) = viewport.project(source.center.offset(d_row, d_col)) {
                        cells.insert(cell);
                    }
                }
            }
        }

        Self { cells }
    }

    pub fn from_report(viewport: &Viewport, report: &Report) -> Self {
        Self::aggregate(viewport, sources(report))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, cell: ScreenCell) -> bool {
        self.cells.contains(&cell)
    }

    /// Covered cells in row-major order, for a stable draw order.
    pub fn sorted_cells(&self) -> Vec<ScreenCell> {
        let mut cells: Vec<ScreenCell> = self.cells.iter().copied().collect();
        cells.sort_unstable_by_key(|c| (c.row, c.col));
        cells
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
