//! Wave and formation generation
//!
//! A wave is a declarative layout turned into a queue of spawn
//! descriptors. Slot positions and breathing motion are pure functions
//! of the grid cell, canvas size and elapsed time.

use std::collections::VecDeque;

use glam::Vec2;

use super::state::{EnemyKind, GridCell};
use crate::tuning::{FormationConfig, LayoutRow};

/// One pending enemy: what to spawn and which slot it occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnDescriptor {
    pub kind: EnemyKind,
    pub cell: GridCell,
}

/// Expand a layout into its spawn queue, top row first
pub fn generate_wave(layout: &[LayoutRow]) -> VecDeque<SpawnDescriptor> {
    let mut queue = VecDeque::with_capacity(layout.iter().map(|r| r.count as usize).sum());
    for (row, entry) in layout.iter().enumerate() {
        for i in 0..entry.count {
            queue.push_back(SpawnDescriptor {
                kind: entry.kind,
                cell: GridCell {
                    col: entry.offset + i,
                    row: row as u32,
                },
            });
        }
    }
    queue
}

/// Slot position of `cell` on a canvas `canvas_width` wide
pub fn formation_target(cell: GridCell, formation: &FormationConfig, canvas_width: f32) -> Vec2 {
    let grid_width = formation.cols as f32 * formation.cell_width;
    Vec2::new(
        canvas_width / 2.0 - grid_width / 2.0 + cell.col as f32 * formation.cell_width,
        formation.top_offset + cell.row as f32 * formation.cell_height,
    )
}

/// Breathing x for a slot at `target_x`. Every formation enemy shares
/// the same phase, so the grid sways in lockstep.
#[inline]
pub fn breathing_x(target_x: f32, elapsed_secs: f64, formation: &FormationConfig) -> f32 {
    let phase = (elapsed_secs * formation.breathe_rate as f64).sin() as f32;
    target_x + phase * formation.breathe_amplitude
}
