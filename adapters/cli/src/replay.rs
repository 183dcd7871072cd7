use std::{fs, path::Path};

use anyhow::{Context, Result};
use lane_tactics_core::{decode_frame, EventRecord, Player, StructureKind};
use lane_tactics_system_driver::{TurnDriver, TurnReport};
use lane_tactics_world::World;

use crate::layout_transfer::LayoutSnapshot;

/// Recorded action frames, one per turn.
#[derive(Clone, Debug, Default)]
pub(crate) struct FrameLog {
    frames: Vec<String>,
}

impl FrameLog {
    /// Reads a JSON-lines file; blank lines keep their turn slot empty.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading action frames from {}", path.display()))?;
        Ok(Self {
            frames: contents.lines().map(str::to_owned).collect(),
        })
    }

    /// Events recorded after the given turn; unreadable frames yield none.
    pub(crate) fn events_after(&self, turn: u32) -> Vec<EventRecord> {
        let Some(frame) = self.frames.get(turn as usize) else {
            return Vec::new();
        };
        if frame.trim().is_empty() {
            return Vec::new();
        }
        match decode_frame(frame) {
            Ok(decoded) => decoded.records,
            Err(error) => {
                tracing::warn!(turn, %error, "skipping unreadable action frame");
                Vec::new()
            }
        }
    }
}

/// Places an opponent layout, rotated onto the far half.
pub(crate) fn seed_opponent(world: &mut World, layout: &LayoutSnapshot) -> usize {
    layout
        .rotated()
        .structures
        .into_iter()
        .filter(|structure| {
            if structure.upgraded {
                world.place_upgraded(Player::Opponent, structure.kind, structure.location)
            } else {
                world.place(Player::Opponent, structure.kind, structure.location)
            }
        })
        .count()
}

/// Plays `turns` turns, feeding recorded events between them.
pub(crate) fn run(
    driver: &mut TurnDriver,
    world: &mut World,
    frames: &FrameLog,
    turns: u32,
) -> Vec<TurnReport> {
    let mut reports = Vec::new();
    for _ in 0..turns {
        let report = driver.play_turn(world);
        let events = frames.events_after(report.turn);
        world.apply_breaches(&events);
        driver.ingest(&events);
        world.advance_turn();
        reports.push(report);
    }
    reports
}

/// One summary line per turn.
pub(crate) fn describe(report: &TurnReport) -> String {
    let mut line = format!(
        "turn {} phase {:?} spent sp={:.1} mp={:.1} placed={} commands={}",
        report.turn,
        report.phase,
        report.summary.spent.structure,
        report.summary.spent.mobile,
        report.summary.placements.len(),
        report.summary.commands.len(),
    );
    if !report.transitions.is_empty() {
        line.push_str(&format!(" transitions={:?}", report.transitions));
    }
    if let Some(wave) = report.wave {
        line.push_str(&format!(
            " wave={}x{} at {}",
            wave.lane, wave.count, wave.entry
        ));
    }
    if report.intercepted() {
        line.push_str(&format!(" interceptors={}", report.intercepts.len()));
    }
    if !report.reactive.is_empty() {
        line.push_str(&format!(" reactive={}", report.reactive.len()));
    }
    if let Some(best) = report.advisory.fast {
        line.push_str(&format!(" fast_entry={}", best.location));
    }
    if let Some(best) = report.advisory.heavy {
        line.push_str(&format!(" heavy_entry={}", best.location));
    }
    line
}

/// Counts the structures a side ended the replay with.
pub(crate) fn structure_counts(world: &World, player: Player) -> [usize; 3] {
    let structures = world.structures(player);
    StructureKind::ALL.map(|kind| {
        structures
            .iter()
            .filter(|(_, occupant)| occupant.kind == kind)
            .count()
    })
}
