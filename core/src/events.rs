//! Combat events reported after each turn resolves.
//!
//! The board collaborator reports what happened during the previous turn's
//! combat as an ordered list of [`EventRecord`] values. Recorded matches carry
//! them inside action-frame JSON documents; [`decode_frame`] extracts them,
//! dropping malformed entries instead of failing the whole frame.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{Location, Player, UnitKind};

/// Failure to read an action frame at all.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame is not valid JSON.
    #[error("action frame is not valid JSON")]
    Json(#[from] serde_json::Error),
    /// The frame has no `events` object.
    #[error("action frame has no events object")]
    MissingEvents,
}

/// Category of a reported event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A mobile unit reached its target edge.
    Breach,
    /// A structure or unit took damage.
    Damage,
    /// A unit entered the board.
    Spawn,
}

/// One event delivered by the board collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Category of the event.
    pub kind: EventKind,
    /// Cell where the event happened.
    pub location: Location,
    /// Magnitude for breach and damage events.
    pub amount: Option<f64>,
    /// Unit involved, when the feed reports it.
    pub unit: Option<UnitKind>,
    /// Side owning the unit involved.
    pub owner: Player,
}

impl EventRecord {
    /// Creates a breach record.
    #[must_use]
    pub const fn breach(location: Location, owner: Player) -> Self {
        Self {
            kind: EventKind::Breach,
            location,
            amount: Some(1.0),
            unit: None,
            owner,
        }
    }

    /// Creates a damage record.
    #[must_use]
    pub const fn damage(location: Location, amount: f64, owner: Player) -> Self {
        Self {
            kind: EventKind::Damage,
            location,
            amount: Some(amount),
            unit: None,
            owner,
        }
    }

    /// Creates a spawn record.
    #[must_use]
    pub const fn spawn(location: Location, unit: UnitKind, owner: Player) -> Self {
        Self {
            kind: EventKind::Spawn,
            location,
            amount: None,
            unit: Some(unit),
            owner,
        }
    }
}

/// Breach retained in the match-long history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreachEvent {
    /// Cell where the breach happened.
    pub location: Location,
    /// Turn during which the breach was reported.
    pub turn: u32,
}

/// Damage retained in the match-long history.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DamageEvent {
    /// Cell where the damage landed.
    pub location: Location,
    /// Damage dealt.
    pub amount: f64,
    /// Turn during which the damage was reported.
    pub turn: u32,
}

/// Events extracted from one action frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedFrame {
    /// Well-formed events in frame order: breaches, then damage, then spawns.
    pub records: Vec<EventRecord>,
    /// Number of entries that were malformed and skipped.
    pub dropped: usize,
}

/// Extracts the event records carried by an action-frame JSON document.
pub fn decode_frame(frame: &str) -> Result<DecodedFrame, FrameError> {
    let document: Value = serde_json::from_str(frame)?;
    let events = document
        .get("events")
        .and_then(Value::as_object)
        .ok_or(FrameError::MissingEvents)?;

    let mut decoded = DecodedFrame::default();
    let sections = [
        ("breach", EventKind::Breach),
        ("damage", EventKind::Damage),
        ("spawn", EventKind::Spawn),
    ];
    for (name, kind) in sections {
        let Some(entries) = events.get(name).and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            match decode_entry(kind, entry) {
                Some(record) => decoded.records.push(record),
                None => {
                    decoded.dropped += 1;
                    tracing::warn!(section = name, %entry, "dropping malformed event entry");
                }
            }
        }
    }
    Ok(decoded)
}

fn decode_entry(kind: EventKind, entry: &Value) -> Option<EventRecord> {
    let fields = entry.as_array()?;
    let location = decode_location(fields.first()?)?;
    match kind {
        EventKind::Breach | EventKind::Damage => {
            let amount = fields.get(1)?.as_f64()?;
            let unit = fields
                .get(2)
                .and_then(Value::as_u64)
                .and_then(|index| UnitKind::from_index(usize::try_from(index).ok()?));
            let owner = decode_player(fields.get(4)?)?;
            Some(EventRecord {
                kind,
                location,
                amount: Some(amount),
                unit,
                owner,
            })
        }
        EventKind::Spawn => {
            let index = usize::try_from(fields.get(1)?.as_u64()?).ok()?;
            let unit = UnitKind::from_index(index)?;
            let owner = decode_player(fields.get(3)?)?;
            Some(EventRecord::spawn(location, unit, owner))
        }
    }
}

fn decode_location(value: &Value) -> Option<Location> {
    let pair = value.as_array()?;
    let x = i32::try_from(pair.first()?.as_i64()?).ok()?;
    let y = i32::try_from(pair.get(1)?.as_i64()?).ok()?;
    Location::new(x, y).ok()
}

fn decode_player(value: &Value) -> Option<Player> {
    match value.as_u64()? {
        1 => Some(Player::Own),
        2 => Some(Player::Opponent),
        _ => None,
    }
}
