use std::{error::Error, fmt};

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use lane_tactics_core::{Location, Occupant, StructureKind, ARENA_SIZE};
use serde::{Deserialize, Serialize};

const LAYOUT_DOMAIN: &str = "lane";
const LAYOUT_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded layout payload.
const LAYOUT_HEADER: &str = "lane:v1";
/// Delimiter separating the prefix, version and payload.
const FIELD_DELIMITER: char = ':';

/// Structures one side has placed, seen from that side's own half.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutSnapshot {
    /// Structures composing the layout.
    pub(crate) structures: Vec<LayoutStructure>,
}

/// Structure captured within a layout snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct LayoutStructure {
    /// Kind of structure.
    pub(crate) kind: StructureKind,
    /// Cell the structure occupies.
    pub(crate) location: Location,
    /// Whether the structure is upgraded.
    #[serde(default)]
    pub(crate) upgraded: bool,
}

impl LayoutSnapshot {
    /// Captures structures listed by the board.
    pub(crate) fn capture(structures: &[(Location, Occupant)]) -> Self {
        Self {
            structures: structures
                .iter()
                .map(|&(location, occupant)| LayoutStructure {
                    kind: occupant.kind,
                    location,
                    upgraded: occupant.upgraded,
                })
                .collect(),
        }
    }

    /// The same layout as seen from the other side of the arena.
    pub(crate) fn rotated(&self) -> Self {
        Self {
            structures: self
                .structures
                .iter()
                .filter_map(|structure| {
                    let [x, y]: [i32; 2] = structure.location.into();
                    let location = Location::new(ARENA_SIZE - 1 - x, ARENA_SIZE - 1 - y).ok()?;
                    Some(LayoutStructure {
                        location,
                        ..*structure
                    })
                })
                .collect(),
        }
    }

    /// Encodes the layout into a single-line string.
    pub(crate) fn encode(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        let encoded = STANDARD_NO_PAD.encode(json);
        Ok(format!("{LAYOUT_HEADER}{FIELD_DELIMITER}{encoded}"))
    }

    /// Decodes a layout from its string representation.
    pub(crate) fn decode(value: &str) -> Result<Self, LayoutTransferError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LayoutTransferError::EmptyPayload);
        }

        let mut parts = trimmed.splitn(3, FIELD_DELIMITER);
        let domain = parts.next().ok_or(LayoutTransferError::MissingPrefix)?;
        let version = parts.next().ok_or(LayoutTransferError::MissingVersion)?;
        let payload = parts.next().ok_or(LayoutTransferError::MissingPayload)?;

        if domain != LAYOUT_DOMAIN {
            return Err(LayoutTransferError::InvalidPrefix(domain.to_owned()));
        }
        if version != LAYOUT_VERSION {
            return Err(LayoutTransferError::UnsupportedVersion(version.to_owned()));
        }

        let bytes = STANDARD_NO_PAD
            .decode(payload.as_bytes())
            .map_err(LayoutTransferError::InvalidEncoding)?;
        serde_json::from_slice(&bytes).map_err(LayoutTransferError::InvalidPayload)
    }
}

/// Errors that can occur while decoding layout transfer strings.
#[derive(Debug)]
pub(crate) enum LayoutTransferError {
    /// The provided string was empty or contained only whitespace.
    EmptyPayload,
    /// The prefix segment was missing.
    MissingPrefix,
    /// The version segment was missing.
    MissingVersion,
    /// The payload segment was missing.
    MissingPayload,
    /// The prefix segment was not `lane`.
    InvalidPrefix(String),
    /// The version identifier is not supported.
    UnsupportedVersion(String),
    /// The base64 payload could not be decoded.
    InvalidEncoding(base64::DecodeError),
    /// The decoded payload could not be deserialised, or named a cell outside the arena.
    InvalidPayload(serde_json::Error),
}

impl fmt::Display for LayoutTransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPayload => write!(f, "layout string was empty"),
            Self::MissingPrefix => write!(f, "layout string is missing the prefix"),
            Self::MissingVersion => write!(f, "layout string is missing the version"),
            Self::MissingPayload => write!(f, "layout string is missing the payload"),
            Self::InvalidPrefix(prefix) => write!(f, "layout prefix '{prefix}' is not supported"),
            Self::UnsupportedVersion(version) => {
                write!(f, "layout version '{version}' is not supported")
            }
            Self::InvalidEncoding(error) => {
                write!(f, "could not decode layout payload: {error}")
            }
            Self::InvalidPayload(error) => {
                write!(f, "could not parse layout payload: {error}")
            }
        }
    }
}

impl Error for LayoutTransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidEncoding(error) => Some(error),
            Self::InvalidPayload(error) => Some(error),
            _ => None,
        }
    }
}
