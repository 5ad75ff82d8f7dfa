use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Custody lifecycle state of a batch.
///
/// The numeric codes are part of the public surface (projections and
/// external viewers key on them) and must stay stable:
/// `Created(0) → Distributed(1) → Retail(2) → Sold(3)`, with the
/// absorbing `Closed(4)` reachable from any non-closed state via recall.
///
/// Which transitions are legal, and under which roles, is the ledger's
/// business rule; states themselves are plain data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchState {
    /// Minted by a manufacturer; not yet handed off.
    Created,
    /// In a distributor's custody.
    Distributed,
    /// In a retailer's custody.
    Retail,
    /// Sold to an end recipient; terminal for transfers.
    Sold,
    /// Recalled; terminal for everything.
    Closed,
}

impl BatchState {
    /// Stable numeric code for projections and external consumers.
    pub fn code(&self) -> u8 {
        match self {
            BatchState::Created => 0,
            BatchState::Distributed => 1,
            BatchState::Retail => 2,
            BatchState::Sold => 3,
            BatchState::Closed => 4,
        }
    }

    /// Parse a numeric code back into a state.
    pub fn from_code(code: u8) -> Result<Self, TypeError> {
        match code {
            0 => Ok(BatchState::Created),
            1 => Ok(BatchState::Distributed),
            2 => Ok(BatchState::Retail),
            3 => Ok(BatchState::Sold),
            4 => Ok(BatchState::Closed),
            other => Err(TypeError::UnknownState(other)),
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchState::Created => write!(f, "CREATED"),
            BatchState::Distributed => write!(f, "DISTRIBUTED"),
            BatchState::Retail => write!(f, "RETAIL"),
            BatchState::Sold => write!(f, "SOLD"),
            BatchState::Closed => write!(f, "CLOSED"),
        }
    }
}
