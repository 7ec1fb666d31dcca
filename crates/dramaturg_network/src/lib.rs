//! Character, relationship and conflict graph for Dramaturg.
//!
//! A [`ConflictNetwork`] is built once per analysis run by the network
//! station and then read (and lightly enriched) by later stations. Every
//! relationship and conflict references characters already in the network;
//! insertion rejects anything that would break that.
//!
//! Snapshots are independent deep copies, so later mutation never alters
//! recorded history.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod kinds;
mod network;
mod types;

pub use kinds::{
    ConflictPhase, ConflictScope, ConflictSubject, Directionality, RelationshipNature,
    RelationshipType,
};
pub use network::{ConflictNetwork, NetworkSummary, Snapshot};
pub use types::{
    Character, CharacterProfile, Conflict, ConflictDraft, Relationship, RelationshipDraft,
};
