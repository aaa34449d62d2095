//! Identity and clock collaborators.
//!
//! # Invariants
//! - Allocated IDs are unique; callers must not depend on their format.
//! - Allocation is safe to call from any thread.

use crate::model::timestamp::Timestamp;
use chrono::Utc;
use log::debug;
use uuid::Uuid;

/// Kind of record an ID is allocated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Trip,
    Template,
}

impl IdKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Trip => "trip",
            Self::Template => "template",
        }
    }
}

/// Allocates a new opaque unique ID.
pub fn allocate_id(kind: IdKind) -> String {
    let id = Uuid::new_v4().to_string();
    debug!("event=id_allocated module=ids kind={}", kind.as_str());
    id
}

/// Current wall-clock time.
pub fn now_millis() -> Timestamp {
    Timestamp::from_millis(Utc::now().timestamp_millis())
}
