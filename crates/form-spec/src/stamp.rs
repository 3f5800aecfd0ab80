use chrono::{DateTime, Utc};

use crate::ids::Actor;

/// Who made an edit and when. Every mutation takes one explicitly; nothing in
/// the model reads a clock or a global user on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub actor: Actor,
    pub at: DateTime<Utc>,
}

impl Stamp {
    pub fn new(actor: impl Into<Actor>, at: DateTime<Utc>) -> Self {
        Self {
            actor: actor.into(),
            at,
        }
    }

    /// Stamp for `actor` at the current wall-clock time.
    pub fn now(actor: impl Into<Actor>) -> Self {
        Self::new(actor, Utc::now())
    }
}
