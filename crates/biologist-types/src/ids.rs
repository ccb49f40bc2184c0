//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Analysis engine instances are addressed by a [`BiologistId`]. IDs use
//! UUID v7 (time-ordered) so a registry listing naturally sorts by creation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an analysis engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BiologistId(pub Uuid);

impl BiologistId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for BiologistId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for BiologistId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for BiologistId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<BiologistId> for Uuid {
    fn from(id: BiologistId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(BiologistId::new(), BiologistId::new());
    }

    #[test]
    fn display_matches_uuid() {
        let id = BiologistId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn uuid_round_trip() {
        let raw = Uuid::now_v7();
        let id = BiologistId::from(raw);
        assert_eq!(Uuid::from(id), raw);
    }
}
