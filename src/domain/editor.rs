//! Working copy of a client record being edited.

use serde::Serialize;

use crate::domain::client::ClientData;

/// Pairs the last saved snapshot of a client with the edited copy.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct PreferencesDraft {
    original: ClientData,
    working: ClientData,
}

impl PreferencesDraft {
    /// Starts editing from a freshly loaded record.
    pub fn new(original: ClientData) -> Self {
        let working = original.clone();
        Self { original, working }
    }

    pub fn with_changes(original: ClientData, working: ClientData) -> Self {
        Self { original, working }
    }

    pub fn working(&self) -> &ClientData {
        &self.working
    }

    /// Structural comparison of the working copy with the snapshot.
    pub fn has_unsaved_changes(&self) -> bool {
        self.original != self.working
    }
}
