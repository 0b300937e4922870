//! DTOs shaped for the client editor template.

use serde::Serialize;

use crate::domain::client::ClientData;
use crate::widgets::GeneratedCode;

/// Colors as `#rrggbb` for the HTML color inputs.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EditorColors {
    pub primary: String,
    pub secondary: String,
    pub booking_footer: String,
    pub button_font_on_hover: String,
}

/// Aggregated data required to render the client editor.
#[derive(Debug, Serialize)]
pub struct ClientPageData {
    pub client: ClientData,
    pub integration_name: &'static str,
    pub integration_label: &'static str,
    pub colors: EditorColors,
    pub has_unsaved_changes: bool,
    pub codes: Vec<GeneratedCode>,
    /// All-listings document shown in the sandboxed preview frame.
    pub preview: String,
    pub completed_todos: usize,
    pub can_delete_image: bool,
}

/// Result of a save request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Unchanged,
}
