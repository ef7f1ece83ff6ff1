use crate::assistant::{Analysis, EditedFile};
use crate::editor::Language;

/// Completion events sent from spawned assistant tasks back to the UI
/// thread. Every variant settles exactly one outstanding request, so the
/// app clears its processing flag whenever one arrives.
#[derive(Debug, Clone)]
pub enum AppEvent {
    ChatReply(String),
    CodeGenerated { language: Language, code: String },
    AnalysisReady { language: Language, analysis: Analysis },
    BulkEditApplied { files: Vec<EditedFile> },
    AssistantFailed(String),
}
