use crate::editor::{BulkFile, Language};
use crate::event::AppEvent;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::mpsc;
use std::sync::Arc;
use tokio::runtime::Handle;

pub mod backend;
pub mod report;

use backend::{AssistantBackend, AssistantError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiModel {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub specialization: Option<String>,
}

/// Fixed model catalog. The selected id is passed through to the backend
/// uninterpreted; the simulator ignores it, a real backend would branch on it.
pub fn model_catalog() -> Vec<AiModel> {
    fn model(id: &str, name: &str, provider: &str, specialization: Option<&str>) -> AiModel {
        AiModel {
            id: id.to_string(),
            name: name.to_string(),
            provider: provider.to_string(),
            specialization: specialization.map(str::to_string),
        }
    }

    vec![
        model("deepseek-coder", "DeepSeek Coder", "DeepSeek", Some("Code")),
        model("deepseek-chat", "DeepSeek Chat", "DeepSeek", None),
        model("other-php", "PHP Expert", "AI Provider", Some("PHP/Laravel")),
        model(
            "other-frontend",
            "Frontend Expert",
            "AI Provider",
            Some("HTML/CSS/JS"),
        ),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReply {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub suggestions: Vec<String>,
    pub improvements: Vec<String>,
    pub bugs: Vec<String>,
    pub explanation: String,
    pub detail: AnalysisDetail,
}

/// Explicit discriminant for the capability set; the extended variant only
/// appears when the analyzed language is the PHP-like one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisDetail {
    Base,
    PhpExtended {
        security_issues: Vec<String>,
        performance_issues: Vec<String>,
        best_practices: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedFile {
    pub path: String,
    pub content: String,
    pub changes: Vec<String>,
}

/// Issues the four assistant operations as fire-and-forget tasks on the
/// tokio runtime and reports completion over the app event channel. The
/// client has no queueing and no protection against concurrent calls; the
/// UI layer enforces at-most-one-outstanding-request with its processing
/// flag.
#[derive(Clone)]
pub struct AssistantClient {
    backend: Arc<dyn AssistantBackend>,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl AssistantClient {
    pub fn new(
        backend: Arc<dyn AssistantBackend>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Result<Self, AssistantError> {
        let runtime_handle = Handle::try_current()
            .map_err(|err| AssistantError::Runtime(format!("tokio runtime unavailable: {err}")))?;

        Ok(Self {
            backend,
            tx,
            runtime_handle,
        })
    }

    pub fn chat(&self, message: String, model: String) {
        let backend = Arc::clone(&self.backend);
        self.attempt(
            "Sorry, I encountered an error processing your request. Please try again.".to_string(),
            async move {
                let reply = backend.chat(&message, &model).await?;
                Ok(AppEvent::ChatReply(reply.content))
            },
        );
    }

    pub fn generate_code(&self, prompt: String, language: Language, framework: String, model: String) {
        let backend = Arc::clone(&self.backend);
        self.attempt(
            format!(
                "Sorry, I encountered an error generating {} code. Please try again.",
                language.as_str()
            ),
            async move {
                let raw = backend
                    .generate_code(&prompt, language, &framework, &model)
                    .await?;
                let code = report::extract_fenced_code(&raw);
                Ok(AppEvent::CodeGenerated { language, code })
            },
        );
    }

    pub fn analyze_code(&self, code: String, language: Language, model: String) {
        let backend = Arc::clone(&self.backend);
        self.attempt(
            format!(
                "Sorry, I encountered an error analyzing your {} code. Please try again.",
                language.as_str()
            ),
            async move {
                let analysis = backend.analyze_code(&code, language, &model).await?;
                Ok(AppEvent::AnalysisReady { language, analysis })
            },
        );
    }

    pub fn bulk_edit(&self, files: Vec<BulkFile>, instructions: String, model: String) {
        let backend = Arc::clone(&self.backend);
        self.attempt(
            "Sorry, I encountered an error performing bulk edits. Please try again.".to_string(),
            async move {
                let edited = backend.bulk_edit(&files, &instructions, &model).await?;
                Ok(AppEvent::BulkEditApplied { files: edited })
            },
        );
    }

    // Single retry-free attempt wrapper: success maps to a typed event,
    // any backend failure to one synthesized assistant-role notice. Raw
    // errors never reach the transcript.
    fn attempt<F>(&self, failure_notice: String, op: F)
    where
        F: Future<Output = Result<AppEvent, AssistantError>> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime_handle.spawn(async move {
            let event = match op.await {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(error = %err, "assistant request failed");
                    AppEvent::AssistantFailed(failure_notice)
                }
            };
            // The receiver is gone after window close; dropped events are
            // the benign unmount race.
            let _ = tx.send(event);
        });
    }
}
