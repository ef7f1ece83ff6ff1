use crate::assistant::{model_catalog, report, AiModel, AssistantClient};
use crate::conversation::{Conversation, Role};
use crate::editor::{EditorState, Language};
use crate::event::AppEvent;
use crate::preview::PreviewPane;
use crate::settings::{store, Settings};
use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkspaceTab {
    Editor,
    Preview,
    BulkEdit,
}

pub struct WizardApp {
    rx: Receiver<AppEvent>,
    assistant: AssistantClient,
    conversation: Conversation,
    editor: EditorState,
    preview: PreviewPane,
    settings: Settings,
    models: Vec<AiModel>,
    selected_model: String,
    theme: Theme,
    theme_applied: bool,
    // The only concurrency-control primitive: at most one outstanding
    // assistant request. Set right before dispatch, cleared when any
    // completion event is applied.
    is_processing: bool,
    chat_input: String,
    bulk_instructions: String,
    api_key_input: String,
    active_tab: WorkspaceTab,
    active_language: Language,
    diagnostics_log: Vec<String>,
    scroll_to_bottom: bool,
}

impl WizardApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        assistant: AssistantClient,
        settings: Settings,
        startup_warnings: Vec<String>,
    ) -> Self {
        let models = model_catalog();
        let selected_model = models
            .first()
            .map(|model| model.id.clone())
            .unwrap_or_default();

        let mut app = Self {
            rx,
            assistant,
            conversation: Conversation::new(),
            editor: EditorState::with_seed_samples(),
            preview: PreviewPane::new(),
            settings,
            models,
            selected_model,
            theme: Theme::default(),
            theme_applied: false,
            is_processing: false,
            chat_input: String::new(),
            bulk_instructions: String::new(),
            api_key_input: String::new(),
            active_tab: WorkspaceTab::Editor,
            active_language: Language::Html,
            diagnostics_log: Vec::new(),
            scroll_to_bottom: false,
        };

        for warning in startup_warnings {
            app.log_diagnostic(warning);
        }

        app
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
    }

    fn submit_chat(&mut self, ctx: Option<&egui::Context>) {
        if self.is_processing {
            return;
        }
        let message = self.chat_input.trim().to_string();
        if message.is_empty() {
            return;
        }

        self.conversation.append_user(message.clone());
        self.chat_input.clear();
        self.is_processing = true;
        self.assistant.chat(message, self.selected_model.clone());

        self.scroll_to_bottom = true;
        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    /// Generates code for `language` from the most recent user turn. A
    /// button click is not itself a chat turn, so there is nothing to do
    /// until the user has asked for something.
    fn request_generation(&mut self, language: Language, ctx: Option<&egui::Context>) {
        if self.is_processing {
            return;
        }
        let Some(last_user_turn) = self.conversation.latest_user_turn() else {
            return;
        };
        let prompt = last_user_turn.content.clone();

        self.is_processing = true;
        self.assistant
            .generate_code(prompt, language, String::new(), self.selected_model.clone());

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn request_analysis(&mut self, language: Language, ctx: Option<&egui::Context>) {
        if self.is_processing {
            return;
        }
        let code = self.editor.buffer(language);
        if code.trim().is_empty() {
            return;
        }

        self.is_processing = true;
        self.assistant
            .analyze_code(code.to_string(), language, self.selected_model.clone());

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn request_bulk_edit(&mut self, ctx: Option<&egui::Context>) {
        if self.is_processing {
            return;
        }
        if self.bulk_instructions.trim().is_empty() || self.editor.bulk_files.is_empty() {
            return;
        }

        self.is_processing = true;
        self.assistant.bulk_edit(
            self.editor.bulk_files.clone(),
            self.bulk_instructions.clone(),
            self.selected_model.clone(),
        );

        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn save_api_key(&mut self) {
        let key = self.api_key_input.trim();
        if key.is_empty() {
            return;
        }

        self.settings.api_key = Some(key.to_string());
        self.api_key_input.clear();
        if let Err(err) = store::save(&self.settings) {
            self.log_diagnostic(format!("failed to persist settings: {err}"));
        }

        self.conversation.append_assistant(
            "✅ API key saved successfully! You can now use all features of the AI assistant."
                .to_string(),
        );
        self.scroll_to_bottom = true;
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => self.apply_event(event, Some(ctx)),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent, ctx: Option<&egui::Context>) {
        // Every event settles the single outstanding request, success or not.
        self.is_processing = false;

        match event {
            AppEvent::ChatReply(content) => {
                self.conversation.append_assistant(content);
            }
            AppEvent::CodeGenerated { language, code } => {
                self.editor.set_buffer(language, code);
                self.conversation.append_assistant(format!(
                    "I've generated {} code based on your request and updated the editor.",
                    language.upper_tag()
                ));
            }
            AppEvent::AnalysisReady { language, analysis } => {
                self.conversation
                    .append_assistant(report::format_analysis(language, &analysis));
            }
            AppEvent::BulkEditApplied { files } => {
                let contents: Vec<String> =
                    files.iter().map(|file| file.content.clone()).collect();
                self.editor.apply_bulk_edit(&contents);
                self.conversation
                    .append_assistant(report::format_bulk_report(&files));
            }
            AppEvent::AssistantFailed(notice) => {
                self.log_diagnostic("assistant request settled with a failure notice");
                self.conversation.append_assistant(notice);
            }
        }

        self.scroll_to_bottom = true;
        if let Some(ctx) = ctx {
            ctx.request_repaint();
        }
    }

    fn selected_model_name(&self) -> &str {
        self.models
            .iter()
            .find(|model| model.id == self.selected_model)
            .map(|model| model.name.as_str())
            .unwrap_or("Select model")
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("Web Wizard");
                ui.separator();

                ui.label("AI Model");
                egui::ComboBox::from_id_salt("model_select")
                    .selected_text(self.selected_model_name().to_string())
                    .show_ui(ui, |ui| {
                        for model in &self.models {
                            let label = match &model.specialization {
                                Some(specialization) => format!(
                                    "{} ({}) — {specialization}",
                                    model.name, model.provider
                                ),
                                None => format!("{} ({})", model.name, model.provider),
                            };
                            ui.selectable_value(&mut self.selected_model, model.id.clone(), label);
                        }
                    });

                ui.separator();
                if self.is_processing {
                    ui.spinner();
                    ui.label(RichText::new("Working...").color(self.theme.text_muted));
                } else {
                    ui.label(RichText::new("Ready").color(self.theme.success));
                }
            });
        });
    }

    fn render_api_key_banner(&mut self, ctx: &egui::Context) {
        if self.settings.has_api_key() {
            return;
        }

        let mut save_now = false;
        egui::TopBottomPanel::top("api_key_banner").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(RichText::new("⚠ AI API Key Required").color(self.theme.warning));
                ui.label(
                    RichText::new("Stored locally; any text works as a simulated key.")
                        .color(self.theme.text_muted)
                        .size(12.0),
                );
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.api_key_input)
                        .password(true)
                        .hint_text("Enter your API key")
                        .desired_width(260.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    save_now = true;
                }
                save_now |= ui.button("Save Key").clicked();
            });
        });

        if save_now {
            self.save_api_key();
        }
    }

    fn render_chat_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("chat_panel")
            .resizable(true)
            .default_width(380.0)
            .show(ctx, |ui| {
                ui.heading("Assistant Chat");
                ui.separator();

                let transcript_height = (ui.available_height() - 190.0).max(120.0);
                ScrollArea::vertical()
                    .id_salt("chat_transcript")
                    .max_height(transcript_height)
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        for message in self.conversation.messages() {
                            let (prefix, color) = match message.role {
                                Role::User => ("You", self.theme.accent),
                                Role::Assistant => ("Assistant", self.theme.success),
                            };
                            ui.horizontal_wrapped(|ui| {
                                ui.label(RichText::new(prefix).color(color).strong());
                                ui.label(&message.content);
                            });
                            ui.add_space(self.theme.spacing_4);
                        }

                        if self.scroll_to_bottom {
                            ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                        }
                    });
                self.scroll_to_bottom = false;

                ui.separator();
                egui::CollapsingHeader::new("Diagnostics")
                    .default_open(false)
                    .show(ui, |ui| {
                        ScrollArea::vertical()
                            .id_salt("diagnostics_log")
                            .max_height(80.0)
                            .stick_to_bottom(true)
                            .show(ui, |ui| {
                                for entry in &self.diagnostics_log {
                                    ui.label(RichText::new(entry).size(11.0));
                                }
                            });
                    });

                ui.separator();
                let input_enabled = !self.is_processing;
                let hint = if self.is_processing {
                    "Waiting for response..."
                } else {
                    "Ask about code, website editing, Laravel, PHP..."
                };

                let mut send_now = false;
                let frame = self.theme.composer_frame();
                frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let response = ui.add_enabled(
                            input_enabled,
                            egui::TextEdit::singleline(&mut self.chat_input)
                                .desired_width(f32::INFINITY)
                                .hint_text(hint),
                        );
                        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                            send_now = true;
                        }

                        let clicked = ui
                            .add_enabled(
                                input_enabled && !self.chat_input.trim().is_empty(),
                                egui::Button::new("Send"),
                            )
                            .clicked();
                        send_now |= clicked;
                    });
                });

                if send_now && input_enabled {
                    self.submit_chat(Some(ctx));
                }

                ui.add_space(self.theme.spacing_4);
                ui.label(RichText::new("Generate into editor").color(self.theme.text_muted));
                let can_generate = !self.is_processing && self.conversation.latest_user_turn().is_some();
                let mut generate_request: Option<Language> = None;
                ui.horizontal(|ui| {
                    for language in Language::ALL {
                        if ui
                            .add_enabled(can_generate, egui::Button::new(language.display_name()))
                            .clicked()
                        {
                            generate_request = Some(language);
                        }
                    }
                });
                if let Some(language) = generate_request {
                    self.request_generation(language, Some(ctx));
                }
            });
    }

    fn render_workspace_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for (tab, label) in [
                    (WorkspaceTab::Editor, "Code Editor"),
                    (WorkspaceTab::Preview, "Preview"),
                    (WorkspaceTab::BulkEdit, "Bulk Edit"),
                ] {
                    if ui.selectable_label(self.active_tab == tab, label).clicked() {
                        self.active_tab = tab;
                    }
                }
            });
            ui.separator();

            match self.active_tab {
                WorkspaceTab::Editor => self.render_editor_tab(ui, ctx),
                WorkspaceTab::Preview => {
                    self.preview.ui(
                        ui,
                        &self.theme,
                        self.editor.buffer(Language::Html),
                        self.editor.buffer(Language::Css),
                        self.editor.buffer(Language::Js),
                    );
                }
                WorkspaceTab::BulkEdit => self.render_bulk_tab(ui, ctx),
            }
        });
    }

    fn render_editor_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let mut analyze_request: Option<Language> = None;

        ui.horizontal(|ui| {
            for language in Language::ALL {
                if ui
                    .selectable_label(self.active_language == language, language.display_name())
                    .clicked()
                {
                    self.active_language = language;
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let can_analyze = !self.is_processing
                    && !self.editor.buffer(self.active_language).trim().is_empty();
                if ui
                    .add_enabled(can_analyze, egui::Button::new("🔍 Analyze"))
                    .clicked()
                {
                    analyze_request = Some(self.active_language);
                }
            });
        });

        ScrollArea::vertical()
            .id_salt("code_editor")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(self.editor.buffer_mut(self.active_language))
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .desired_rows(24),
                );
            });

        if let Some(language) = analyze_request {
            self.request_analysis(language, Some(ctx));
        }
    }

    fn render_bulk_tab(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.label("Edit Instructions");
        ui.add(
            egui::TextEdit::multiline(&mut self.bulk_instructions)
                .hint_text("Describe what changes to make across all files...")
                .desired_width(f32::INFINITY)
                .desired_rows(3),
        );

        let mut apply_now = false;
        ui.horizontal(|ui| {
            let can_apply = !self.is_processing
                && !self.bulk_instructions.trim().is_empty()
                && !self.editor.bulk_files.is_empty();
            apply_now = ui
                .add_enabled(can_apply, egui::Button::new("🔧 Apply Bulk Edit"))
                .clicked();

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Add File").clicked() {
                    self.editor.add_bulk_file();
                }
                ui.label(RichText::new("Files").color(self.theme.text_muted));
            });
        });

        let mut remove_index: Option<usize> = None;
        ScrollArea::vertical()
            .id_salt("bulk_files")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, file) in self.editor.bulk_files.iter_mut().enumerate() {
                    let frame = self.theme.card_frame();
                    frame.show(ui, |ui| {
                        ui.horizontal(|ui| {
                            ui.add(
                                egui::TextEdit::singleline(&mut file.path)
                                    .hint_text("File path")
                                    .desired_width(ui.available_width() - 80.0),
                            );
                            let remove_label =
                                RichText::new("Remove").color(self.theme.danger);
                            if ui.button(remove_label).clicked() {
                                remove_index = Some(index);
                            }
                        });
                        ui.add(
                            egui::TextEdit::multiline(&mut file.content)
                                .code_editor()
                                .hint_text("File content")
                                .desired_width(f32::INFINITY)
                                .desired_rows(4),
                        );
                    });
                    ui.add_space(self.theme.spacing_8);
                }
            });

        if let Some(index) = remove_index {
            self.editor.remove_bulk_file(index);
        }
        if apply_now {
            self.request_bulk_edit(Some(ctx));
        }
    }
}

impl eframe::App for WizardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }

        self.drain_events(ctx);
        self.render_top_bar(ctx);
        self.render_api_key_banner(ctx);
        self.render_chat_panel(ctx);
        self.render_workspace_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::WizardApp;
    use crate::assistant::backend::{AssistantBackend, AssistantError};
    use crate::assistant::{AiReply, Analysis, AnalysisDetail, AssistantClient, EditedFile};
    use crate::editor::{BulkFile, Language};
    use crate::settings::Settings;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::time::Duration;

    /// Instant, countable backend standing in for the simulator.
    #[derive(Default)]
    struct StubBackend {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubBackend {
        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn record(&self) -> Result<(), AssistantError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(AssistantError::Unavailable("stub failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AssistantBackend for StubBackend {
        async fn chat(&self, _message: &str, model: &str) -> Result<AiReply, AssistantError> {
            self.record()?;
            Ok(AiReply {
                content: "stub reply".to_string(),
                model: model.to_string(),
                usage: None,
            })
        }

        async fn generate_code(
            &self,
            _prompt: &str,
            _language: Language,
            _framework: &str,
            _model: &str,
        ) -> Result<String, AssistantError> {
            self.record()?;
            Ok("```html\n<p>stub</p>\n```".to_string())
        }

        async fn analyze_code(
            &self,
            _code: &str,
            _language: Language,
            _model: &str,
        ) -> Result<Analysis, AssistantError> {
            self.record()?;
            Ok(Analysis {
                suggestions: vec!["stub suggestion".to_string()],
                improvements: Vec::new(),
                bugs: Vec::new(),
                explanation: "stub".to_string(),
                detail: AnalysisDetail::Base,
            })
        }

        async fn bulk_edit(
            &self,
            files: &[BulkFile],
            _instructions: &str,
            _model: &str,
        ) -> Result<Vec<EditedFile>, AssistantError> {
            self.record()?;
            Ok(files
                .iter()
                .map(|file| EditedFile {
                    path: file.path.clone(),
                    content: format!("edited {}", file.content),
                    changes: vec!["stubbed".to_string()],
                })
                .collect())
        }
    }

    struct Harness {
        app: WizardApp,
        backend: Arc<StubBackend>,
        _runtime: tokio::runtime::Runtime,
    }

    fn harness(backend: StubBackend) -> Harness {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("test runtime should build");
        let backend = Arc::new(backend);
        let (tx, rx) = mpsc::channel();

        let client = {
            let _guard = runtime.enter();
            AssistantClient::new(backend.clone(), tx).expect("client should build inside runtime")
        };

        Harness {
            app: WizardApp::new(rx, client, Settings::default(), Vec::new()),
            backend,
            _runtime: runtime,
        }
    }

    fn settle(harness: &mut Harness) {
        let event = harness
            .app
            .rx
            .recv_timeout(Duration::from_secs(2))
            .expect("a completion event should arrive");
        harness.app.apply_event(event, None);
    }

    #[test]
    fn chat_round_trip_appends_both_turns_and_clears_the_flag() {
        let mut harness = harness(StubBackend::default());
        harness.app.chat_input = "hello".to_string();
        harness.app.submit_chat(None);

        assert!(harness.app.is_processing);
        assert_eq!(harness.app.conversation.messages().len(), 2);

        settle(&mut harness);
        assert!(!harness.app.is_processing);
        let messages = harness.app.conversation.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].content, "stub reply");
    }

    #[test]
    fn second_request_while_processing_is_rejected() {
        let mut harness = harness(StubBackend::default());
        harness.app.request_analysis(Language::Html, None);
        assert!(harness.app.is_processing);

        // Gated at the call site: no second backend call, no state change.
        harness.app.request_analysis(Language::Css, None);
        harness.app.request_bulk_edit(None);

        settle(&mut harness);
        assert_eq!(harness.backend.calls.load(Ordering::SeqCst), 1);
        assert!(harness.app.rx.try_recv().is_err());
        assert!(!harness.app.is_processing);
    }

    #[test]
    fn validation_rejections_are_silent_noops() {
        let mut harness = harness(StubBackend::default());

        harness.app.chat_input = "   ".to_string();
        harness.app.submit_chat(None);

        harness.app.editor.set_buffer(Language::Html, "  \n ".to_string());
        harness.app.request_analysis(Language::Html, None);

        harness.app.bulk_instructions = "  ".to_string();
        harness.app.request_bulk_edit(None);

        harness.app.bulk_instructions = "do something".to_string();
        harness.app.editor.bulk_files.clear();
        harness.app.request_bulk_edit(None);

        // No prior user turn, so generation has no prompt to work from.
        harness.app.request_generation(Language::Css, None);

        assert!(!harness.app.is_processing);
        assert_eq!(harness.backend.calls.load(Ordering::SeqCst), 0);
        assert_eq!(harness.app.conversation.messages().len(), 1);
    }

    #[test]
    fn generated_code_is_unwrapped_into_the_buffer_with_a_confirmation_turn() {
        let mut harness = harness(StubBackend::default());
        harness.app.conversation.append_user("make me a page".to_string());
        harness.app.request_generation(Language::Html, None);

        settle(&mut harness);
        assert_eq!(harness.app.editor.buffer(Language::Html), "<p>stub</p>\n");
        let last = harness.app.conversation.messages().last().expect("turn");
        assert!(last.content.contains("generated HTML code"));
    }

    #[test]
    fn bulk_edit_result_is_projected_into_files_and_a_report_turn() {
        let mut harness = harness(StubBackend::default());
        harness.app.bulk_instructions = "add headers".to_string();
        harness.app.request_bulk_edit(None);

        settle(&mut harness);
        let files = &harness.app.editor.bulk_files;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].path, "index.php");
        assert!(files[0].content.starts_with("edited "));

        let last = harness.app.conversation.messages().last().expect("turn");
        assert!(last.content.contains("Bulk Edit Results"));
        assert!(last.content.contains("index.php"));
    }

    #[test]
    fn backend_failure_becomes_one_apologetic_assistant_turn() {
        let mut harness = harness(StubBackend::failing());
        harness.app.request_analysis(Language::Php, None);

        settle(&mut harness);
        assert!(!harness.app.is_processing);
        let last = harness.app.conversation.messages().last().expect("turn");
        assert!(last.content.contains("error analyzing your php code"));
    }

    #[test]
    fn saving_an_api_key_sets_it_and_appends_a_confirmation() {
        // Keep the persisted settings file inside the test sandbox.
        let home = tempfile::tempdir().expect("temp home should be created");
        std::env::set_var("HOME", home.path());

        let mut harness = harness(StubBackend::default());
        assert!(!harness.app.settings.has_api_key());

        harness.app.api_key_input = "  sk-anything  ".to_string();
        harness.app.save_api_key();

        assert!(harness.app.settings.has_api_key());
        assert_eq!(harness.app.settings.api_key.as_deref(), Some("sk-anything"));
        let last = harness.app.conversation.messages().last().expect("turn");
        assert!(last.content.contains("API key saved"));
    }
}
