use crate::theme::Theme;
use eframe::egui::{self, RichText, ScrollArea};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Builds the self-contained preview document: one inline style block in the
/// head, the markup verbatim in the body, one inline script block after it.
/// No sanitization and no escaping; the document is rebuilt from scratch on
/// every call.
pub fn compose_document(html: &str, css: &str, js: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"UTF-8\">\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    <style>{css}</style>\n  </head>\n  <body>\n    {html}\n    <script>{js}</script>\n  </body>\n</html>\n"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportSize {
    Mobile,
    Tablet,
    Desktop,
}

impl ViewportSize {
    pub const ALL: [ViewportSize; 3] = [
        ViewportSize::Mobile,
        ViewportSize::Tablet,
        ViewportSize::Desktop,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ViewportSize::Mobile => "Mobile",
            ViewportSize::Tablet => "Tablet",
            ViewportSize::Desktop => "Desktop",
        }
    }

    /// Fixed container dimensions; Desktop fills the available space.
    fn dimensions(self) -> Option<egui::Vec2> {
        match self {
            ViewportSize::Mobile => Some(egui::vec2(375.0, 667.0)),
            ViewportSize::Tablet => Some(egui::vec2(768.0, 1024.0)),
            ViewportSize::Desktop => None,
        }
    }
}

/// Live preview tab. Keeps the composed document and recomposes whenever any
/// of the three inputs changes value. Nothing flows back from the rendered
/// document into application state.
pub struct PreviewPane {
    viewport: ViewportSize,
    document: String,
    inputs_fingerprint: Option<u64>,
    status: Option<String>,
}

impl PreviewPane {
    pub fn new() -> Self {
        Self {
            viewport: ViewportSize::Desktop,
            document: String::new(),
            inputs_fingerprint: None,
            status: None,
        }
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// Recomposes the document if any input changed. Returns whether a
    /// recompose happened.
    pub fn sync(&mut self, html: &str, css: &str, js: &str) -> bool {
        let fingerprint = fingerprint(html, css, js);
        if self.inputs_fingerprint == Some(fingerprint) {
            return false;
        }

        self.document = compose_document(html, css, js);
        self.inputs_fingerprint = Some(fingerprint);
        true
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, theme: &Theme, html: &str, css: &str, js: &str) {
        self.sync(html, css, js);

        ui.horizontal(|ui| {
            ui.label(RichText::new("Preview").strong());
            ui.separator();
            for size in ViewportSize::ALL {
                if ui
                    .selectable_label(self.viewport == size, size.label())
                    .clicked()
                {
                    self.viewport = size;
                }
            }
            ui.separator();
            if ui.button("Refresh").clicked() {
                self.inputs_fingerprint = None;
                self.sync(html, css, js);
            }
            if ui.button("Open in Browser").clicked() {
                self.open_in_browser();
            }
            if ui.button("Fullscreen").clicked() {
                let fullscreen = ui.input(|input| input.viewport().fullscreen.unwrap_or(false));
                ui.ctx()
                    .send_viewport_cmd(egui::ViewportCommand::Fullscreen(!fullscreen));
            }
        });

        if let Some(status) = &self.status {
            ui.label(RichText::new(status).color(theme.warning).size(12.0));
        }

        ui.add_space(theme.spacing_8);

        let frame = theme.card_frame();
        frame.show(ui, |ui| {
            if let Some(size) = self.viewport.dimensions() {
                ui.set_max_width(size.x);
                ui.set_max_height(size.y);
            }
            ScrollArea::both()
                .id_salt("preview_document")
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.label(RichText::new(self.document.as_str()).monospace());
                });
        });
    }

    fn open_in_browser(&mut self) {
        let path = std::env::temp_dir().join(format!(
            "webwizard_preview_{}.html",
            std::process::id()
        ));

        if let Err(err) = std::fs::write(&path, &self.document) {
            tracing::warn!(error = %err, "failed to write preview file");
            self.status = Some(format!("failed to write preview file: {err}"));
            return;
        }

        match open::that(&path) {
            Ok(()) => self.status = None,
            Err(err) => {
                tracing::warn!(error = %err, "failed to open preview in browser");
                self.status = Some(format!("failed to open browser: {err}"));
            }
        }
    }
}

fn fingerprint(html: &str, css: &str, js: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    html.hash(&mut hasher);
    css.hash(&mut hasher);
    js.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::{compose_document, PreviewPane};

    #[test]
    fn document_contains_exactly_one_style_and_one_script_block() {
        let document = compose_document("<h1>x</h1>", "h1{color:red}", "console.log(1)");

        assert_eq!(document.matches("<style>").count(), 1);
        assert_eq!(document.matches("<script>").count(), 1);
        assert!(document.contains("<style>h1{color:red}</style>"));
        assert!(document.contains("<script>console.log(1)</script>"));
        assert!(document.contains("<h1>x</h1>"));
    }

    #[test]
    fn document_composition_is_deterministic() {
        let first = compose_document("<h1>x</h1>", "h1{color:red}", "console.log(1)");
        let second = compose_document("<h1>x</h1>", "h1{color:red}", "console.log(1)");
        assert_eq!(first, second);
    }

    #[test]
    fn inputs_are_embedded_verbatim_without_escaping() {
        let document = compose_document("<p a=\"b\">&amp;</p>", "p::before{content:'<'}", "if (1 < 2) {}");
        assert!(document.contains("<p a=\"b\">&amp;</p>"));
        assert!(document.contains("p::before{content:'<'}"));
        assert!(document.contains("if (1 < 2) {}"));
    }

    #[test]
    fn sync_recomposes_only_on_a_genuine_content_change() {
        let mut pane = PreviewPane::new();

        assert!(pane.sync("<h1>a</h1>", "", ""));
        assert!(!pane.sync("<h1>a</h1>", "", ""));
        assert!(pane.sync("<h1>b</h1>", "", ""));
        assert!(pane.document().contains("<h1>b</h1>"));

        // A change in any single input triggers a recompose.
        assert!(pane.sync("<h1>b</h1>", "h1{}", ""));
        assert!(pane.sync("<h1>b</h1>", "h1{}", "console.log(2)"));
    }
}
