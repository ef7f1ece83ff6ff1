use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    Html,
    Css,
    Js,
    Php,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::Html, Language::Css, Language::Js, Language::Php];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::Html => "html",
            Language::Css => "css",
            Language::Js => "javascript",
            Language::Php => "php",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Js => "JavaScript",
            Language::Php => "PHP/Laravel",
        }
    }

    pub fn upper_tag(self) -> &'static str {
        match self {
            Language::Html => "HTML",
            Language::Css => "CSS",
            Language::Js => "JAVASCRIPT",
            Language::Php => "PHP",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFile {
    pub path: String,
    pub content: String,
}

/// One source buffer per language slot plus the ordered bulk-edit file
/// sequence. Every mutation is a whole-value replacement; there is no
/// diffing or patching anywhere.
pub struct EditorState {
    html: String,
    css: String,
    js: String,
    php: String,
    pub bulk_files: Vec<BulkFile>,
}

impl EditorState {
    pub fn with_seed_samples() -> Self {
        Self {
            html: SEED_HTML.to_string(),
            css: SEED_CSS.to_string(),
            js: SEED_JS.to_string(),
            php: SEED_PHP.to_string(),
            bulk_files: vec![
                BulkFile {
                    path: "index.php".to_string(),
                    content: "<?php echo \"Hello World!\"; ?>".to_string(),
                },
                BulkFile {
                    path: "styles.css".to_string(),
                    content: "body { font-family: Arial; }".to_string(),
                },
            ],
        }
    }

    pub fn buffer(&self, language: Language) -> &str {
        match language {
            Language::Html => &self.html,
            Language::Css => &self.css,
            Language::Js => &self.js,
            Language::Php => &self.php,
        }
    }

    pub fn buffer_mut(&mut self, language: Language) -> &mut String {
        match language {
            Language::Html => &mut self.html,
            Language::Css => &mut self.css,
            Language::Js => &mut self.js,
            Language::Php => &mut self.php,
        }
    }

    pub fn set_buffer(&mut self, language: Language, content: String) {
        *self.buffer_mut(language) = content;
    }

    pub fn add_bulk_file(&mut self) {
        let path = format!("file{}.txt", self.bulk_files.len() + 1);
        self.bulk_files.push(BulkFile {
            path,
            content: String::new(),
        });
    }

    pub fn remove_bulk_file(&mut self, index: usize) {
        if index < self.bulk_files.len() {
            self.bulk_files.remove(index);
        }
    }

    /// Replaces each file's content by position; the stored path and the
    /// sequence order are kept even if the backend echoed something else.
    pub fn apply_bulk_edit(&mut self, edited_contents: &[String]) {
        for (slot, content) in self.bulk_files.iter_mut().zip(edited_contents) {
            slot.content = content.clone();
        }
    }
}

const SEED_HTML: &str = "<div class=\"container\">\n  <h1>Hello, Web!</h1>\n  <p>This is a preview of your HTML code.</p>\n</div>";

const SEED_CSS: &str = ".container {\n  font-family: Arial, sans-serif;\n  max-width: 800px;\n  margin: 0 auto;\n  padding: 20px;\n  text-align: center;\n}\n\nh1 {\n  color: #3b82f6;\n}\n\np {\n  color: #4b5563;\n}";

const SEED_JS: &str = "// JavaScript code will run in the preview\nconsole.log('Preview loaded!');\n\n// Example: Add event listener\ndocument.addEventListener('DOMContentLoaded', () => {\n  const heading = document.querySelector('h1');\n  if (heading) {\n    heading.addEventListener('click', () => {\n      heading.style.color = '#ef4444';\n    });\n  }\n});";

const SEED_PHP: &str = "<?php\n\n// Example PHP function\nfunction greeting($name) {\n    return \"Hello, {$name}!\";\n}\n\n// Using Laravel-style controller\nclass UserController extends Controller\n{\n    public function index()\n    {\n        $users = User::all();\n        return view('users.index', compact('users'));\n    }\n\n    public function show($id)\n    {\n        $user = User::findOrFail($id);\n        return view('users.show', compact('user'));\n    }\n}\n";

#[cfg(test)]
mod tests {
    use super::{EditorState, Language};

    #[test]
    fn seed_buffers_are_non_empty_for_every_language() {
        let editor = EditorState::with_seed_samples();
        for language in Language::ALL {
            assert!(
                !editor.buffer(language).trim().is_empty(),
                "{} seed should be non-empty",
                language.as_str()
            );
        }
        assert_eq!(editor.bulk_files.len(), 2);
    }

    #[test]
    fn set_buffer_replaces_the_whole_value() {
        let mut editor = EditorState::with_seed_samples();
        editor.set_buffer(Language::Css, "h1 { color: red; }".to_string());
        assert_eq!(editor.buffer(Language::Css), "h1 { color: red; }");
        // Other slots are independent.
        assert!(editor.buffer(Language::Html).contains("Hello, Web!"));
    }

    #[test]
    fn apply_bulk_edit_preserves_paths_and_order() {
        let mut editor = EditorState::with_seed_samples();
        let before: Vec<String> = editor
            .bulk_files
            .iter()
            .map(|file| file.path.clone())
            .collect();

        editor.apply_bulk_edit(&["one".to_string(), "two".to_string()]);

        let after: Vec<String> = editor
            .bulk_files
            .iter()
            .map(|file| file.path.clone())
            .collect();
        assert_eq!(before, after);
        assert_eq!(editor.bulk_files[0].content, "one");
        assert_eq!(editor.bulk_files[1].content, "two");
    }

    #[test]
    fn bulk_files_can_be_appended_and_removed_by_position() {
        let mut editor = EditorState::with_seed_samples();
        editor.add_bulk_file();
        assert_eq!(editor.bulk_files.len(), 3);
        assert_eq!(editor.bulk_files[2].path, "file3.txt");

        editor.remove_bulk_file(0);
        assert_eq!(editor.bulk_files.len(), 2);
        assert_eq!(editor.bulk_files[0].path, "styles.css");
    }
}
