use super::{Analysis, AnalysisDetail, EditedFile};
use crate::editor::Language;

const FENCE_TAGS: [&str; 5] = ["html", "css", "js", "javascript", "php"];

/// Unwraps the first fenced code block whose language hint (optional,
/// case-insensitive) is one of the known web tags. Text with no such
/// fence passes through unchanged.
pub fn extract_fenced_code(text: &str) -> String {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("```") {
        let after_marker = search_from + offset + 3;
        let Some(newline) = text[after_marker..].find('\n') else {
            break;
        };

        let tag = text[after_marker..after_marker + newline].trim();
        let body_start = after_marker + newline + 1;
        let tag_accepted =
            tag.is_empty() || FENCE_TAGS.iter().any(|known| known.eq_ignore_ascii_case(tag));

        if tag_accepted {
            if let Some(close) = text[body_start..].find("```") {
                return text[body_start..body_start + close].to_string();
            }
        }

        search_from = after_marker;
    }

    text.to_string()
}

/// Deterministic Markdown rendering of an analysis result. Fixed section
/// order; sections with empty lists are omitted entirely.
pub fn format_analysis(language: Language, analysis: &Analysis) -> String {
    let mut out = format!("## Code Analysis for {}\n\n", language.upper_tag());

    if !analysis.explanation.is_empty() {
        out.push_str("### Overview\n");
        out.push_str(&analysis.explanation);
        out.push_str("\n\n");
    }

    push_section(&mut out, "Suggestions", &analysis.suggestions);
    push_section(&mut out, "Improvements", &analysis.improvements);
    push_section(&mut out, "Potential Issues", &analysis.bugs);

    if let AnalysisDetail::PhpExtended {
        security_issues,
        performance_issues,
        best_practices,
    } = &analysis.detail
    {
        push_section(&mut out, "Security Issues", security_issues);
        push_section(&mut out, "Performance Considerations", performance_issues);
        push_section(&mut out, "Best Practices", best_practices);
    }

    out
}

pub fn format_bulk_report(files: &[EditedFile]) -> String {
    let mut out = String::from("## Bulk Edit Results\n\n");
    out.push_str(&format!(
        "I've applied your instructions to {} file(s):\n\n",
        files.len()
    ));

    for file in files {
        out.push_str(&format!("### {}\n", file.path));
        out.push_str("Changes made:\n");
        for change in &file.changes {
            out.push_str(&format!("- {change}\n"));
        }
        out.push('\n');
    }

    out
}

fn push_section(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    out.push_str(&format!("### {title}\n"));
    for item in items {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');
}
