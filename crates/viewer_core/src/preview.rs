use serde_json::Value;

const TRUNCATED_MARKER: &str = "\n.[truncated]";
pub const MAX_AST_PREVIEW: usize = 65_536;

/// Renders an AST as 2-space indented JSON, truncated for display.
pub fn format_ast(ast: &Value) -> String {
    let pretty = serde_json::to_string_pretty(ast).unwrap_or_else(|_| ast.to_string());
    truncate_preview(pretty)
}

fn truncate_preview(text: String) -> String {
    if text.len() <= MAX_AST_PREVIEW {
        return text;
    }
    let mut end = MAX_AST_PREVIEW;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{TRUNCATED_MARKER}", &text[..end])
}
