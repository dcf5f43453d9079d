use eframe::egui::Color32;

pub const WINDOW_TITLE: &str = "AST Viewer";
pub const EDITOR_PANEL_ID: &str = "editor_panel";
pub const EDITOR_TEXT_ID: &str = "editor_text";
pub const EDITOR_DEFAULT_WIDTH: f32 = 420.0;
pub const EDITOR_ROWS: usize = 24;
pub const TIMELINE_WIDTH: f32 = 300.0;
pub const TREE_MAX_WIDTH: f32 = 300.0;
pub const TREE_TEXTURE_NAME: &str = "ast_tree";
pub const WARNING_COLOR: Color32 = Color32::from_rgb(220, 100, 100);
pub const SAVED_COLOR: Color32 = Color32::from_rgb(120, 200, 140);
