use crate::{ConfirmationState, EditorState, Entities, SaveStatus, TreeImage};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub editor_text: String,
    pub save_status: SaveStatus,
    pub history_len: usize,
    pub selected: usize,
    pub step_label: String,
    pub selected_code: Option<String>,
    pub ast_text: String,
    pub tree: Option<TreeImage>,
    pub entities: Option<Entities>,
    pub notice: Option<String>,
}

impl AppViewModel {
    pub(crate) fn build(editor: &EditorState, confirmation: &ConfirmationState) -> Self {
        let history_len = confirmation.history().len();
        let step_label = if history_len == 0 {
            "Step 0 / 0".to_string()
        } else {
            format!("Step {} / {}", confirmation.selected() + 1, history_len)
        };

        Self {
            editor_text: editor.text().to_string(),
            save_status: editor.save_status().clone(),
            history_len,
            selected: confirmation.selected(),
            step_label,
            selected_code: confirmation.selected_code().map(ToOwned::to_owned),
            ast_text: confirmation.ast_text().to_string(),
            tree: confirmation.tree().cloned(),
            entities: confirmation.entities().cloned(),
            notice: confirmation.notice().map(ToOwned::to_owned),
        }
    }

    /// Upper bound for the timeline slider.
    pub fn max_step(&self) -> usize {
        self.history_len.saturating_sub(1)
    }
}
