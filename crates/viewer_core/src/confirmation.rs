use serde_json::Value;
use viewer_logging::{viewer_debug, viewer_warn};

use crate::{format_ast, Effect, Entities, FetchRequest, FetchTarget, Generation, History, TreeImage};

/// History of submitted versions and the backend artifacts for the selected one.
///
/// Every fetch batch is tagged with a fresh generation. Responses carrying an
/// older generation answer a selection the user has already left and are
/// dropped, so the panel never shows data for a step other than the selected
/// one because a slow response arrived late.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmationState {
    history: History,
    selected: usize,
    generation: Generation,
    ast: Option<Value>,
    ast_text: Option<String>,
    tree: Option<TreeImage>,
    entities: Option<Entities>,
    notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Notice {
    /// `None` for failures not tied to a fetch target.
    target: Option<FetchTarget>,
    text: String,
}

impl ConfirmationState {
    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn selected_code(&self) -> Option<&str> {
        self.history.get(self.selected)
    }

    pub fn ast(&self) -> Option<&Value> {
        self.ast.as_ref()
    }

    /// Pretty-printed AST, `{}` until the first one arrives.
    pub fn ast_text(&self) -> &str {
        self.ast_text.as_deref().unwrap_or("{}")
    }

    pub fn tree(&self) -> Option<&TreeImage> {
        self.tree.as_ref()
    }

    pub fn entities(&self) -> Option<&Entities> {
        self.entities.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|notice| notice.text.as_str())
    }

    /// Records `text` if it differs from the latest snapshot. The selection
    /// stays where the user left it.
    pub(crate) fn observe(&mut self, text: &str) -> Vec<Effect> {
        if !self.history.push_if_changed(text) {
            return Vec::new();
        }
        viewer_debug!("History grew to {} entries", self.history.len());
        self.refetch()
    }

    pub(crate) fn select(&mut self, index: usize) -> Vec<Effect> {
        let Some(index) = self.history.clamp_index(index) else {
            return Vec::new();
        };
        if index == self.selected {
            return Vec::new();
        }
        self.selected = index;
        self.refetch()
    }

    /// Starts a new fetch batch for the current selection.
    pub(crate) fn refetch(&mut self) -> Vec<Effect> {
        if self.history.is_empty() {
            return Vec::new();
        }
        self.generation += 1;
        let request = FetchRequest {
            generation: self.generation,
            step: self.selected,
        };
        FetchTarget::ALL
            .into_iter()
            .map(|target| Effect::Fetch { target, request })
            .collect()
    }

    fn is_current(&self, generation: Generation, target: FetchTarget) -> bool {
        if generation == self.generation {
            return true;
        }
        viewer_debug!(
            "Discarding {} for generation {} (current {})",
            target.label(),
            generation,
            self.generation
        );
        false
    }

    pub(crate) fn apply_ast(&mut self, generation: Generation, ast: Value) -> bool {
        if !self.is_current(generation, FetchTarget::Ast) {
            return false;
        }
        self.ast_text = Some(format_ast(&ast));
        self.ast = Some(ast);
        self.clear_notice_for(FetchTarget::Ast);
        true
    }

    /// Installs `image`, dropping the previous one first.
    pub(crate) fn apply_tree(&mut self, image: TreeImage) -> bool {
        if !self.is_current(image.generation, FetchTarget::Tree) {
            return false;
        }
        self.tree.take();
        self.tree = Some(image);
        self.clear_notice_for(FetchTarget::Tree);
        true
    }

    pub(crate) fn apply_entities(&mut self, generation: Generation, entities: Entities) -> bool {
        if !self.is_current(generation, FetchTarget::Entities) {
            return false;
        }
        self.entities = Some(entities);
        self.clear_notice_for(FetchTarget::Entities);
        true
    }

    /// Keeps whatever is displayed and flags it as stale.
    pub(crate) fn apply_failure(
        &mut self,
        generation: Generation,
        target: FetchTarget,
        message: &str,
    ) -> bool {
        if !self.is_current(generation, target) {
            return false;
        }
        viewer_warn!("Fetching {} failed: {}", target.label(), message);
        self.notice = Some(Notice {
            target: Some(target),
            text: format!(
                "Fetching {} failed, showing stale data: {}",
                target.label(),
                message
            ),
        });
        true
    }

    pub(crate) fn set_notice(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            target: None,
            text: text.into(),
        });
    }

    fn clear_notice_for(&mut self, target: FetchTarget) {
        if self
            .notice
            .as_ref()
            .is_some_and(|notice| notice.target.is_none_or(|failed| failed == target))
        {
            self.notice = None;
        }
    }
}
