use std::fmt;
use std::sync::Arc;

use crate::view_model::AppViewModel;
use crate::{ConfirmationState, EditorState};

pub type Generation = u64;

/// Sequence number of a scheduled save; the latest one is the only one
/// whose outcome is shown.
pub type SaveSeq = u64;

/// Decoded tree visualization, tagged with the fetch batch it answers.
#[derive(Clone, PartialEq, Eq)]
pub struct TreeImage {
    pub generation: Generation,
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA8, row-major.
    pub rgba: Arc<[u8]>,
}

impl fmt::Debug for TreeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeImage")
            .field("generation", &self.generation)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rgba_len", &self.rgba.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entities {
    pub operators: Vec<String>,
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Ast,
    Tree,
    Entities,
}

impl FetchTarget {
    pub const ALL: [FetchTarget; 3] = [FetchTarget::Ast, FetchTarget::Tree, FetchTarget::Entities];

    pub fn label(self) -> &'static str {
        match self {
            FetchTarget::Ast => "AST",
            FetchTarget::Tree => "tree image",
            FetchTarget::Entities => "entities",
        }
    }
}

/// Root state. Owns both panels; text flows from the editor to the
/// confirmation panel only through [`crate::update`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    pub(crate) editor: EditorState,
    pub(crate) confirmation: ConfirmationState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn confirmation(&self) -> &ConfirmationState {
        &self.confirmation
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::build(&self.editor, &self.confirmation)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
