use viewer_logging::viewer_debug;

use crate::{Effect, SaveSeq};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    /// A debounced save is scheduled or in flight.
    Pending,
    Saved {
        at: String,
    },
    Deleted,
    Failed(String),
}

/// Source text being edited, plus the state of its persistence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditorState {
    text: String,
    save_status: SaveStatus,
    latest_save: SaveSeq,
}

impl EditorState {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn save_status(&self) -> &SaveStatus {
        &self.save_status
    }

    pub(crate) fn apply_edit(&mut self, text: String) -> Effect {
        self.save_status = SaveStatus::Pending;
        self.text = text;
        self.latest_save += 1;
        Effect::ScheduleSave {
            seq: self.latest_save,
            code: self.text.clone(),
        }
    }

    /// Whether the outcome of save `seq` should replace the status: it must be
    /// the most recent save and nothing (such as Clear) may have settled the
    /// status since.
    pub(crate) fn awaits_save(&self, seq: SaveSeq) -> bool {
        if seq == self.latest_save && self.save_status == SaveStatus::Pending {
            return true;
        }
        viewer_debug!(
            "Ignoring outcome of save {} (latest {}, status {:?})",
            seq,
            self.latest_save,
            self.save_status
        );
        false
    }

    /// Empties the text and deletes the persisted source right away. A save
    /// still waiting out its quiet interval would resurrect the old source,
    /// so it is cancelled first.
    pub(crate) fn clear(&mut self) -> Vec<Effect> {
        viewer_debug!("Clearing editor ({} chars)", self.text.len());
        self.text.clear();
        vec![Effect::CancelPendingSave, Effect::DeleteSource]
    }

    pub(crate) fn set_status(&mut self, status: SaveStatus) {
        self.save_status = status;
    }
}
