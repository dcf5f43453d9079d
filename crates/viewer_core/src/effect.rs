use crate::{FetchTarget, Generation, SaveSeq};

/// Identifies which selection a fetch was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: Generation,
    pub step: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the source once the quiet interval elapses; replaces any pending save.
    ScheduleSave { seq: SaveSeq, code: String },
    CancelPendingSave,
    DeleteSource,
    Fetch {
        target: FetchTarget,
        request: FetchRequest,
    },
    RunPipeline,
    EndSession,
}
