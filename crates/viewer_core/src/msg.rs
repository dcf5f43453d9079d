use crate::{Entities, FetchTarget, Generation, SaveSeq, TreeImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The window opened; the initial text becomes the first snapshot.
    Started,
    /// User edited the source text.
    EditorChanged(String),
    /// User clicked Clear.
    ClearClicked,
    /// User moved the timeline slider.
    StepSelected(usize),
    /// User asked the backend to rerun its pipeline.
    RegenerateClicked,
    /// The window is closing.
    CloseRequested,
    /// Debounced save reached the backend.
    SaveSucceeded { seq: SaveSeq, at: String },
    SaveFailed { seq: SaveSeq, message: String },
    DeleteSucceeded,
    DeleteFailed { message: String },
    PipelineSucceeded,
    PipelineFailed { message: String },
    /// AST response for a fetch batch.
    AstLoaded {
        generation: Generation,
        ast: serde_json::Value,
    },
    /// Decoded tree image for a fetch batch.
    TreeLoaded(TreeImage),
    EntitiesLoaded {
        generation: Generation,
        entities: Entities,
    },
    FetchFailed {
        generation: Generation,
        target: FetchTarget,
        message: String,
    },
}
