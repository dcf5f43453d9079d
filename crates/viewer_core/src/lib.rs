//! Viewer core: pure state machine and view-model helpers.
mod confirmation;
mod editor;
mod effect;
mod history;
mod msg;
mod preview;
mod state;
mod update;
mod view_model;

pub use confirmation::ConfirmationState;
pub use editor::{EditorState, SaveStatus};
pub use effect::{Effect, FetchRequest};
pub use history::History;
pub use msg::Msg;
pub use preview::{format_ast, MAX_AST_PREVIEW};
pub use state::{AppState, Entities, FetchTarget, Generation, SaveSeq, TreeImage};
pub use update::update;
pub use view_model::AppViewModel;
