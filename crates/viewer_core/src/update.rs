use viewer_logging::viewer_warn;

use crate::{AppState, Effect, Msg, SaveStatus};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Started => {
            let effects = state.confirmation.observe(state.editor.text());
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::EditorChanged(text) => {
            if text == state.editor.text() {
                return (state, Vec::new());
            }
            let save = state.editor.apply_edit(text);
            let mut effects = vec![save];
            effects.extend(state.confirmation.observe(state.editor.text()));
            state.mark_dirty();
            effects
        }
        Msg::ClearClicked => {
            // History keeps its entries; clearing only affects the editor
            // and the persisted source.
            let effects = state.editor.clear();
            state.editor.set_status(SaveStatus::Idle);
            state.mark_dirty();
            effects
        }
        Msg::StepSelected(index) => {
            let effects = state.confirmation.select(index);
            if !effects.is_empty() {
                state.mark_dirty();
            }
            effects
        }
        Msg::RegenerateClicked => vec![Effect::RunPipeline],
        Msg::CloseRequested => vec![Effect::EndSession],
        Msg::SaveSucceeded { seq, at } => {
            if state.editor.awaits_save(seq) {
                state.editor.set_status(SaveStatus::Saved { at });
            }
            state.mark_dirty();
            // The backend reruns its pipeline on submit.
            state.confirmation.refetch()
        }
        Msg::SaveFailed { seq, message } => {
            viewer_warn!("Saving source failed: {}", message);
            if state.editor.awaits_save(seq) {
                state.editor.set_status(SaveStatus::Failed(message));
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::DeleteSucceeded => {
            state.editor.set_status(SaveStatus::Deleted);
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeleteFailed { message } => {
            viewer_warn!("Deleting source failed: {}", message);
            state.editor.set_status(SaveStatus::Failed(message));
            state.mark_dirty();
            Vec::new()
        }
        Msg::PipelineSucceeded => {
            state.mark_dirty();
            state.confirmation.refetch()
        }
        Msg::PipelineFailed { message } => {
            viewer_warn!("Backend pipeline failed: {}", message);
            state
                .confirmation
                .set_notice(format!("Regenerating failed: {message}"));
            state.mark_dirty();
            Vec::new()
        }
        Msg::AstLoaded { generation, ast } => {
            if state.confirmation.apply_ast(generation, ast) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TreeLoaded(image) => {
            if state.confirmation.apply_tree(image) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::EntitiesLoaded {
            generation,
            entities,
        } => {
            if state.confirmation.apply_entities(generation, entities) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::FetchFailed {
            generation,
            target,
            message,
        } => {
            if state
                .confirmation
                .apply_failure(generation, target, &message)
            {
                state.mark_dirty();
            }
            Vec::new()
        }
    };

    (state, effects)
}
