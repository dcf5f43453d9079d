use std::sync::{Arc, Once};

use serde_json::json;
use viewer_core::{
    update, AppState, Effect, Entities, FetchRequest, FetchTarget, Msg, TreeImage,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(viewer_logging::initialize_for_tests);
}

fn type_texts(texts: &[&str]) -> AppState {
    texts.iter().fold(AppState::new(), |state, text| {
        update(state, Msg::EditorChanged(text.to_string())).0
    })
}

fn tree(generation: u64, shade: u8) -> TreeImage {
    TreeImage {
        generation,
        width: 1,
        height: 1,
        rgba: Arc::from(vec![shade, shade, shade, 255]),
    }
}

fn requests(effects: &[Effect]) -> Vec<(FetchTarget, FetchRequest)> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Fetch { target, request } => Some((*target, *request)),
            _ => None,
        })
        .collect()
}

#[test]
fn growing_history_keeps_selection() {
    init_logging();
    let state = type_texts(&["a", "ab", "abc"]);
    let view = state.view();
    assert_eq!(view.history_len, 3);
    assert_eq!(view.selected, 0);
    assert_eq!(view.selected_code.as_deref(), Some("a"));
    assert_eq!(view.max_step(), 2);
}

#[test]
fn selecting_step_displays_its_code_and_fetches() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let (state, effects) = update(state, Msg::StepSelected(1));

    let issued = requests(&effects);
    assert_eq!(issued.len(), 3);
    assert!(issued
        .iter()
        .all(|(_, request)| *request == FetchRequest { generation: 3, step: 1 }));
    let targets: Vec<_> = issued.iter().map(|(target, _)| *target).collect();
    assert_eq!(targets, FetchTarget::ALL.to_vec());
    assert_eq!(state.view().selected_code.as_deref(), Some("ab"));
    assert_eq!(state.view().step_label, "Step 2 / 2");
}

#[test]
fn reselecting_same_step_is_a_noop() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let (mut state, effects) = update(state, Msg::StepSelected(0));
    assert!(effects.is_empty());
    state.consume_dirty();
    let (mut state, _) = update(state, Msg::StepSelected(0));
    assert!(!state.consume_dirty());
}

#[test]
fn out_of_range_selection_is_clamped() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let (state, _) = update(state, Msg::StepSelected(42));
    assert_eq!(state.view().selected, 1);
    assert!(state.view().selected < state.view().history_len);
}

#[test]
fn selection_ignored_while_history_empty() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StepSelected(3));
    assert!(effects.is_empty());
    assert_eq!(state.view().selected, 0);
    assert_eq!(state.view().step_label, "Step 0 / 0");
}

#[test]
fn late_response_for_previous_selection_is_discarded() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let (state, effects) = update(state, Msg::StepSelected(1));
    let stale = requests(&effects)[0].1.generation;
    let (state, effects) = update(state, Msg::StepSelected(0));
    let current = requests(&effects)[0].1.generation;
    assert!(current > stale);

    let (state, _) = update(
        state,
        Msg::AstLoaded {
            generation: current,
            ast: json!({ "type": "Program", "step": 0 }),
        },
    );
    let (mut state, _) = update(
        state,
        Msg::AstLoaded {
            generation: stale,
            ast: json!({ "type": "Program", "step": 1 }),
        },
    );

    assert_eq!(
        state.confirmation().ast(),
        Some(&json!({ "type": "Program", "step": 0 }))
    );
    assert_eq!(state.view().selected_code.as_deref(), Some("a"));
    assert!(state.consume_dirty());
}

#[test]
fn ast_is_rendered_as_indented_json() {
    init_logging();
    let state = type_texts(&["x = 1"]);
    let generation = state.confirmation().generation();
    let (state, _) = update(
        state,
        Msg::AstLoaded {
            generation,
            ast: json!({ "body": [{ "type": "Assignment" }] }),
        },
    );
    assert_eq!(
        state.view().ast_text,
        "{\n  \"body\": [\n    {\n      \"type\": \"Assignment\"\n    }\n  ]\n}"
    );
}

#[test]
fn new_tree_image_replaces_previous() {
    init_logging();
    let state = type_texts(&["a"]);
    let first = tree(state.confirmation().generation(), 10);
    let (state, _) = update(state, Msg::TreeLoaded(first.clone()));
    assert_eq!(state.view().tree, Some(first.clone()));

    let (state, _) = update(state, Msg::EditorChanged("ab".to_string()));
    let second = tree(state.confirmation().generation(), 20);
    let probe = Arc::clone(&first.rgba);
    drop(first);
    let (state, _) = update(state, Msg::TreeLoaded(second.clone()));

    assert_eq!(state.confirmation().tree(), Some(&second));
    // Only the probe still references the first image's pixels.
    assert_eq!(Arc::strong_count(&probe), 1);
}

#[test]
fn stale_tree_image_is_not_installed() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let old_generation = state.confirmation().generation() - 1;
    let (state, _) = update(state, Msg::TreeLoaded(tree(old_generation, 1)));
    assert!(state.view().tree.is_none());
}

#[test]
fn failed_fetch_keeps_data_and_flags_it_stale() {
    init_logging();
    let state = type_texts(&["a"]);
    let generation = state.confirmation().generation();
    let (state, _) = update(
        state,
        Msg::AstLoaded {
            generation,
            ast: json!({ "type": "Program" }),
        },
    );
    let (state, _) = update(state, Msg::EditorChanged("ab".to_string()));
    let generation = state.confirmation().generation();
    let (state, _) = update(
        state,
        Msg::FetchFailed {
            generation,
            target: FetchTarget::Ast,
            message: "http status 404".to_string(),
        },
    );

    let view = state.view();
    assert_eq!(view.ast_text, "{\n  \"type\": \"Program\"\n}");
    let notice = view.notice.expect("stale notice");
    assert!(notice.contains("showing stale data"));
    assert!(notice.contains("http status 404"));

    let (state, _) = update(
        state,
        Msg::AstLoaded {
            generation,
            ast: json!({ "type": "Program", "body": [] }),
        },
    );
    assert!(state.view().notice.is_none());
}

#[test]
fn success_for_other_target_keeps_failure_notice() {
    init_logging();
    let state = type_texts(&["a"]);
    let generation = state.confirmation().generation();
    let (state, _) = update(
        state,
        Msg::FetchFailed {
            generation,
            target: FetchTarget::Tree,
            message: "timeout".to_string(),
        },
    );
    let (state, _) = update(
        state,
        Msg::AstLoaded {
            generation,
            ast: json!({}),
        },
    );
    assert!(state.view().notice.is_some());
}

#[test]
fn failure_for_superseded_request_is_ignored() {
    init_logging();
    let state = type_texts(&["a", "ab"]);
    let old_generation = state.confirmation().generation() - 1;
    let (mut state, _) = update(
        state,
        Msg::FetchFailed {
            generation: old_generation,
            target: FetchTarget::Entities,
            message: "network error".to_string(),
        },
    );
    state.consume_dirty();
    assert!(state.view().notice.is_none());
}

#[test]
fn entities_are_shown_for_current_generation() {
    init_logging();
    let state = type_texts(&["print(1 + 2)"]);
    let generation = state.confirmation().generation();
    let entities = Entities {
        operators: vec!["+".to_string()],
        functions: vec!["print".to_string()],
    };
    let (state, _) = update(
        state,
        Msg::EntitiesLoaded {
            generation,
            entities: entities.clone(),
        },
    );
    assert_eq!(state.view().entities, Some(entities));
}

#[test]
fn regenerate_runs_pipeline_then_refetches() {
    init_logging();
    let state = type_texts(&["a"]);
    let before = state.confirmation().generation();
    let (state, effects) = update(state, Msg::RegenerateClicked);
    assert_eq!(effects, vec![Effect::RunPipeline]);

    let (state, effects) = update(state, Msg::PipelineSucceeded);
    let issued = requests(&effects);
    assert_eq!(issued.len(), 3);
    assert_eq!(state.confirmation().generation(), before + 1);
}

#[test]
fn pipeline_failure_sets_notice() {
    init_logging();
    let state = type_texts(&["a"]);
    let (state, effects) = update(
        state,
        Msg::PipelineFailed {
            message: "http status 500".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert_eq!(
        state.view().notice.as_deref(),
        Some("Regenerating failed: http status 500")
    );
}

#[test]
fn pipeline_success_without_history_fetches_nothing() {
    init_logging();
    let (_, effects) = update(AppState::new(), Msg::PipelineSucceeded);
    assert!(effects.is_empty());
}
