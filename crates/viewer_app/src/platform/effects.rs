use std::sync::{mpsc, Arc, OnceLock};

use chrono::Local;
use eframe::egui;
use viewer_core::{Effect, Entities, FetchTarget, Generation, Msg, TreeImage};
use viewer_engine::{EngineConfig, EngineError, EngineEvent, EngineHandle, EventSink};
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

/// Produces the "saved at" label for completed saves.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

/// Executes core effects on the engine and feeds engine results back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        msg_tx: mpsc::Sender<Msg>,
        repaint: Arc<OnceLock<egui::Context>>,
    ) -> Result<Self, EngineError> {
        let clock: Clock = Arc::new(|| Local::now().format("%H:%M:%S").to_string());
        let sink = Arc::new(MsgSink {
            msg_tx,
            repaint,
            clock,
        });
        let engine = EngineHandle::new(config, sink)?;
        Ok(Self { engine })
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ScheduleSave { seq, code } => self.engine.schedule_save(seq, code),
                Effect::CancelPendingSave => self.engine.cancel_save(),
                Effect::DeleteSource => {
                    viewer_info!("Deleting persisted source");
                    self.engine.delete_source();
                }
                Effect::Fetch { target, request } => {
                    viewer_debug!(
                        "Fetch {} generation={} step={}",
                        target.label(),
                        request.generation,
                        request.step
                    );
                    match target {
                        FetchTarget::Ast => self.engine.fetch_ast(request.generation),
                        FetchTarget::Tree => self.engine.fetch_tree(request.generation),
                        FetchTarget::Entities => self.engine.fetch_entities(request.generation),
                    }
                }
                Effect::RunPipeline => {
                    viewer_info!("Regenerating AST");
                    self.engine.run_pipeline();
                }
                Effect::EndSession => self.engine.end_session(),
            }
        }
    }
}

struct MsgSink {
    msg_tx: mpsc::Sender<Msg>,
    repaint: Arc<OnceLock<egui::Context>>,
    clock: Clock,
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let Some(msg) = map_event(event, &self.clock) else {
            return;
        };
        if self.msg_tx.send(msg).is_ok() {
            if let Some(ctx) = self.repaint.get() {
                ctx.request_repaint();
            }
        }
    }
}

fn map_event(event: EngineEvent, clock: &Clock) -> Option<Msg> {
    let msg = match event {
        EngineEvent::Saved { seq, result } => match result {
            Ok(()) => Msg::SaveSucceeded { seq, at: clock() },
            Err(err) => Msg::SaveFailed {
                seq,
                message: err.to_string(),
            },
        },
        EngineEvent::Deleted(Ok(())) => Msg::DeleteSucceeded,
        EngineEvent::Deleted(Err(err)) => Msg::DeleteFailed {
            message: err.to_string(),
        },
        EngineEvent::PipelineFinished(Ok(())) => Msg::PipelineSucceeded,
        EngineEvent::PipelineFinished(Err(err)) => Msg::PipelineFailed {
            message: err.to_string(),
        },
        EngineEvent::SessionEnded(result) => {
            match result {
                Ok(()) => viewer_info!("Backend session ended"),
                Err(err) => viewer_warn!("Ending backend session failed: {}", err),
            }
            return None;
        }
        EngineEvent::AstFetched { generation, result } => match result {
            Ok(ast) => Msg::AstLoaded { generation, ast },
            Err(err) => failed(generation, FetchTarget::Ast, err),
        },
        EngineEvent::TreeFetched { generation, result } => match result {
            Ok(image) => Msg::TreeLoaded(TreeImage {
                generation,
                width: image.width,
                height: image.height,
                rgba: Arc::from(image.rgba),
            }),
            Err(err) => failed(generation, FetchTarget::Tree, err),
        },
        EngineEvent::EntitiesFetched { generation, result } => match result {
            Ok(payload) => Msg::EntitiesLoaded {
                generation,
                entities: Entities {
                    operators: payload.operators,
                    functions: payload.functions,
                },
            },
            Err(err) => failed(generation, FetchTarget::Entities, err),
        },
    };
    Some(msg)
}

fn failed(generation: Generation, target: FetchTarget, err: viewer_engine::FetchError) -> Msg {
    Msg::FetchFailed {
        generation,
        target,
        message: err.to_string(),
    }
}
