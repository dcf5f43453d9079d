use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tokio::runtime::Runtime;
use viewer_logging::{viewer_debug, viewer_info, viewer_warn};

use crate::backend::{Backend, BackendSettings, ReqwestBackend};
use crate::debounce::Debouncer;
use crate::decode::decode_tree_image;
use crate::{EngineError, EngineEvent, FailureKind, FetchError, Generation, SaveSeq};

const END_SESSION_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub backend: BackendSettings,
    pub save_debounce: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendSettings::default(),
            save_debounce: Duration::from_millis(500),
        }
    }
}

/// Receives engine results. Called from runtime worker threads.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    ScheduleSave { seq: SaveSeq, code: String },
    CancelSave,
    EndSession,
    Request(Request),
}

/// Independent backend calls; each runs as its own task.
enum Request {
    DeleteSource,
    FetchAst { generation: Generation },
    FetchTree { generation: Generation },
    FetchEntities { generation: Generation },
    RunPipeline,
}

/// Owns the background runtime. Dropping the handle processes the commands
/// already sent, then stops the runtime; a save still inside its quiet
/// interval is cancelled.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let backend = ReqwestBackend::new(config.backend)?;
        viewer_info!("Backend at {}", backend.base_url());
        Self::with_backend(Arc::new(backend), config.save_debounce, sink)
    }

    pub fn with_backend(
        backend: Arc<dyn Backend>,
        save_debounce: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let runtime = Runtime::new()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("viewer-engine".to_string())
            .spawn(move || run_command_loop(runtime, cmd_rx, backend, save_debounce, sink))?;

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            worker: Some(worker),
        })
    }

    /// Persists `code` once no newer save arrives within the debounce window.
    /// The outcome is reported with `seq`.
    pub fn schedule_save(&self, seq: SaveSeq, code: impl Into<String>) {
        self.send(EngineCommand::ScheduleSave {
            seq,
            code: code.into(),
        });
    }

    pub fn cancel_save(&self) {
        self.send(EngineCommand::CancelSave);
    }

    pub fn delete_source(&self) {
        self.send(EngineCommand::Request(Request::DeleteSource));
    }

    pub fn fetch_ast(&self, generation: Generation) {
        self.send(EngineCommand::Request(Request::FetchAst { generation }));
    }

    pub fn fetch_tree(&self, generation: Generation) {
        self.send(EngineCommand::Request(Request::FetchTree { generation }));
    }

    pub fn fetch_entities(&self, generation: Generation) {
        self.send(EngineCommand::Request(Request::FetchEntities { generation }));
    }

    pub fn run_pipeline(&self) {
        self.send(EngineCommand::Request(Request::RunPipeline));
    }

    /// Notifies the backend; completes before later commands are handled.
    pub fn end_session(&self) {
        self.send(EngineCommand::EndSession);
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            if tx.send(command).is_err() {
                viewer_warn!("Engine worker is gone; dropping command");
            }
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_command_loop(
    runtime: Runtime,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    backend: Arc<dyn Backend>,
    save_debounce: Duration,
    sink: Arc<dyn EventSink>,
) {
    let mut debouncer = Debouncer::new(save_debounce);

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::ScheduleSave { seq, code } => {
                let backend = backend.clone();
                let sink = sink.clone();
                debouncer.schedule(runtime.handle(), async move {
                    viewer_debug!("Saving source #{} ({} bytes)", seq, code.len());
                    let result = backend.save_source(&code).await;
                    sink.emit(EngineEvent::Saved { seq, result });
                });
            }
            EngineCommand::CancelSave => {
                if debouncer.cancel() {
                    viewer_debug!("Pending save cancelled");
                }
            }
            EngineCommand::EndSession => {
                let result = runtime.block_on(async {
                    tokio::time::timeout(END_SESSION_GRACE, backend.end_session())
                        .await
                        .unwrap_or_else(|_| {
                            Err(FetchError::new(FailureKind::Timeout, "end of session"))
                        })
                });
                sink.emit(EngineEvent::SessionEnded(result));
            }
            EngineCommand::Request(request) => {
                let backend = backend.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_request(backend.as_ref(), request, sink.as_ref()).await;
                });
            }
        }
    }

    drop(debouncer);
    viewer_debug!("Engine command loop finished");
}

async fn handle_request(backend: &dyn Backend, request: Request, sink: &dyn EventSink) {
    let event = match request {
        Request::DeleteSource => EngineEvent::Deleted(backend.delete_source().await),
        Request::FetchAst { generation } => EngineEvent::AstFetched {
            generation,
            result: backend.get_ast().await,
        },
        Request::FetchTree { generation } => {
            let result = match backend.get_tree().await {
                Ok(bytes) => tokio::task::spawn_blocking(move || decode_tree_image(&bytes))
                    .await
                    .unwrap_or_else(|err| {
                        Err(FetchError::new(FailureKind::Decode, err.to_string()))
                    }),
                Err(err) => Err(err),
            };
            EngineEvent::TreeFetched { generation, result }
        }
        Request::FetchEntities { generation } => EngineEvent::EntitiesFetched {
            generation,
            result: backend.get_entities().await,
        },
        Request::RunPipeline => EngineEvent::PipelineFinished(backend.run_pipeline().await),
    };
    sink.emit(event);
}
