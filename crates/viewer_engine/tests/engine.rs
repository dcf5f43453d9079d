use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use serde_json::json;
use viewer_engine::{
    Backend, ChannelEventSink, EngineEvent, EngineHandle, EntitiesPayload, FailureKind,
    FetchError,
};

const WAIT: Duration = Duration::from_secs(2);

/// Records calls and answers with canned data.
#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<String>>,
    tree: Mutex<Vec<u8>>,
    fail_ast: bool,
}

impl FakeBackend {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn save_source(&self, code: &str) -> Result<(), FetchError> {
        self.record(format!("save:{code}"));
        Ok(())
    }

    async fn delete_source(&self) -> Result<(), FetchError> {
        self.record("delete");
        Ok(())
    }

    async fn get_ast(&self) -> Result<serde_json::Value, FetchError> {
        self.record("ast");
        if self.fail_ast {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(404),
                message: "404 Not Found".to_string(),
            });
        }
        Ok(json!({ "type": "Program" }))
    }

    async fn get_tree(&self) -> Result<Bytes, FetchError> {
        self.record("tree");
        Ok(Bytes::from(self.tree.lock().unwrap().clone()))
    }

    async fn get_entities(&self) -> Result<EntitiesPayload, FetchError> {
        self.record("entities");
        Ok(EntitiesPayload::default())
    }

    async fn run_pipeline(&self) -> Result<(), FetchError> {
        self.record("generate");
        Ok(())
    }

    async fn end_session(&self) -> Result<(), FetchError> {
        self.record("end");
        Ok(())
    }
}

fn start(backend: Arc<FakeBackend>, debounce: Duration) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::with_backend(backend, debounce, Arc::new(ChannelEventSink::new(tx)))
        .expect("engine");
    (engine, rx)
}

#[test]
fn rapid_saves_issue_one_request_with_latest_text() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, rx) = start(backend.clone(), Duration::from_millis(100));

    engine.schedule_save(1, "h");
    engine.schedule_save(2, "he");
    engine.schedule_save(3, "hel");

    assert_eq!(
        rx.recv_timeout(WAIT).unwrap(),
        EngineEvent::Saved {
            seq: 3,
            result: Ok(()),
        }
    );
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(backend.calls(), vec!["save:hel".to_string()]);
}

#[test]
fn cancelled_save_never_reaches_backend() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, rx) = start(backend.clone(), Duration::from_millis(100));

    engine.schedule_save(1, "x");
    engine.cancel_save();
    engine.delete_source();

    assert_eq!(rx.recv_timeout(WAIT).unwrap(), EngineEvent::Deleted(Ok(())));
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    assert_eq!(backend.calls(), vec!["delete".to_string()]);
}

#[test]
fn fetches_are_tagged_with_generation() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, rx) = start(backend, Duration::from_millis(100));

    engine.fetch_ast(7);
    engine.fetch_entities(7);

    let mut events = vec![rx.recv_timeout(WAIT).unwrap(), rx.recv_timeout(WAIT).unwrap()];
    events.sort_by_key(|event| matches!(event, EngineEvent::EntitiesFetched { .. }));
    assert_eq!(
        events,
        vec![
            EngineEvent::AstFetched {
                generation: 7,
                result: Ok(json!({ "type": "Program" })),
            },
            EngineEvent::EntitiesFetched {
                generation: 7,
                result: Ok(EntitiesPayload::default()),
            },
        ]
    );
}

#[test]
fn ast_failure_is_reported_with_generation() {
    let backend = Arc::new(FakeBackend {
        fail_ast: true,
        ..FakeBackend::default()
    });
    let (engine, rx) = start(backend, Duration::from_millis(100));

    engine.fetch_ast(3);

    match rx.recv_timeout(WAIT).unwrap() {
        EngineEvent::AstFetched { generation, result } => {
            assert_eq!(generation, 3);
            assert_eq!(result.unwrap_err().kind, FailureKind::HttpStatus(404));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn undecodable_tree_is_reported_as_decode_failure() {
    let backend = Arc::new(FakeBackend::default());
    *backend.tree.lock().unwrap() = b"definitely not a png".to_vec();
    let (engine, rx) = start(backend, Duration::from_millis(100));

    engine.fetch_tree(1);

    match rx.recv_timeout(WAIT).unwrap() {
        EngineEvent::TreeFetched { generation, result } => {
            assert_eq!(generation, 1);
            assert_eq!(result.unwrap_err().kind, FailureKind::Decode);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn end_session_completes_before_shutdown() {
    let backend = Arc::new(FakeBackend::default());
    let (engine, rx) = start(backend.clone(), Duration::from_millis(100));

    engine.run_pipeline();
    engine.end_session();
    drop(engine);

    assert!(backend.calls().contains(&"end".to_string()));
    let events: Vec<_> = rx.try_iter().collect();
    assert!(events.contains(&EngineEvent::SessionEnded(Ok(()))));
}
