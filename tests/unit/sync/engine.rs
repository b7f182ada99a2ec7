use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::{
    capability::DirectoryCandidate,
    render::frame::{EncodedCover, OutputFormat},
};

#[derive(Default)]
struct Log(Mutex<Vec<String>>);

impl Log {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

struct Subjects {
    log: Arc<Log>,
    playing_on: Option<StatusSubject>,
}

#[async_trait]
impl StatusProvider for Subjects {
    async fn fetch_status(&self, query: &StatusQuery) -> CoverResult<Option<StatusRecord>> {
        self.log.push(format!("status {:?}", query.subject));
        Ok((Some(query.subject) == self.playing_on).then(|| StatusRecord::new("Solo", "Song")))
    }
}

struct Names(Arc<Log>);

#[async_trait]
impl DirectoryLookup for Names {
    async fn find_by_name(&self, name: &str) -> CoverResult<Vec<DirectoryCandidate>> {
        self.0.push(format!("lookup {name}"));
        Ok(Vec::new())
    }
}

struct NoImages;

#[async_trait]
impl ImageFetcher for NoImages {
    async fn fetch(&self, url: &str) -> CoverResult<Vec<u8>> {
        Err(CoverError::transient(format!("no {url}")))
    }
}

struct Panicking;

impl CoverRenderer for Panicking {
    fn render(&self, _: &CoverRequest, _: &PreparedCoverAssets) -> CoverResult<EncodedCover> {
        panic!("renderer blew up");
    }
}

struct Tiny;

impl CoverRenderer for Tiny {
    fn render(&self, request: &CoverRequest, _: &PreparedCoverAssets) -> CoverResult<EncodedCover> {
        Ok(EncodedCover {
            format: OutputFormat::Png,
            width: 1,
            height: 1,
            bytes: request.title.as_bytes().to_vec(),
        })
    }
}

struct Publisher(Arc<Log>);

#[async_trait]
impl ImagePublisher for Publisher {
    async fn publish(&self, cover: EncodedCover) -> CoverResult<()> {
        self.0.push(format!("publish {}", String::from_utf8_lossy(&cover.bytes)));
        Ok(())
    }

    async fn remove(&self) -> CoverResult<()> {
        self.0.push("remove");
        Ok(())
    }
}

fn engine(
    settings: EngineSettings,
    playing_on: Option<StatusSubject>,
    renderer: Arc<dyn CoverRenderer>,
) -> (SyncEngine, Arc<Log>) {
    let log = Arc::new(Log::default());
    let caps = Capabilities {
        status: Arc::new(Subjects {
            log: Arc::clone(&log),
            playing_on,
        }),
        directory: Arc::new(Names(Arc::clone(&log))),
        fetcher: Arc::new(NoImages),
        renderer,
        publisher: Arc::new(Publisher(Arc::clone(&log))),
    };
    (SyncEngine::new(settings, caps), log)
}

#[tokio::test]
async fn fallbacks_are_consulted_in_order() {
    let settings = EngineSettings {
        fallbacks: vec![11, 22, 33],
        ..EngineSettings::new(1)
    };
    let (engine, log) = engine(settings, Some(StatusSubject::Fallback(22)), Arc::new(Tiny));

    let outcome = engine.evaluate(0).await.unwrap();
    assert_eq!(outcome, Evaluation::Published(CoverIdentity::new("Solo", "Song")));
    assert_eq!(
        log.entries(),
        vec![
            "status Destination",
            "status Fallback(11)",
            "status Fallback(22)",
            "remove",
            "lookup Solo",
            "publish Song",
        ]
    );
}

#[tokio::test]
async fn no_status_anywhere_with_nothing_shown_is_a_no_op() {
    let settings = EngineSettings {
        fallbacks: vec![5],
        ..EngineSettings::new(1)
    };
    let (engine, log) = engine(settings, None, Arc::new(Tiny));
    assert_eq!(engine.evaluate(0).await.unwrap(), Evaluation::Unchanged);
    assert_eq!(log.entries(), vec!["status Destination", "status Fallback(5)"]);
}

#[tokio::test]
async fn panicking_renderer_releases_the_lock_and_commits_nothing() {
    let (engine, log) = engine(
        EngineSettings::new(1),
        Some(StatusSubject::Destination),
        Arc::new(Panicking),
    );

    let err = engine.evaluate(0).await.unwrap_err();
    assert!(matches!(err, CoverError::Render(_)), "{err}");
    let state = engine.snapshot();
    assert!(!state.generation_in_flight);
    assert_eq!(state.current, None);
    assert!(!log.entries().iter().any(|e| e.starts_with("publish")));
}

#[tokio::test]
async fn force_clear_removes_even_when_nothing_is_tracked() {
    let (engine, log) = engine(EngineSettings::new(1), None, Arc::new(Tiny));
    assert_eq!(engine.force_clear().await.unwrap(), Evaluation::Cleared);
    assert_eq!(log.entries(), vec!["remove"]);
    assert!(!engine.snapshot().generation_in_flight);
}

#[tokio::test(start_paused = true)]
async fn identity_bucket_rolls_over_and_forces_a_new_banner() {
    let settings = EngineSettings {
        identity_bucket: Some(Duration::from_secs(60)),
        ..EngineSettings::new(1)
    };
    let (engine, _) = engine(settings, Some(StatusSubject::Destination), Arc::new(Tiny));

    let first = engine.evaluate(0).await.unwrap();
    assert_eq!(
        first,
        Evaluation::Published(CoverIdentity::new("Solo", "Song").bucketed(0))
    );
    assert_eq!(engine.evaluate(0).await.unwrap(), Evaluation::Unchanged);

    tokio::time::advance(Duration::from_secs(61)).await;
    let rolled = engine.evaluate(0).await.unwrap();
    assert_eq!(
        rolled,
        Evaluation::Published(CoverIdentity::new("Solo", "Song").bucketed(1))
    );
}

#[test]
fn throttle_counter_counts_and_resets() {
    let (engine, _) = engine(EngineSettings::new(1), None, Arc::new(Tiny));
    assert_eq!(engine.record_throttle(), 1);
    assert_eq!(engine.record_throttle(), 2);
    assert_eq!(engine.snapshot().throttle_count, 2);
    engine.reset_throttle();
    assert_eq!(engine.snapshot().throttle_count, 0);
}
