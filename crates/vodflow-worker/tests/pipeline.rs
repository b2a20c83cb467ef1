//! End-to-end pipeline tests: store -> recovery -> queue -> worker loop.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use vodflow_models::{VideoId, VideoRecord, VideoStatus};
use vodflow_queue::{JobIntake, TranscodeQueue};
use vodflow_store::{InMemoryVideoStore, VideoStore};
use vodflow_worker::{Transcoder, WorkerConfig, WorkerLoop, WorkerResult};

/// Transcoder double that records inputs instead of running ffmpeg.
#[derive(Default)]
struct RecordingTranscoder {
    seen: Mutex<Vec<PathBuf>>,
    fail_matching: Option<String>,
}

impl RecordingTranscoder {
    fn failing_on(marker: &str) -> Self {
        Self {
            seen: Mutex::new(Vec::new()),
            fail_matching: Some(marker.to_string()),
        }
    }

    async fn seen(&self) -> Vec<PathBuf> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl Transcoder for RecordingTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path) -> WorkerResult<Vec<PathBuf>> {
        self.seen.lock().await.push(input.to_path_buf());

        if let Some(marker) = &self.fail_matching {
            if input.to_string_lossy().contains(marker.as_str()) {
                return Err(vodflow_worker::WorkerError::transcode_failed(
                    "synthetic codec error",
                ));
            }
        }

        Ok(vec![output_dir.join("1080p.mp4")])
    }
}

fn test_config(dir: &tempfile::TempDir) -> WorkerConfig {
    WorkerConfig {
        idle_poll_interval: Duration::from_millis(50),
        reconcile_interval: Duration::from_secs(3600),
        shutdown_timeout: Duration::from_secs(1),
        ingest_dir: dir.path().join("ingest"),
        output_dir: dir.path().join("renditions"),
    }
}

async fn seed(store: &InMemoryVideoStore, name: &str, status: VideoStatus) -> VideoId {
    let mut record = VideoRecord::new(VideoId::from_string(name), "user1", name, 64);
    record.status = status;
    let id = record.video_id.clone();
    store.insert(record).await.unwrap();
    id
}

async fn wait_for_status(
    store: &Arc<InMemoryVideoStore>,
    video_id: &VideoId,
    expected: VideoStatus,
) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        let record = store.get(video_id).await.unwrap();
        if record.status == expected {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {} to become {}, currently {}",
            video_id,
            expected,
            record.status
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn pending_records_drain_to_ready_on_startup() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVideoStore::new(dir.path().join("ingest")));
    let queue = Arc::new(TranscodeQueue::new());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let a = seed(&store, "video-a", VideoStatus::Pending).await;
    let b = seed(&store, "video-b", VideoStatus::Pending).await;

    let worker = Arc::new(WorkerLoop::new(
        test_config(&dir),
        Arc::clone(&store) as Arc<dyn VideoStore>,
        Arc::clone(&queue),
        Arc::clone(&transcoder) as Arc<dyn Transcoder>,
    ));
    let shutdown = worker.shutdown_handle();
    let handle = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    wait_for_status(&store, &a, VideoStatus::Ready).await;
    wait_for_status(&store, &b, VideoStatus::Ready).await;
    assert_eq!(transcoder.seen().await.len(), 2);

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn crashed_processing_record_is_recovered() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVideoStore::new(dir.path().join("ingest")));
    let queue = Arc::new(TranscodeQueue::new());
    let transcoder = Arc::new(RecordingTranscoder::default());

    // Leftover of a worker that died mid-transcode.
    let stuck = seed(&store, "stuck", VideoStatus::Processing).await;

    let worker = Arc::new(WorkerLoop::new(
        test_config(&dir),
        Arc::clone(&store) as Arc<dyn VideoStore>,
        Arc::clone(&queue),
        Arc::clone(&transcoder) as Arc<dyn Transcoder>,
    ));
    let shutdown = worker.shutdown_handle();
    let handle = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    wait_for_status(&store, &stuck, VideoStatus::Ready).await;

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn failed_transcode_is_recorded_and_loop_survives() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVideoStore::new(dir.path().join("ingest")));
    let queue = Arc::new(TranscodeQueue::new());
    let transcoder = Arc::new(RecordingTranscoder::failing_on("bad-video"));

    let bad = seed(&store, "bad-video", VideoStatus::Pending).await;
    let good = seed(&store, "good-video", VideoStatus::Pending).await;

    let worker = Arc::new(WorkerLoop::new(
        test_config(&dir),
        Arc::clone(&store) as Arc<dyn VideoStore>,
        Arc::clone(&queue),
        Arc::clone(&transcoder) as Arc<dyn Transcoder>,
    ));
    let shutdown = worker.shutdown_handle();
    let handle = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    wait_for_status(&store, &bad, VideoStatus::Failed).await;
    wait_for_status(&store, &good, VideoStatus::Ready).await;

    let record = store.get(&bad).await.unwrap();
    assert!(record
        .error_message
        .as_deref()
        .unwrap()
        .contains("synthetic codec error"));

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn live_submission_reaches_running_worker() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryVideoStore::new(dir.path().join("ingest")));
    let queue = Arc::new(TranscodeQueue::new());
    let transcoder = Arc::new(RecordingTranscoder::default());

    let worker = Arc::new(WorkerLoop::new(
        test_config(&dir),
        Arc::clone(&store) as Arc<dyn VideoStore>,
        Arc::clone(&queue),
        Arc::clone(&transcoder) as Arc<dyn Transcoder>,
    ));
    let shutdown = worker.shutdown_handle();
    let handle = {
        let worker = Arc::clone(&worker);
        tokio::spawn(async move { worker.run().await })
    };

    // Upload finishes while the worker is already idling.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let late = seed(&store, "late-arrival", VideoStatus::Uploading).await;
    let intake = JobIntake::new(Arc::clone(&store) as Arc<dyn VideoStore>, Arc::clone(&queue));
    intake.submit(&late).await.unwrap();

    wait_for_status(&store, &late, VideoStatus::Ready).await;

    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();
}
