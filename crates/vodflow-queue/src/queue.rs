//! Deduplicating in-memory transcode queue.

use std::collections::{HashSet, VecDeque};

use tokio::sync::Mutex;
use tracing::debug;

use vodflow_models::VideoId;

/// Pending work, guarded as one unit so enqueue and dequeue stay atomic with
/// respect to each other. `members` mirrors `order` and makes the membership
/// check O(1).
struct QueueInner {
    order: VecDeque<VideoId>,
    members: HashSet<VideoId>,
}

/// In-memory queue of videos waiting for the transcode worker.
///
/// The queue is a transient cache of the durable store's `Pending` records:
/// it holds each video at most once, loses everything on restart, and is
/// rebuilt by [`RecoverySync`](crate::RecoverySync). Producers (upload
/// completion, reconciliation) share one instance with the single consumer
/// loop; there is no global state.
pub struct TranscodeQueue {
    inner: Mutex<QueueInner>,
}

impl TranscodeQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                order: VecDeque::new(),
                members: HashSet::new(),
            }),
        }
    }

    /// Add a video unless it is already queued.
    ///
    /// Idempotent and safe to call concurrently from any number of
    /// producers. A video removed by `try_dequeue` can be enqueued again,
    /// which is how a completed video re-enters the pipeline when
    /// re-submitted later.
    pub async fn enqueue(&self, video_id: VideoId) {
        let mut inner = self.inner.lock().await;
        if inner.members.insert(video_id.clone()) {
            debug!(video_id = %video_id, "Enqueued video for transcoding");
            inner.order.push_back(video_id);
        } else {
            debug!(video_id = %video_id, "Video already queued, skipping");
        }
    }

    /// Atomically remove and return one pending video, if any.
    ///
    /// Membership is cleared in the same critical section, so the video is
    /// out of the working set before processing starts.
    pub async fn try_dequeue(&self) -> Option<VideoId> {
        let mut inner = self.inner.lock().await;
        let video_id = inner.order.pop_front()?;
        inner.members.remove(&video_id);
        Some(video_id)
    }

    /// Number of videos currently queued.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.order.is_empty()
    }

    /// Whether a video is currently queued.
    pub async fn contains(&self, video_id: &VideoId) -> bool {
        self.inner.lock().await.members.contains(video_id)
    }
}

impl Default for TranscodeQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_enqueue_dequeue_roundtrip() {
        let queue = TranscodeQueue::new();
        let id = VideoId::from_string("a");

        queue.enqueue(id.clone()).await;
        assert_eq!(queue.try_dequeue().await, Some(id));
        assert_eq!(queue.try_dequeue().await, None);
        assert!(queue.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_enqueue_is_deduplicated() {
        let queue = TranscodeQueue::new();
        let id = VideoId::from_string("a");

        for _ in 0..5 {
            queue.enqueue(id.clone()).await;
        }

        assert_eq!(queue.len().await, 1);
        assert_eq!(queue.try_dequeue().await, Some(id));
        assert_eq!(queue.try_dequeue().await, None);
    }

    #[tokio::test]
    async fn test_requeue_after_dequeue() {
        let queue = TranscodeQueue::new();
        let id = VideoId::from_string("a");

        queue.enqueue(id.clone()).await;
        assert_eq!(queue.try_dequeue().await, Some(id.clone()));

        // Completed work re-submitted under the same ID queues again.
        queue.enqueue(id.clone()).await;
        assert!(queue.contains(&id).await);
    }

    #[tokio::test]
    async fn test_concurrent_enqueue_of_same_id() {
        let queue = Arc::new(TranscodeQueue::new());
        let id = VideoId::from_string("contended");

        let mut handles = Vec::new();
        for _ in 0..32 {
            let queue = Arc::clone(&queue);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                queue.enqueue(id).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(queue.try_dequeue().await, Some(id));
        assert_eq!(queue.try_dequeue().await, None);
    }

    #[tokio::test]
    async fn test_interleaved_ids_all_drain_once() {
        let queue = Arc::new(TranscodeQueue::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let id = VideoId::from_string(format!("video-{}", i % 4));
                for _ in 0..10 {
                    queue.enqueue(id.clone()).await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut drained = Vec::new();
        while let Some(id) = queue.try_dequeue().await {
            drained.push(id);
        }

        drained.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        drained.dedup();
        assert_eq!(drained.len(), 4);
    }
}
