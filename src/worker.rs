use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::download::{DownloadOptions, MediaDownloader, PostProcessor, ProgressUpdate};
use crate::models::{DownloadRequest, RequestId, WorkerEvent, WorkerMessage};

type Waker = Arc<dyn Fn() + Send + Sync>;

/// Where a worker delivers its events. The optional waker is called after
/// every send so a UI that only redraws on input notices the update.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<WorkerMessage>,
    waker: Option<Waker>,
}

impl EventSink {
    pub fn new(tx: Sender<WorkerMessage>) -> Self {
        Self { tx, waker: None }
    }

    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    fn send(&self, message: WorkerMessage) {
        if let Err(e) = self.tx.send(message) {
            log::warn!("Dropping worker event, receiver is gone: {:?}", e.0);
            return;
        }
        if let Some(wake) = &self.waker {
            wake();
        }
    }
}

/// Emits events for a single request. Once the terminal event has been
/// sent every later call is a no-op.
struct Emitter {
    id: RequestId,
    sink: EventSink,
    finished: bool,
    last_percent: Option<u8>,
}

impl Emitter {
    fn new(id: RequestId, sink: EventSink) -> Self {
        Self {
            id,
            sink,
            finished: false,
            last_percent: None,
        }
    }

    fn on_update(&mut self, update: ProgressUpdate) {
        if self.finished {
            return;
        }

        match update {
            ProgressUpdate::Finished => {
                log::debug!("Download {}: stream finished", self.id);
            }
            ProgressUpdate::Downloading { .. } => {
                let Some(percent) = update.percent() else {
                    return;
                };
                if self.last_percent == Some(percent) {
                    return;
                }
                self.last_percent = Some(percent);
                self.sink.send(WorkerMessage {
                    id: self.id,
                    event: WorkerEvent::Progress(percent),
                });
            }
        }
    }

    fn finish(&mut self, event: WorkerEvent) {
        debug_assert!(event.is_terminal());
        if std::mem::replace(&mut self.finished, true) {
            log::debug!("Download {}: ignoring duplicate terminal event {:?}", self.id, event);
            return;
        }
        self.sink.send(WorkerMessage { id: self.id, event });
    }
}

/// Runs one download on its own thread and returns at once. Exactly one
/// terminal event is delivered for `id`, even when the thread can't be
/// spawned or the downloader panics.
pub fn start(
    id: RequestId,
    request: DownloadRequest,
    format: String,
    post_processors: Vec<PostProcessor>,
    downloader: Arc<dyn MediaDownloader>,
    sink: EventSink,
) -> Option<JoinHandle<()>> {
    let options = DownloadOptions::new(format, request.destination(), post_processors);
    let failure_sink = sink.clone();

    let spawned = thread::Builder::new()
        .name(format!("download-{}", id.0))
        .spawn(move || run(id, &request, &options, downloader.as_ref(), sink));

    match spawned {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("Failed to spawn download thread for {}: {}", id, e);
            Emitter::new(id, failure_sink)
                .finish(WorkerEvent::Failed(format!("Failed to start download: {}", e)));
            None
        }
    }
}

fn run(
    id: RequestId,
    request: &DownloadRequest,
    options: &DownloadOptions,
    downloader: &dyn MediaDownloader,
    sink: EventSink,
) {
    log::info!(
        "Download {} started: {} at {} into {}",
        id,
        request.url(),
        request.quality(),
        request.destination().display()
    );

    let mut emitter = Emitter::new(id, sink);
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        downloader.download(request.url(), options, &mut |update| emitter.on_update(update))
    }));

    let event = match result {
        Ok(Ok(())) => {
            log::info!("Download {} completed", id);
            WorkerEvent::Succeeded
        }
        Ok(Err(e)) => {
            log::warn!("Download {} failed: {}", id, e);
            WorkerEvent::Failed(e.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            log::error!("Download {} panicked: {}", id, message);
            WorkerEvent::Failed(message)
        }
    };

    emitter.finish(event);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "download worker panicked".to_string()
    }
}
