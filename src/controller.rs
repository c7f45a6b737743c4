use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::download::{MediaDownloader, PostProcessor};
use crate::models::{
    DownloadRequest, FormState, Outcome, RequestId, ValidationError, WorkerEvent, WorkerMessage,
};
use crate::registry::RequestRegistry;
use crate::worker::{self, EventSink};

/// Owns the presentation-side download state. Lives on the UI thread; workers
/// only reach it through the event channel.
pub struct Controller {
    downloader: Arc<dyn MediaDownloader>,
    post_processors: Vec<PostProcessor>,
    registry: RequestRegistry,
    sink: EventSink,
    events: Receiver<WorkerMessage>,
    last_outcome: Option<Outcome>,
    settled_progress: u8,
}

impl Controller {
    pub fn new(config: &AppConfig, downloader: Arc<dyn MediaDownloader>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            downloader,
            post_processors: config.post_processors(),
            registry: RequestRegistry::new(),
            sink: EventSink::new(tx),
            events: rx,
            last_outcome: None,
            settled_progress: 0,
        }
    }

    /// Called by workers after each event, e.g. to request a repaint.
    pub fn set_waker(&mut self, waker: impl Fn() + Send + Sync + 'static) {
        self.sink = self.sink.clone().with_waker(waker);
    }

    /// Validates the form and starts a worker. Only one download runs at a
    /// time; a start while one is active is rejected.
    pub fn start(&mut self, form: &FormState) -> Result<RequestId, ValidationError> {
        let request = DownloadRequest::from_form(form)?;
        if let Some(active) = self.registry.active_id() {
            return Err(ValidationError::Busy(active));
        }

        let id = self.registry.allocate_id();
        let format = request.quality().format_expression();
        log::debug!("Download {} format: {}", id, format);

        self.registry.insert(id, request.clone());
        self.last_outcome = None;
        self.settled_progress = 0;

        if let Some(handle) = worker::start(
            id,
            request,
            format,
            self.post_processors.clone(),
            Arc::clone(&self.downloader),
            self.sink.clone(),
        ) {
            self.registry.attach(id, handle);
        }

        Ok(id)
    }

    /// Applies every pending worker event and returns the terminal outcomes
    /// among them, oldest first.
    pub fn poll(&mut self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        while let Ok(message) = self.events.try_recv() {
            if let Some(outcome) = self.apply(message) {
                outcomes.push(outcome);
            }
        }
        outcomes
    }

    /// Blocks until the next terminal outcome or until `timeout` elapses.
    pub fn wait(&mut self, timeout: Duration) -> Option<Outcome> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.events.recv_timeout(remaining) {
                Ok(message) => {
                    if let Some(outcome) = self.apply(message) {
                        return Some(outcome);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                    return None;
                }
            }
        }
    }

    fn apply(&mut self, message: WorkerMessage) -> Option<Outcome> {
        let WorkerMessage { id, event } = message;
        match event {
            WorkerEvent::Progress(percent) => {
                if !self.registry.set_progress(id, percent) {
                    log::warn!("Progress for unknown download {}", id);
                }
                None
            }
            WorkerEvent::Succeeded | WorkerEvent::Failed(_) => {
                let Some(last_percent) = self.registry.get(id).map(|entry| entry.percent) else {
                    log::warn!("Terminal event for unknown download {}", id);
                    return None;
                };
                self.registry.complete(id);
                let outcome = match event {
                    WorkerEvent::Failed(message) => {
                        self.settled_progress = last_percent;
                        Outcome::Failure(id, message)
                    }
                    _ => {
                        self.settled_progress = 100;
                        Outcome::Success(id)
                    }
                };
                self.last_outcome = Some(outcome.clone());
                Some(outcome)
            }
        }
    }

    pub fn is_busy(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Percent of the running download. When idle, the final value of the
    /// last one: 100 after a success, the last reported percent after a failure.
    pub fn progress(&self) -> u8 {
        self.registry
            .active_id()
            .and_then(|id| self.registry.get(id))
            .map_or(self.settled_progress, |entry| entry.percent)
    }

    pub fn last_outcome(&self) -> Option<&Outcome> {
        self.last_outcome.as_ref()
    }
}
