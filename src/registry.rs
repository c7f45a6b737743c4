use std::collections::HashMap;
use std::thread::JoinHandle;

use crate::models::{DownloadRequest, RequestId};

pub struct ActiveDownload {
    pub request: DownloadRequest,
    pub percent: u8,
    handle: Option<JoinHandle<()>>,
}

/// Every started request stays here until its terminal event has been
/// observed, so no in-flight worker is ever orphaned.
#[derive(Default)]
pub struct RequestRegistry {
    next_id: u64,
    active: HashMap<RequestId, ActiveDownload>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }

    pub fn insert(&mut self, id: RequestId, request: DownloadRequest) {
        self.active.insert(
            id,
            ActiveDownload {
                request,
                percent: 0,
                handle: None,
            },
        );
    }

    /// Attaches the worker thread after it has been spawned. The worker may
    /// already have finished, in which case the handle is joined right away.
    pub fn attach(&mut self, id: RequestId, handle: JoinHandle<()>) {
        match self.active.get_mut(&id) {
            Some(entry) => entry.handle = Some(handle),
            None => join(id, handle),
        }
    }

    pub fn get(&self, id: RequestId) -> Option<&ActiveDownload> {
        self.active.get(&id)
    }

    pub fn set_progress(&mut self, id: RequestId, percent: u8) -> bool {
        match self.active.get_mut(&id) {
            Some(entry) => {
                entry.percent = percent.min(100);
                true
            }
            None => false,
        }
    }

    /// Removes a request once its terminal event arrived.
    pub fn complete(&mut self, id: RequestId) -> Option<DownloadRequest> {
        let mut entry = self.active.remove(&id)?;
        if let Some(handle) = entry.handle.take() {
            join(id, handle);
        }
        Some(entry.request)
    }

    pub fn active_id(&self) -> Option<RequestId> {
        self.active.keys().min().copied()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

// The terminal event is the worker's last action, so this returns promptly.
fn join(id: RequestId, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        log::error!("Download thread for {} panicked after reporting", id);
    }
}
