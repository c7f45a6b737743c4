//! Scripted stand-in for the external downloader.

#![allow(dead_code)]

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use yt_quality_downloader::download::{
    DownloadError, DownloadOptions, MediaDownloader, ProgressUpdate,
};

#[derive(Debug, Clone)]
pub enum Step {
    Progress(u64, Option<u64>),
    Finished,
    /// Blocks the download until the test sends on the gate.
    WaitForGate,
    Fail(String),
    Panic(&'static str),
}

pub struct ScriptedDownloader {
    steps: Vec<Step>,
    gate: Mutex<Option<Receiver<()>>>,
    pub calls: Mutex<Vec<(String, DownloadOptions)>>,
}

impl ScriptedDownloader {
    pub fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps,
            gate: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Like `new`, returning the sender that releases `Step::WaitForGate`.
    pub fn gated(steps: Vec<Step>) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let downloader = Arc::new(Self {
            steps,
            gate: Mutex::new(Some(rx)),
            calls: Mutex::new(Vec::new()),
        });
        (downloader, tx)
    }
}

impl MediaDownloader for ScriptedDownloader {
    fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<(), DownloadError> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        for step in &self.steps {
            match step {
                Step::Progress(downloaded_bytes, total_bytes) => {
                    progress(ProgressUpdate::Downloading {
                        downloaded_bytes: *downloaded_bytes,
                        total_bytes: *total_bytes,
                    })
                }
                Step::Finished => progress(ProgressUpdate::Finished),
                Step::WaitForGate => {
                    let gate = self.gate.lock().unwrap().take();
                    if let Some(rx) = gate {
                        let _ = rx.recv();
                    }
                }
                Step::Fail(message) => return Err(DownloadError::Failed(message.clone())),
                Step::Panic(message) => panic!("{}", message),
            }
        }
        Ok(())
    }
}
