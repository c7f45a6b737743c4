use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::format::Quality;

/// What the user has entered so far. Owned by the UI thread.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    pub url: String,
    pub quality: Quality,
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A validated download request. Built fresh per start and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    url: String,
    quality: Quality,
    destination: PathBuf,
}

impl DownloadRequest {
    /// Checks are applied in the order the form reports them: folder first,
    /// then URL, then that the folder actually exists.
    pub fn from_form(form: &FormState) -> Result<Self, ValidationError> {
        let destination = form
            .destination
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or(ValidationError::NoDestination)?;

        let url = form.url.trim();
        if url.is_empty() {
            return Err(ValidationError::EmptyUrl);
        }

        if !destination.is_dir() {
            return Err(ValidationError::DestinationMissing(destination.clone()));
        }

        Ok(Self {
            url: url.to_string(),
            quality: form.quality,
            destination: destination.clone(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn destination(&self) -> &PathBuf {
        &self.destination
    }
}

/// Raised synchronously by the controller; no worker is started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no destination folder selected")]
    NoDestination,
    #[error("no video URL entered")]
    EmptyUrl,
    #[error("destination folder does not exist: {}", .0.display())]
    DestinationMissing(PathBuf),
    #[error("download {0} is still running")]
    Busy(RequestId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Progress(u8),
    Succeeded,
    Failed(String),
}

impl WorkerEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerEvent::Progress(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMessage {
    pub id: RequestId,
    pub event: WorkerEvent,
}

/// Terminal result of one request as seen by the view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(RequestId),
    Failure(RequestId, String),
}

impl Outcome {
    pub fn id(&self) -> RequestId {
        match self {
            Outcome::Success(id) | Outcome::Failure(id, _) => *id,
        }
    }
}
