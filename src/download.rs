use std::fmt;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;

const PROGRESS_PREFIX: &str = "PROGRESS|";
const PROGRESS_TEMPLATE: &str =
    "download:PROGRESS|%(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s";

/// Output containers the conversion step can force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Mp4,
    Mkv,
    Webm,
}

impl Container {
    pub fn extension(self) -> &'static str {
        match self {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
            Container::Webm => "webm",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "mp4" => Some(Container::Mp4),
            "mkv" => Some(Container::Mkv),
            "webm" => Some(Container::Webm),
            _ => None,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    /// Re-encode the merged file into a fixed container.
    ConvertVideo { container: Container },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub format: String,
    pub output_template: String,
    pub post_processors: Vec<PostProcessor>,
}

impl DownloadOptions {
    /// Output goes to `<destination>/<title>.<ext>`; yt-dlp sanitizes the title.
    pub fn new(format: String, destination: &Path, post_processors: Vec<PostProcessor>) -> Self {
        let output_template = destination
            .join("%(title)s.%(ext)s")
            .to_string_lossy()
            .to_string();

        Self {
            format,
            output_template,
            post_processors,
        }
    }
}

/// Status reported by the downloader while a call is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressUpdate {
    Downloading {
        downloaded_bytes: u64,
        total_bytes: Option<u64>,
    },
    Finished,
}

impl ProgressUpdate {
    /// Whole percent downloaded, or `None` when the total size is unknown.
    pub fn percent(&self) -> Option<u8> {
        match *self {
            ProgressUpdate::Downloading {
                downloaded_bytes,
                total_bytes: Some(total),
            } if total > 0 => {
                let pct = u128::from(downloaded_bytes) * 100 / u128::from(total);
                Some(pct.min(100) as u8)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("yt-dlp not found. Please install it and make sure it's in your PATH ({0})")]
    NotInstalled(String),
    #[error("failed to start yt-dlp: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("failed to read yt-dlp output: {0}")]
    Io(#[from] std::io::Error),
    /// Message reported by the downloader itself, passed through untouched.
    #[error("{0}")]
    Failed(String),
}

/// The external media download library. `download` blocks until the file is
/// written (or the attempt fails) and calls `progress` synchronously from
/// the calling thread.
pub trait MediaDownloader: Send + Sync {
    fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<(), DownloadError>;
}

/// Drives the `yt-dlp` executable.
#[derive(Debug, Clone, Default)]
pub struct YtDlp {
    executable: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(executable: Option<PathBuf>) -> Self {
        Self { executable }
    }

    fn resolve(&self) -> Result<PathBuf, DownloadError> {
        match &self.executable {
            Some(path) => Ok(path.clone()),
            None => which::which("yt-dlp").map_err(|e| DownloadError::NotInstalled(e.to_string())),
        }
    }

    fn command(&self, url: &str, options: &DownloadOptions) -> Result<Command, DownloadError> {
        let mut command = Command::new(self.resolve()?);
        command
            .args(build_args(url, options))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(command)
    }
}

impl MediaDownloader for YtDlp {
    fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        progress: &mut dyn FnMut(ProgressUpdate),
    ) -> Result<(), DownloadError> {
        let mut command = self.command(url, options)?;
        log::debug!("Command: {:?}", command);

        let mut child = command.spawn().map_err(DownloadError::Spawn)?;

        // Drain stderr separately so a chatty child can't deadlock on a full pipe.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        if let Some(stdout) = child.stdout.take() {
            if let Err(e) = forward_progress(stdout, progress) {
                let _ = child.kill();
                let _ = child.wait();
                if let Some(handle) = stderr_reader {
                    let _ = handle.join();
                }
                return Err(DownloadError::Io(e));
            }
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if status.success() {
            Ok(())
        } else {
            Err(DownloadError::Failed(failure_message(&stderr, &status.to_string())))
        }
    }
}

fn forward_progress(
    stdout: impl Read,
    progress: &mut dyn FnMut(ProgressUpdate),
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stdout);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        match parse_progress_line(&text) {
            Some(update) => progress(update),
            None => log::trace!("yt-dlp: {}", text.trim_end()),
        }
    }
}

pub fn build_args(url: &str, options: &DownloadOptions) -> Vec<String> {
    let mut args = vec![
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "-f".to_string(),
        options.format.clone(),
        "-o".to_string(),
        options.output_template.clone(),
    ];

    for post_processor in &options.post_processors {
        match post_processor {
            PostProcessor::ConvertVideo { container } => {
                args.push("--recode-video".to_string());
                args.push(container.extension().to_string());
            }
        }
    }

    // End of options, so a URL starting with '-' is never read as a flag.
    args.push("--".to_string());
    args.push(url.to_string());
    args
}

/// Parses one line written by our `--progress-template`. Unknown byte counts
/// are printed by yt-dlp as `NA`.
pub fn parse_progress_line(line: &str) -> Option<ProgressUpdate> {
    let rest = line.trim().strip_prefix(PROGRESS_PREFIX)?;
    let mut parts = rest.split('|').map(str::trim);
    let status = parts.next()?;

    match status {
        "downloading" => {
            let downloaded_bytes = parse_bytes(parts.next()?)?;
            let total_bytes = parts.next().and_then(parse_bytes);
            Some(ProgressUpdate::Downloading {
                downloaded_bytes,
                total_bytes,
            })
        }
        "finished" => Some(ProgressUpdate::Finished),
        _ => None,
    }
}

fn parse_bytes(field: &str) -> Option<u64> {
    // Some extractors report fractional byte counts.
    field.parse::<u64>().ok().or_else(|| {
        field
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v as u64)
    })
}

fn failure_message(stderr: &str, status: &str) -> String {
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("ERROR:"))
        .collect();

    if !errors.is_empty() {
        errors.join("\n")
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        format!("yt-dlp exited with {}", status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_half() {
        let update = ProgressUpdate::Downloading {
            downloaded_bytes: 50,
            total_bytes: Some(100),
        };
        assert_eq!(update.percent(), Some(50));
    }

    #[test]
    fn test_percent_floors_and_clamps() {
        let partial = ProgressUpdate::Downloading {
            downloaded_bytes: 999,
            total_bytes: Some(1000),
        };
        assert_eq!(partial.percent(), Some(99));

        let overshoot = ProgressUpdate::Downloading {
            downloaded_bytes: 1500,
            total_bytes: Some(1000),
        };
        assert_eq!(overshoot.percent(), Some(100));
    }

    #[test]
    fn test_percent_unknown_total() {
        let unknown = ProgressUpdate::Downloading {
            downloaded_bytes: 4096,
            total_bytes: None,
        };
        assert_eq!(unknown.percent(), None);

        let zero = ProgressUpdate::Downloading {
            downloaded_bytes: 4096,
            total_bytes: Some(0),
        };
        assert_eq!(zero.percent(), None);
        assert_eq!(ProgressUpdate::Finished.percent(), None);
    }

    #[test]
    fn test_parse_downloading_line() {
        assert_eq!(
            parse_progress_line("PROGRESS|downloading|1024|4096\n"),
            Some(ProgressUpdate::Downloading {
                downloaded_bytes: 1024,
                total_bytes: Some(4096),
            })
        );
    }

    #[test]
    fn test_parse_unknown_total() {
        assert_eq!(
            parse_progress_line("PROGRESS|downloading|2048.0|NA"),
            Some(ProgressUpdate::Downloading {
                downloaded_bytes: 2048,
                total_bytes: None,
            })
        );
    }

    #[test]
    fn test_parse_finished_and_noise() {
        assert_eq!(
            parse_progress_line("PROGRESS|finished|4096|4096"),
            Some(ProgressUpdate::Finished)
        );
        assert_eq!(parse_progress_line("[youtube] abc: Downloading webpage"), None);
        assert_eq!(parse_progress_line("PROGRESS|downloading|NA|NA"), None);
    }

    #[test]
    fn test_build_args_with_conversion() {
        let options = DownloadOptions::new(
            "bestvideo[height<=720]+bestaudio/best[height<=720]".to_string(),
            Path::new("/tmp/videos"),
            vec![PostProcessor::ConvertVideo {
                container: Container::Mp4,
            }],
        );
        let args = build_args("https://v.example/watch?v=1", &options);

        let pos = args.iter().position(|a| a == "-f").unwrap();
        assert_eq!(args[pos + 1], options.format);
        let pos = args.iter().position(|a| a == "-o").unwrap();
        assert!(args[pos + 1].ends_with("%(title)s.%(ext)s"));
        assert!(args[pos + 1].starts_with("/tmp/videos"));
        let pos = args.iter().position(|a| a == "--recode-video").unwrap();
        assert_eq!(args[pos + 1], "mp4");
        assert_eq!(args.last().unwrap(), "https://v.example/watch?v=1");
    }

    #[test]
    fn test_build_args_without_conversion() {
        let options = DownloadOptions::new("best".to_string(), Path::new("/tmp"), Vec::new());
        let args = build_args("https://v.example/1", &options);
        assert!(!args.iter().any(|a| a == "--recode-video"));
    }

    #[test]
    fn test_failure_message_prefers_error_lines() {
        let stderr = "WARNING: something\nERROR: [youtube] abc: Video unavailable\n";
        assert_eq!(
            failure_message(stderr, "exit status: 1"),
            "ERROR: [youtube] abc: Video unavailable"
        );
        assert_eq!(failure_message("boom\n", "exit status: 1"), "boom");
        assert_eq!(
            failure_message("", "exit status: 2"),
            "yt-dlp exited with exit status: 2"
        );
    }

    #[test]
    fn test_container_parse() {
        assert_eq!(Container::parse(" MP4 "), Some(Container::Mp4));
        assert_eq!(Container::parse("avi"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_missing_executable_is_spawn_error() {
        let ytdlp = YtDlp::new(Some(PathBuf::from("/nonexistent/yt-dlp")));
        let options = DownloadOptions::new("best".to_string(), Path::new("/tmp"), Vec::new());
        let err = ytdlp
            .download("https://v.example/1", &options, &mut |_| {})
            .unwrap_err();
        assert!(matches!(err, DownloadError::Spawn(_)));
    }

    #[cfg(unix)]
    fn fake_ytdlp(dir: &Path, script: &str) -> YtDlp {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("yt-dlp");
        std::fs::write(&path, format!("#!/bin/sh\n{script}")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        YtDlp::new(Some(path))
    }

    #[cfg(unix)]
    fn run_fake(script: &str) -> (Vec<ProgressUpdate>, Result<(), DownloadError>) {
        let dir = tempfile::tempdir().unwrap();
        let ytdlp = fake_ytdlp(dir.path(), script);
        let options = DownloadOptions::new("best".to_string(), dir.path(), Vec::new());
        let mut updates = Vec::new();
        let result = ytdlp.download("https://v.example/1", &options, &mut |u| updates.push(u));
        (updates, result)
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_progress_and_error() {
        let (updates, result) = run_fake(
            "echo '[youtube] abc: Downloading webpage'\n\
             echo 'PROGRESS|downloading|50|100'\n\
             echo 'PROGRESS|downloading|10|NA'\n\
             echo 'PROGRESS|finished|100|100'\n\
             echo 'WARNING: slow' >&2\n\
             echo 'ERROR: [youtube] abc: Video unavailable' >&2\n\
             exit 1\n",
        );

        assert_eq!(
            updates,
            vec![
                ProgressUpdate::Downloading {
                    downloaded_bytes: 50,
                    total_bytes: Some(100),
                },
                ProgressUpdate::Downloading {
                    downloaded_bytes: 10,
                    total_bytes: None,
                },
                ProgressUpdate::Finished,
            ]
        );
        match result {
            Err(DownloadError::Failed(message)) => {
                assert_eq!(message, "ERROR: [youtube] abc: Video unavailable")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_success() {
        let (updates, result) = run_fake(
            "echo 'PROGRESS|downloading|25|100'\n\
             echo 'PROGRESS|finished|100|100'\n\
             exit 0\n",
        );
        assert!(result.is_ok());
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].percent(), Some(25));
        assert_eq!(updates[1], ProgressUpdate::Finished);
    }

    #[cfg(unix)]
    #[test]
    fn test_subprocess_receives_url_last() {
        let (_, result) = run_fake("for last; do :; done\necho \"$last\" >&2\nexit 3\n");
        match result {
            Err(DownloadError::Failed(message)) => assert_eq!(message, "https://v.example/1"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
