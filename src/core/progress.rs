use std::sync::Mutex;

use tracing::info;

/// Side channel for human-readable status lines.
///
/// Called once per install phase and once per library; must return promptly
/// and never influences what the installer does next.
pub trait ProgressSink: Send + Sync {
    fn update(&self, status: &str);
}

/// Default sink: every status becomes an `info` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&self, status: &str) {
        info!("{status}");
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn update(&self, status: &str) {
        self(status)
    }
}

/// Keeps every status line; used by tests and by callers that print a summary.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    lines: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl ProgressSink for RecordingProgress {
    fn update(&self, status: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(status.to_string());
        }
    }
}
