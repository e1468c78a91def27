//! Log sinks.
//!
//! The terminal viewer owns the screen, so its events go to a per-session
//! file through an explicit [`LogHandle`]. Non-interactive commands log to
//! stderr instead.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::error::Result;

type SharedWriter = Arc<Mutex<BufWriter<File>>>;

/// One event's writer onto the shared session file.
struct SessionWriter(SharedWriter);

impl SessionWriter {
    fn with<T>(&self, f: impl FnOnce(&mut BufWriter<File>) -> io::Result<T>) -> io::Result<T> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        f(&mut guard)
    }
}

impl Write for SessionWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with(|w| w.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with(|w| w.flush())
    }
}

/// A log destination scoped to one viewer session. Opened when the viewer is
/// constructed, flushed when dropped.
pub struct LogHandle {
    dispatch: Dispatch,
    writer: Option<SharedWriter>,
    path: Option<PathBuf>,
}

impl LogHandle {
    /// Log to `gitguy_<uuid>_<unix>.log` inside `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let unix = Utc::now().timestamp();
        let path = dir.join(format!("gitguy_{}_{}.log", Uuid::new_v4(), unix));
        let writer: SharedWriter = Arc::new(Mutex::new(BufWriter::new(File::create(&path)?)));

        let sink = Arc::clone(&writer);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || SessionWriter(Arc::clone(&sink)))
            .with_ansi(false)
            .with_env_filter(EnvFilter::new("gitguy=debug"))
            .finish();

        Ok(Self {
            dispatch: Dispatch::new(subscriber),
            writer: Some(writer),
            path: Some(path),
        })
    }

    /// A handle that discards everything.
    pub fn none() -> Self {
        Self {
            dispatch: Dispatch::none(),
            writer: None,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// Run `f` with this handle as the active subscriber.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    pub fn flush(&self) {
        if let Some(writer) = &self.writer
            && let Ok(mut guard) = writer.lock()
        {
            let _ = guard.flush();
        }
    }
}

impl Drop for LogHandle {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Install the global stderr subscriber for non-interactive runs.
pub fn init_stderr(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn should_write_session_file_on_drop() {
        // given
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::open(dir.path()).unwrap();
        let path = handle.path().unwrap().to_path_buf();

        // when
        handle.in_scope(|| tracing::info!(target: "gitguy::test", "viewer opened"));
        drop(handle);

        // then
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("gitguy_"));
        assert!(name.ends_with(".log"));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("viewer opened"));
    }

    #[test]
    fn should_append_events_from_every_scope() {
        // given
        let dir = TempDir::new().unwrap();
        let handle = LogHandle::open(dir.path()).unwrap();
        let path = handle.path().unwrap().to_path_buf();

        // when
        handle.in_scope(|| tracing::debug!(target: "gitguy::viewer", rows = 3, "rendered"));
        handle.in_scope(|| tracing::info!(target: "gitguy::app", "generated"));
        handle.flush();

        // then
        let contents = std::fs::read_to_string(&path).unwrap();
        let rendered = contents.find("rendered").unwrap();
        let generated = contents.find("generated").unwrap();
        assert!(rendered < generated);
        assert!(contents.contains("rows=3"));
        assert!(!contents.contains('\u{1b}'));
    }

    #[test]
    fn should_discard_with_none_handle() {
        let handle = LogHandle::none();
        let value = handle.in_scope(|| {
            tracing::info!("dropped");
            7
        });
        assert_eq!(value, 7);
        assert!(handle.path().is_none());
    }
}
