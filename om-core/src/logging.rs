use std::fs::{
    File,
    OpenOptions,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::format::FmtSpan;

pub fn setup(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::NEW)
        .with_target(false)
        .with_env_filter(env_filter)
        .compact()
        .init();
}

pub fn setup_for_cli(env_filter: &str) {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .without_time()
        .compact()
        .init();
}

// A LogSession is a scoped log sink: everything emitted on the current thread while the session
// is alive goes to the session's log file instead of the global subscriber.  The file is synced
// when the session is dropped.  The scenario runner opens one per run so that parameters, objects
// and diffs for that run end up in one place.
pub struct LogSession {
    path: PathBuf,
    file: Arc<File>,
    _guard: DefaultGuard,
}

impl LogSession {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.file.sync_all()
    }
}

impl Drop for LogSession {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            eprintln!("could not flush log session {}: {err}", self.path.display());
        }
    }
}

pub fn session(env_filter: &str, path: &Path, reset: bool) -> anyhow::Result<LogSession> {
    let file = Arc::new(
        OpenOptions::new()
            .create(true)
            .write(true)
            .append(!reset)
            .truncate(reset)
            .open(path)?,
    );

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .with_writer(file.clone())
        .finish();

    Ok(LogSession {
        path: path.into(),
        file,
        _guard: tracing::subscriber::set_default(subscriber),
    })
}
