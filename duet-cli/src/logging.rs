//! In-memory logger feeding the TUI log panel.
//!
//! Records go into a bounded ring shared with the UI. `RUST_LOG` picks the
//! level and `DUET_LOG_STDERR=1` echoes every line to stderr as well. While
//! the TUI owns the terminal, [`capture_stderr`] redirects the process
//! stderr (including output from the audio host libraries) into the same
//! ring.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use std::os::unix::io::{AsRawFd, FromRawFd, RawFd};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use log::{LevelFilter, Log, Metadata, Record};

const LOG_CAPACITY: usize = 500;

pub type LogBuffer = Arc<Mutex<VecDeque<String>>>;

struct SharedLogger {
    level: LevelFilter,
    buffer: LogBuffer,
    echo_stderr: bool,
}

impl Log for SharedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format!("[{}] {}", record.level(), record.args());
        if self.echo_stderr {
            eprintln!("{}", line);
        }
        push_line(&self.buffer, line);
    }

    fn flush(&self) {}
}

static LOG_BUFFER: OnceLock<LogBuffer> = OnceLock::new();
static LOGGER: OnceLock<SharedLogger> = OnceLock::new();

fn push_line(buffer: &LogBuffer, line: String) {
    let mut buffer = buffer.lock().unwrap();
    if buffer.len() >= LOG_CAPACITY {
        buffer.pop_front();
    }
    buffer.push_back(line);
}

fn level_from_env(value: Option<&str>) -> LevelFilter {
    value
        .and_then(|level| level.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the shared logger and return its buffer.
pub fn init() -> LogBuffer {
    let buffer = LOG_BUFFER
        .get_or_init(|| Arc::new(Mutex::new(VecDeque::with_capacity(LOG_CAPACITY))))
        .clone();

    let level = level_from_env(std::env::var("RUST_LOG").ok().as_deref());
    let echo_stderr = std::env::var("DUET_LOG_STDERR")
        .map(|value| value != "0")
        .unwrap_or(false);

    let logger = LOGGER.get_or_init(|| SharedLogger {
        level,
        buffer: buffer.clone(),
        echo_stderr,
    });
    if log::set_logger(logger).is_ok() {
        log::set_max_level(level);
    }

    buffer
}

pub fn snapshot(buffer: &LogBuffer) -> Vec<String> {
    buffer.lock().unwrap().iter().cloned().collect()
}

/// Restores the original stderr on drop.
pub struct StderrCaptureGuard {
    original_fd: RawFd,
    stderr_fd: RawFd,
    reader_handle: Option<JoinHandle<()>>,
}

impl Drop for StderrCaptureGuard {
    fn drop(&mut self) {
        unsafe {
            libc::dup2(self.original_fd, self.stderr_fd);
            libc::close(self.original_fd);
        }
        if let Some(handle) = self.reader_handle.take() {
            let _ = handle.join();
        }
    }
}

/// Redirect the process stderr into `buffer` until the guard drops.
///
/// Returns `None` if the pipe could not be set up; stderr is then left
/// untouched.
pub fn capture_stderr(buffer: LogBuffer) -> Option<StderrCaptureGuard> {
    let stderr_fd = std::io::stderr().as_raw_fd();
    let mut fds = [0; 2];
    if unsafe { libc::pipe(fds.as_mut_ptr()) } != 0 {
        return None;
    }
    let (read_fd, write_fd) = (fds[0], fds[1]);

    let original_fd = unsafe { libc::dup(stderr_fd) };
    if original_fd < 0 {
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
        }
        return None;
    }

    if unsafe { libc::dup2(write_fd, stderr_fd) } < 0 {
        unsafe {
            libc::close(read_fd);
            libc::close(write_fd);
            libc::close(original_fd);
        }
        return None;
    }
    unsafe {
        libc::close(write_fd);
    }

    let handle = std::thread::spawn(move || {
        let file = unsafe { std::fs::File::from_raw_fd(read_fd) };
        let mut reader = BufReader::new(file);
        let mut line = String::new();
        loop {
            line.clear();
            match reader.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let trimmed = line.trim_end();
            if !trimmed.is_empty() {
                push_line(&buffer, format!("[STDERR] {}", trimmed));
            }
        }
    });

    Some(StderrCaptureGuard {
        original_fd,
        stderr_fd,
        reader_handle: Some(handle),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_drops_the_oldest_lines() {
        let buffer: LogBuffer = Arc::new(Mutex::new(VecDeque::new()));
        for i in 0..LOG_CAPACITY + 3 {
            push_line(&buffer, format!("line {}", i));
        }
        let lines = snapshot(&buffer);
        assert_eq!(lines.len(), LOG_CAPACITY);
        assert_eq!(lines[0], "line 3");
    }

    #[test]
    fn unknown_levels_fall_back_to_info() {
        assert_eq!(level_from_env(Some("debug")), LevelFilter::Debug);
        assert_eq!(level_from_env(Some("WARN")), LevelFilter::Warn);
        assert_eq!(level_from_env(Some("chatty")), LevelFilter::Info);
        assert_eq!(level_from_env(None), LevelFilter::Info);
    }
}
