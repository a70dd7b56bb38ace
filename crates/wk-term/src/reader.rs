// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Background stdin reader — collects raw bytes from the terminal.
//
// A dedicated thread reads stdin in blocking mode and sends byte chunks
// through a standard channel. The main loop receives chunks with a
// timeout, which is what makes the escape-sequence disambiguation work:
// `recv_timeout` returning empty-handed is the signal that a pending
// lone ESC really was the Escape key.
//
// Shutdown: the reader thread uses `poll()` with a short timeout on
// stdin's file descriptor, checking an `AtomicBool` stop flag between
// polls, so it never stays stuck in a blocking `read()`.

#[cfg(unix)]
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

/// Byte chunk read from stdin.
///
/// A single keypress is 1–6 bytes; 1 KB absorbs even a rapid key burst
/// without a second read.
const READ_BUF_SIZE: usize = 1024;

/// How often the reader thread re-checks the stop flag (milliseconds).
const STOP_POLL_MS: i32 = 50;

/// Background stdin reader thread.
///
/// Spawns a thread that reads raw bytes from stdin and sends them through
/// a channel. The thread runs until [`stop`](Self::stop) is called (or the
/// `StdinReader` is dropped).
pub struct StdinReader {
    /// The reader thread handle. `None` after `stop()` joins it.
    handle: Option<JoinHandle<()>>,
    /// Shared flag to signal the thread to exit.
    stop: Arc<AtomicBool>,
}

impl StdinReader {
    /// Spawn the background reader thread.
    ///
    /// Returns the reader handle and a channel receiver for byte chunks.
    /// Each received `Vec<u8>` is a non-empty chunk of raw stdin data.
    /// The channel closes when the reader is stopped or stdin hits EOF.
    ///
    /// # Panics
    ///
    /// Panics if the OS cannot spawn a new thread (extremely rare).
    #[must_use]
    pub fn spawn() -> (Self, Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                reader_loop(&tx, &stop_flag);
            })
            .expect("failed to spawn stdin reader thread");

        (
            Self {
                handle: Some(handle),
                stop,
            },
            rx,
        )
    }

    /// Signal the reader thread to stop and wait for it to exit.
    ///
    /// Idempotent: calling `stop()` after the thread has already exited
    /// is a no-op.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for StdinReader {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The reader thread's main loop.
///
/// Polls stdin with a short timeout, reads available bytes, and sends
/// them through the channel. Exits when the stop flag is set, stdin
/// reaches EOF, or the receiver is gone.
#[cfg(unix)]
fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::os::unix::io::AsRawFd;

    let stdin_fd = io::stdin().as_raw_fd();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        // Poll stdin for readability with a timeout.
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: stdin_fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&raw mut pfd, 1, STOP_POLL_MS)
        };

        // Timeout or error: loop back to check the stop flag.
        if ready <= 0 {
            continue;
        }

        let n = unsafe { libc::read(stdin_fd, buf.as_mut_ptr().cast(), buf.len()) };

        if n <= 0 {
            // EOF or error — exit the thread.
            break;
        }

        #[allow(clippy::cast_sign_loss)] // n > 0 guaranteed above.
        let chunk = buf[..n as usize].to_vec();

        if tx.send(chunk).is_err() {
            // Receiver dropped — nobody's listening.
            break;
        }
    }
}

/// Non-unix fallback using plain blocking reads.
///
/// Shutdown is less graceful (the thread may block in `read()` until the
/// next keypress), but functional.
#[cfg(not(unix))]
fn reader_loop(tx: &mpsc::Sender<Vec<u8>>, stop: &AtomicBool) {
    use std::io::Read;

    let stdin = std::io::stdin();
    let mut buf = [0u8; READ_BUF_SIZE];

    loop {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        match stdin.lock().read(&mut buf) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
