// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop — the heartbeat of the application.
//
// Stdin bytes flow in from the background reader, get parsed into key
// events, the application handles them, paints a frame buffer, and the
// diff renderer outputs only what changed. One loop, one suspension
// point: the channel receive.
//
// # The Hybrid Timeout Model
//
// The loop blocks on the stdin channel with an 8.3ms timeout. This gives
// three behaviors in one:
//
//   1. **Instant response**: typed bytes arrive on the channel
//      immediately — no polling latency.
//
//   2. **Zero CPU idle**: `recv_timeout` blocks the thread; the OS
//      schedules us out.
//
//   3. **Escape disambiguation**: when the timeout fires with a lone ESC
//      pending in the parser, that ESC was a real Escape keypress —
//      `flush()` resolves it. The user experiences at most 8.3ms of lag
//      on Escape, which is imperceptible.
//
// # SIGWINCH Handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The loop checks the flag each iteration and triggers a
// full redraw at the new size.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::time::Duration;

use crate::ansi;
use crate::buffer::FrameBuffer;
use crate::diff::DiffRenderer;
use crate::input::{KeyEvent, Parser};
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked each loop iteration.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler simply sets the [`SIGWINCH_RECEIVED`] flag — writing an
/// atomic is one of the few operations permitted inside signal handlers.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    // No-op on non-unix platforms.
}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Implement this trait to create a terminal application. The event loop
/// calls your methods in this order each frame:
///
/// 1. [`on_key`](App::on_key) — for each parsed key event
/// 2. [`on_resize`](App::on_resize) — when the terminal size changes
/// 3. [`paint`](App::paint) — when the frame is dirty and needs redrawing
/// 4. [`cursor`](App::cursor) — after paint, to position the hardware cursor
///
/// Only [`paint`](App::paint) is required.
pub trait App {
    /// Handle a parsed key event.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, _key: &KeyEvent) -> Action {
        Action::Continue
    }

    /// Handle terminal resize.
    ///
    /// Called with the new terminal dimensions. The frame buffer has
    /// already been resized before this is called.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the current application state to the frame buffer.
    ///
    /// Called only when the frame is dirty (input arrived or the terminal
    /// was resized). The buffer has been cleared before this call — paint
    /// everything you want visible.
    ///
    /// Takes `&mut self` so the application can update render state
    /// (e.g., store the computed cursor screen position for [`cursor`]).
    fn paint(&mut self, buf: &mut FrameBuffer);

    /// The terminal cursor position and shape after painting.
    ///
    /// Return `Some((x, y, shape))` to show the hardware cursor at the
    /// given screen position, or `None` to keep it hidden. Called after
    /// every [`paint`].
    fn cursor(&self) -> Option<(u16, u16, ansi::CursorShape)> {
        None
    }
}

// ─── Loop Config ─────────────────────────────────────────────────────────────

/// Configuration for the event loop timing.
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Timeout for the channel `recv_timeout` call (microseconds).
    ///
    /// This doubles as the escape-sequence disambiguation timeout.
    /// Default: 8333μs.
    pub tick_interval_us: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval_us: 8333,
        }
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal, parser, renderer, and stdin reader. Call
/// [`run`](Self::run) to enter the loop — it returns when the application
/// signals [`Action::Quit`].
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: DiffRenderer,
    config: LoopConfig,
}

impl EventLoop {
    /// Create a new event loop with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn new() -> io::Result<Self> {
        Self::with_config(LoopConfig::default())
    }

    /// Create a new event loop with custom timing configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be initialized.
    pub fn with_config(config: LoopConfig) -> io::Result<Self> {
        Ok(Self {
            terminal: Terminal::new()?,
            parser: Parser::new(),
            renderer: DiffRenderer::new(),
            config,
        })
    }

    /// The current terminal size.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// This method:
    /// 1. Enters TUI mode (raw mode, alternate screen)
    /// 2. Installs the SIGWINCH handler
    /// 3. Spawns the background stdin reader
    /// 4. Runs the hybrid receive/timeout loop
    /// 5. Restores the terminal on exit (even on error)
    ///
    /// # Errors
    ///
    /// Returns an error if terminal enter/leave or rendering fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();

        let (mut reader, rx) = StdinReader::spawn();

        let result = self.run_inner(app, &rx);

        // Always clean up, even if the loop errored.
        reader.stop();
        self.terminal.leave()?;

        result
    }

    /// The inner loop, separated so cleanup runs regardless of outcome.
    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = FrameBuffer::new(size.cols, size.rows);
        let mut dirty = true; // First frame always renders.
        let timeout = Duration::from_micros(self.config.tick_interval_us);

        loop {
            // ── Receive stdin bytes ──────────────────────────────
            match rx.recv_timeout(timeout) {
                Ok(bytes) => {
                    let events = self.parser.advance(&bytes);
                    for event in &events {
                        if app.on_key(event) == Action::Quit {
                            return Ok(());
                        }
                    }
                    if !events.is_empty() {
                        dirty = true;
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                    // Resolve pending escape sequences (lone ESC → Escape).
                    if self.parser.has_pending() {
                        let events = self.parser.flush();
                        for event in &events {
                            if app.on_key(event) == Action::Quit {
                                return Ok(());
                            }
                        }
                        if !events.is_empty() {
                            dirty = true;
                        }
                    }
                }
                Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                    // Reader thread died — exit gracefully.
                    return Ok(());
                }
            }

            // ── Check for terminal resize ────────────────────────
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let new_size = self.terminal.refresh_size();
                frame.resize(new_size.cols, new_size.rows);
                self.renderer.force_redraw();
                app.on_resize(new_size);
                dirty = true;
            }

            // ── Render if dirty ──────────────────────────────────
            if dirty {
                frame.clear();
                app.paint(&mut frame);
                self.renderer.render(&frame);
                self.renderer.flush()?;

                // Position the hardware cursor after frame output.
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                if let Some((x, y, shape)) = app.cursor() {
                    ansi::cursor_to(&mut lock, x, y)?;
                    ansi::set_cursor_shape(&mut lock, shape)?;
                    ansi::cursor_show(&mut lock)?;
                } else {
                    ansi::cursor_hide(&mut lock)?;
                }
                lock.flush()?;

                dirty = false;
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── LoopConfig ──────────────────────────────────────────────

    #[test]
    fn default_config_timeout() {
        let config = LoopConfig::default();
        assert_eq!(config.tick_interval_us, 8333);
    }

    // ── Action ──────────────────────────────────────────────────

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    // ── EventLoop construction ─────────────────────────────────

    #[test]
    fn event_loop_new_succeeds() {
        let event_loop = EventLoop::new().unwrap();
        let size = event_loop.size();
        assert!(size.cols > 0);
        assert!(size.rows > 0);
    }

    #[test]
    fn event_loop_with_custom_config() {
        let config = LoopConfig {
            tick_interval_us: 16667,
        };
        let event_loop = EventLoop::with_config(config).unwrap();
        assert_eq!(event_loop.config.tick_interval_us, 16667);
    }

    // ── SIGWINCH flag ──────────────────────────────────────────

    #[test]
    fn sigwinch_flag_swap() {
        SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
        let was = SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed);
        assert!(was);
        assert!(!SIGWINCH_RECEIVED.load(Ordering::Relaxed));
    }

    // ── App trait defaults ─────────────────────────────────────

    struct MinimalApp;
    impl App for MinimalApp {
        fn paint(&mut self, _buf: &mut FrameBuffer) {}
    }

    #[test]
    fn app_default_on_key_continues() {
        let mut app = MinimalApp;
        let key = KeyEvent::plain(crate::input::KeyCode::Char('x'));
        assert_eq!(app.on_key(&key), Action::Continue);
    }

    #[test]
    fn app_default_on_resize_is_noop() {
        let mut app = MinimalApp;
        app.on_resize(Size { cols: 100, rows: 50 }); // Must not panic.
    }

    #[test]
    fn app_default_cursor_is_none() {
        let app = MinimalApp;
        assert!(app.cursor().is_none());
    }

    #[test]
    fn paint_receives_sized_buffer() {
        struct CheckSize;
        impl App for CheckSize {
            fn paint(&mut self, buf: &mut FrameBuffer) {
                assert!(buf.width() > 0);
                assert!(buf.height() > 0);
            }
        }
        let mut app = CheckSize;
        let mut buf = FrameBuffer::new(80, 24);
        app.paint(&mut buf);
    }
}
