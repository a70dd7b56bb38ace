//! # wk-store — Persistence for wk
//!
//! The board lives in one JSON file. This crate owns reading and writing
//! that file and the calendar arithmetic behind week keys:
//!
//! - **[`Store`]** — load/save with atomic writes (temp file + rename),
//!   so a failed save never corrupts the last good state on disk.
//! - **[`week`]** — ISO week keys: the current week, parsing, and the
//!   previous/next neighbor function.
//!
//! The data directory defaults to `~/.wktasks` and can be overridden with
//! the `WK_DATA_DIR` environment variable (which is also how tests point
//! the binary at a scratch directory).

pub mod week;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use wk_task::model::Board;

/// File name of the board inside the data directory.
const BOARD_FILE: &str = "board.json";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "WK_DATA_DIR";

// ---------------------------------------------------------------------------
// StorageError
// ---------------------------------------------------------------------------

/// Why a load or save failed.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The underlying file could not be read or written.
    #[error("board file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The file exists but does not decode as a board.
    #[error("board file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Handle to the on-disk board file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Store in the default location.
    ///
    /// `$WK_DATA_DIR/board.json` when the variable is set, otherwise
    /// `~/.wktasks/board.json` (falling back to the current directory if
    /// no home directory can be determined).
    #[must_use]
    pub fn open_default() -> Self {
        let dir = std::env::var_os(DATA_DIR_ENV).map_or_else(
            || {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".wktasks")
            },
            PathBuf::from,
        );
        Self::at_dir(dir)
    }

    /// Store inside an explicit data directory.
    #[must_use]
    pub fn at_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(BOARD_FILE),
        }
    }

    /// Path of the board file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the board.
    ///
    /// A missing file is an empty board, not an error — first launch has
    /// nothing on disk yet.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] if the file cannot be read,
    /// [`StorageError::Corrupt`] if it does not decode.
    pub fn load(&self) -> Result<Board, StorageError> {
        if !self.path.exists() {
            return Ok(Board::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save the board.
    ///
    /// Creates the data directory if needed and writes atomically: the
    /// JSON goes to a temp file in the same directory, is synced, and is
    /// renamed over the previous file. A failure anywhere leaves the old
    /// file untouched.
    ///
    /// # Errors
    ///
    /// [`StorageError::Io`] on any filesystem failure,
    /// [`StorageError::Corrupt`] if the board cannot be encoded.
    pub fn save(&self, board: &Board) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(board)?;

        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            // Data must be on disk before the rename makes it current.
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
