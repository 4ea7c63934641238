use std::path::PathBuf;

use fingerset_engine::{BirError, EngineError};

use crate::registry::SlotId;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("the template set is full")]
    Full,

    #[error("slot {0} is not enrolled")]
    NotEnrolled(SlotId),

    #[error("no such slot: {0}")]
    NoSuchSlot(usize),

    #[error("slot {0} is already enrolled")]
    SlotOccupied(SlotId),

    #[error("the session is already open")]
    AlreadyOpen,

    #[error("no session is open")]
    NotOpen,

    #[error("no fingerprint device found")]
    NoneFound,

    #[error("{count} devices found, a choice is required")]
    AmbiguousChoice { count: usize },

    #[error("no such device: {index} (found {count})")]
    NoSuchDevice { index: usize, count: usize },

    #[error("engine call failed: {0}")]
    Engine(#[from] EngineError),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a valid template: {source}", .path.display())]
    InvalidTemplate {
        path: PathBuf,
        #[source]
        source: BirError,
    },

    #[error("template snapshot: {0}")]
    Snapshot(#[from] postcard::Error),

    #[error("template snapshot has version {found}, expected {expected}")]
    SnapshotVersion { found: u8, expected: u8 },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
