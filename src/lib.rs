pub mod config;
pub mod dispatch;
pub mod error;
pub mod observer;
pub mod record;
pub mod registry;
pub mod session;
pub mod storage;
pub mod workbench;

pub use dispatch::{Dispatcher, VerifyAllOutcome, VerifyOutcome};
pub use error::{Error, Result};
pub use observer::LogObserver;
pub use record::{Origin, Record};
pub use registry::{Compacted, Registry, SlotId, CAPACITY};
pub use session::Session;
pub use workbench::Workbench;

// Re-export engine types for convenience
pub use fingerset_engine::{
    Bir, BirHeader, Connection, DeviceDescriptor, Engine, EngineError, MatchIndex, Message,
    NullObserver, Observer, Operation, ReleaseBir, SimulatedEngine, Status,
};
