use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::bir::Bir;
use crate::message::Observer;
use crate::status::EngineError;

/// Index into the template array passed to [`Engine::verify`]; negative means
/// no template matched.
pub type MatchIndex = i32;

/// A device found during enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device string understood by [`Engine::open`], e.g. `usb,#1`.
    pub dsn: String,
}

impl DeviceDescriptor {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self { dsn: dsn.into() }
    }
}

impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dsn)
    }
}

/// Handle of an open device session. Not `Clone`: exactly one owner may
/// close it.
#[derive(Debug, PartialEq, Eq)]
pub struct Connection(NonZeroU32);

impl Connection {
    pub fn new(raw: NonZeroU32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0.get()
    }
}

/// Parameters of an interactive engine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Non-zero ids let another thread cancel the call through the engine.
    pub id: u32,
    /// How long to wait for a finger on the sensor. Zero waits forever.
    pub timeout: Duration,
    /// Deliver observer messages without the engine's pacing delays.
    pub low_latency_callback: bool,
    /// Ask the engine to send frequent idle messages.
    pub use_idle: bool,
}

impl Default for Operation {
    fn default() -> Self {
        Self {
            id: 0,
            timeout: Duration::from_secs(60),
            low_latency_callback: true,
            use_idle: false,
        }
    }
}

/// Release path for records the engine allocated.
pub trait ReleaseBir {
    fn free_bir(&mut self, bir: Bir);
}

/// Capabilities of a biometric engine.
///
/// Interactive calls (`enroll`, `verify`) block until the user acts or the
/// operation times out, reporting progress through `observer`.
pub trait Engine: ReleaseBir {
    fn enumerate_devices(&mut self, transport: &str) -> Result<Vec<DeviceDescriptor>, EngineError>;

    fn open(&mut self, dsn: &str) -> Result<Connection, EngineError>;

    /// On failure the connection is still open and owned by the caller.
    fn close(&mut self, conn: &Connection) -> Result<(), EngineError>;

    /// Capture a finger and build a new template. The result is allocated by
    /// the engine and must come back through [`ReleaseBir::free_bir`].
    fn enroll(
        &mut self,
        conn: &Connection,
        operation: &Operation,
        observer: &mut dyn Observer,
    ) -> Result<Bir, EngineError>;

    /// Capture a finger and match it against a dense list of templates.
    fn verify(
        &mut self,
        conn: &Connection,
        operation: &Operation,
        observer: &mut dyn Observer,
        templates: &[&Bir],
    ) -> Result<MatchIndex, EngineError>;

    /// Compare two stored templates without touching the sensor.
    fn verify_match(
        &mut self,
        conn: Option<&Connection>,
        a: &Bir,
        b: &Bir,
    ) -> Result<bool, EngineError>;
}
