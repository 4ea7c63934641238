pub mod bir;
pub mod engine;
pub mod message;
pub mod sim;
pub mod status;

// Re-export commonly used types
pub use bir::{Bir, BirError, BirHeader};
pub use engine::{Connection, DeviceDescriptor, Engine, MatchIndex, Operation, ReleaseBir};
pub use message::{Message, MessageKind, NullObserver, Observer, Quality};
pub use sim::SimulatedEngine;
pub use status::{EngineError, Status};
