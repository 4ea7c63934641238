#![allow(dead_code)]

use std::cell::Cell;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::rc::Rc;

use fingerset::{
    Bir, Connection, DeviceDescriptor, Engine, EngineError, MatchIndex, Observer, Operation,
    ReleaseBir, SimulatedEngine, Status,
};

/// Engine double that answers with scripted results and counts calls.
pub struct StubEngine {
    pub devices: Vec<DeviceDescriptor>,
    pub match_index: MatchIndex,
    pub compare_result: bool,
    pub fail_close: bool,
    pub verify_calls: usize,
    pub verify_lens: Vec<usize>,
    pub enroll_calls: usize,
    pub compare_calls: usize,
    /// Shared so tests can observe releases after the engine is moved.
    pub freed: Rc<Cell<usize>>,
    pub closed: Rc<Cell<usize>>,
}

impl StubEngine {
    pub fn new() -> Self {
        Self {
            devices: vec![DeviceDescriptor::new("usb,#1")],
            match_index: -1,
            compare_result: false,
            fail_close: false,
            verify_calls: 0,
            verify_lens: Vec::new(),
            enroll_calls: 0,
            compare_calls: 0,
            freed: Rc::default(),
            closed: Rc::default(),
        }
    }

    pub fn answering(match_index: MatchIndex) -> Self {
        Self {
            match_index,
            ..Self::new()
        }
    }

    pub fn engine_calls(&self) -> usize {
        self.verify_calls + self.enroll_calls + self.compare_calls
    }
}

impl ReleaseBir for StubEngine {
    fn free_bir(&mut self, _bir: Bir) {
        self.freed.set(self.freed.get() + 1);
    }
}

impl Engine for StubEngine {
    fn enumerate_devices(&mut self, _transport: &str) -> Result<Vec<DeviceDescriptor>, EngineError> {
        Ok(self.devices.clone())
    }

    fn open(&mut self, _dsn: &str) -> Result<Connection, EngineError> {
        Ok(Connection::new(NonZeroU32::new(7).unwrap()))
    }

    fn close(&mut self, _conn: &Connection) -> Result<(), EngineError> {
        if self.fail_close {
            return Err(EngineError::new(Status::InternalError, 99, "device busy"));
        }
        self.closed.set(self.closed.get() + 1);
        Ok(())
    }

    fn enroll(
        &mut self,
        _conn: &Connection,
        _operation: &Operation,
        _observer: &mut dyn Observer,
    ) -> Result<Bir, EngineError> {
        self.enroll_calls += 1;
        Ok(SimulatedEngine::template(&[self.enroll_calls as u8]))
    }

    fn verify(
        &mut self,
        _conn: &Connection,
        _operation: &Operation,
        _observer: &mut dyn Observer,
        templates: &[&Bir],
    ) -> Result<MatchIndex, EngineError> {
        self.verify_calls += 1;
        self.verify_lens.push(templates.len());
        Ok(self.match_index)
    }

    fn verify_match(
        &mut self,
        _conn: Option<&Connection>,
        _a: &Bir,
        _b: &Bir,
    ) -> Result<bool, EngineError> {
        self.compare_calls += 1;
        Ok(self.compare_result)
    }
}

/// Write a template file with the given payload and return its path.
pub fn write_template(dir: &std::path::Path, name: &str, payload: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, SimulatedEngine::template(payload).as_bytes()).unwrap();
    path
}
