//! Software engine with no sensor behind it.
//!
//! The "finger on the sensor" is a payload set with [`SimulatedEngine::present`].
//! Enrollment wraps it into a new template; verification and comparison
//! match templates by payload equality.

use std::num::NonZeroU32;

use log::debug;

use crate::bir::{Bir, BirHeader};
use crate::engine::{Connection, DeviceDescriptor, Engine, MatchIndex, Operation, ReleaseBir};
use crate::message::{Message, Observer};
use crate::status::{EngineError, Status};

const SIM_HEADER: BirHeader = BirHeader {
    length: 0,
    header_version: 1,
    bir_type: 4,
    format_owner: 0x0012,
    format_id: 1,
    quality: -1,
    purpose: 3,
    factors_mask: 0x08,
};

const ENROLL_SWIPES: u8 = 3;

pub struct SimulatedEngine {
    devices: Vec<DeviceDescriptor>,
    open: Vec<(u32, String)>,
    next_handle: u32,
    probe: Option<Vec<u8>>,
    allocated: usize,
    freed: usize,
}

impl SimulatedEngine {
    pub fn new(devices: Vec<DeviceDescriptor>) -> Self {
        Self {
            devices,
            open: Vec::new(),
            next_handle: 1,
            probe: None,
            allocated: 0,
            freed: 0,
        }
    }

    /// One device on the usb transport.
    pub fn single_usb() -> Self {
        Self::new(vec![DeviceDescriptor::new("usb,#1")])
    }

    /// Put a finger with the given payload on the sensor.
    pub fn present(&mut self, payload: impl Into<Vec<u8>>) {
        self.probe = Some(payload.into());
    }

    pub fn lift(&mut self) {
        self.probe = None;
    }

    /// Build a template the way enrollment would, without counting it as
    /// engine-allocated.
    pub fn template(payload: &[u8]) -> Bir {
        Bir::with_payload(SIM_HEADER, payload)
    }

    /// Engine-allocated templates not yet returned through `free_bir`.
    pub fn live_birs(&self) -> usize {
        self.allocated.saturating_sub(self.freed)
    }

    pub fn freed_birs(&self) -> usize {
        self.freed
    }

    pub fn open_sessions(&self) -> usize {
        self.open.len()
    }

    fn check(&self, conn: &Connection) -> Result<(), EngineError> {
        if self.open.iter().any(|(h, _)| *h == conn.raw()) {
            Ok(())
        } else {
            Err(EngineError::new(
                Status::InvalidHandle,
                conn.raw(),
                "connection is not open",
            ))
        }
    }

    /// Runs the common prompt sequence and returns the probe payload.
    fn capture(
        &self,
        operation: &Operation,
        observer: &mut dyn Observer,
        swipes: u8,
    ) -> Result<Vec<u8>, EngineError> {
        observer.notify(operation, &Message::ProcessBegin);
        let result = match &self.probe {
            Some(probe) => {
                for swipe in 1..=swipes {
                    observer.notify(operation, &Message::PromptScan);
                    let pct = (u32::from(swipe) * 100 / u32::from(swipes)) as u8;
                    observer.notify(operation, &Message::ProcessProgress(Some(pct)));
                }
                observer.notify(operation, &Message::ProcessSuccess);
                Ok(probe.clone())
            }
            None => {
                observer.notify(operation, &Message::PromptScan);
                observer.notify(operation, &Message::ProcessFailure);
                Err(EngineError::new(
                    Status::Timeout,
                    0,
                    format!("no finger presented within {:?}", operation.timeout),
                ))
            }
        };
        observer.notify(operation, &Message::ProcessEnd);
        result
    }
}

impl ReleaseBir for SimulatedEngine {
    fn free_bir(&mut self, bir: Bir) {
        debug!("releasing engine template of {} bytes", bir.len());
        self.freed += 1;
    }
}

impl Engine for SimulatedEngine {
    fn enumerate_devices(&mut self, transport: &str) -> Result<Vec<DeviceDescriptor>, EngineError> {
        if transport.is_empty() {
            return Err(EngineError::new(
                Status::InvalidParameter,
                0,
                "empty transport name",
            ));
        }
        let prefix = format!("{},", transport);
        Ok(self
            .devices
            .iter()
            .filter(|d| d.dsn.starts_with(&prefix) || d.dsn == transport)
            .cloned()
            .collect())
    }

    fn open(&mut self, dsn: &str) -> Result<Connection, EngineError> {
        if !self.devices.iter().any(|d| d.dsn == dsn) {
            return Err(EngineError::new(
                Status::NoSuchDevice,
                0,
                format!("no device matches '{}'", dsn),
            ));
        }
        if self.open.iter().any(|(_, d)| d == dsn) {
            return Err(EngineError::new(
                Status::AlreadyOpened,
                0,
                format!("'{}' is already open", dsn),
            ));
        }
        let raw = NonZeroU32::new(self.next_handle).ok_or_else(|| {
            EngineError::new(Status::InternalError, 0, "handle counter wrapped")
        })?;
        self.next_handle = self.next_handle.wrapping_add(1);
        self.open.push((raw.get(), dsn.to_string()));
        debug!("opened '{}' as handle {}", dsn, raw);
        Ok(Connection::new(raw))
    }

    fn close(&mut self, conn: &Connection) -> Result<(), EngineError> {
        self.check(conn)?;
        self.open.retain(|(h, _)| *h != conn.raw());
        Ok(())
    }

    fn enroll(
        &mut self,
        conn: &Connection,
        operation: &Operation,
        observer: &mut dyn Observer,
    ) -> Result<Bir, EngineError> {
        self.check(conn)?;
        let payload = self.capture(operation, observer, ENROLL_SWIPES)?;
        self.allocated += 1;
        Ok(Self::template(&payload))
    }

    fn verify(
        &mut self,
        conn: &Connection,
        operation: &Operation,
        observer: &mut dyn Observer,
        templates: &[&Bir],
    ) -> Result<MatchIndex, EngineError> {
        self.check(conn)?;
        if templates.is_empty() {
            return Err(EngineError::new(
                Status::InvalidParameter,
                0,
                "empty template list",
            ));
        }
        let payload = self.capture(operation, observer, 1)?;
        Ok(templates
            .iter()
            .position(|t| t.payload() == payload.as_slice())
            .map(|i| i as MatchIndex)
            .unwrap_or(-1))
    }

    fn verify_match(
        &mut self,
        conn: Option<&Connection>,
        a: &Bir,
        b: &Bir,
    ) -> Result<bool, EngineError> {
        if let Some(conn) = conn {
            self.check(conn)?;
        }
        Ok(a.payload() == b.payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::NullObserver;

    #[test]
    fn enumerates_by_transport() {
        let mut engine = SimulatedEngine::new(vec![
            DeviceDescriptor::new("usb,#1"),
            DeviceDescriptor::new("usb,#2"),
            DeviceDescriptor::new("serial,#1"),
        ]);
        assert_eq!(engine.enumerate_devices("usb").unwrap().len(), 2);
        assert_eq!(engine.enumerate_devices("bt").unwrap().len(), 0);
        assert_eq!(
            engine.enumerate_devices("").unwrap_err().status,
            Status::InvalidParameter
        );
    }

    #[test]
    fn enroll_then_verify_finds_the_same_finger() {
        env_logger::try_init().ok();
        let mut engine = SimulatedEngine::single_usb();
        let conn = engine.open("usb,#1").unwrap();
        let op = Operation::default();
        engine.present(b"left-index".to_vec());

        let enrolled = engine.enroll(&conn, &op, &mut NullObserver).unwrap();
        let other = SimulatedEngine::template(b"right-thumb");
        assert_eq!(engine.live_birs(), 1);

        let idx = engine
            .verify(&conn, &op, &mut NullObserver, &[&other, &enrolled])
            .unwrap();
        assert_eq!(idx, 1);

        engine.present(b"pinky".to_vec());
        let idx = engine
            .verify(&conn, &op, &mut NullObserver, &[&other, &enrolled])
            .unwrap();
        assert_eq!(idx, -1);

        engine.free_bir(enrolled);
        assert_eq!(engine.live_birs(), 0);
        engine.close(&conn).unwrap();
    }

    #[test]
    fn missing_finger_times_out_with_events() {
        env_logger::try_init().ok();
        let mut engine = SimulatedEngine::single_usb();
        let conn = engine.open("usb,#1").unwrap();
        let mut seen = Vec::new();
        let mut observer = |_: &Operation, m: &Message| seen.push(*m);
        let err = engine
            .enroll(&conn, &Operation::default(), &mut observer)
            .unwrap_err();
        assert_eq!(err.status, Status::Timeout);
        assert_eq!(seen.first(), Some(&Message::ProcessBegin));
        assert_eq!(seen.last(), Some(&Message::ProcessEnd));
        assert!(seen.contains(&Message::ProcessFailure));
    }

    #[test]
    fn double_open_and_stale_close_are_rejected() {
        env_logger::try_init().ok();
        let mut engine = SimulatedEngine::single_usb();
        let conn = engine.open("usb,#1").unwrap();
        assert_eq!(
            engine.open("usb,#1").unwrap_err().status,
            Status::AlreadyOpened
        );
        engine.close(&conn).unwrap();
        assert_eq!(engine.close(&conn).unwrap_err().status, Status::InvalidHandle);
        assert_eq!(engine.open("usb,#9").unwrap_err().status, Status::NoSuchDevice);
    }
}
