use fingerset_engine::{Connection, DeviceDescriptor, Engine};
use log::{debug, info};

use crate::error::{Error, Result};

/// Connection state. There is no `Open -> Open` transition.
#[derive(Debug, Default)]
pub enum SessionState {
    #[default]
    Closed,
    Open {
        device: DeviceDescriptor,
        conn: Connection,
    },
}

/// Owner of the single device connection.
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the engine which devices are reachable over `transport`.
    pub fn discover<E: Engine + ?Sized>(
        engine: &mut E,
        transport: &str,
    ) -> Result<Vec<DeviceDescriptor>> {
        let devices = engine.enumerate_devices(transport)?;
        debug!("{} device(s) on '{}'", devices.len(), transport);
        Ok(devices)
    }

    /// Pick the device to open. A single device is taken as is; several need
    /// an explicit `choice`.
    pub fn select(
        mut devices: Vec<DeviceDescriptor>,
        choice: Option<usize>,
    ) -> Result<DeviceDescriptor> {
        let count = devices.len();
        match (count, choice) {
            (0, _) => Err(Error::NoneFound),
            (1, None) => Ok(devices.remove(0)),
            (_, None) => Err(Error::AmbiguousChoice { count }),
            (_, Some(index)) if index < count => Ok(devices.swap_remove(index)),
            (_, Some(index)) => Err(Error::NoSuchDevice { index, count }),
        }
    }

    pub fn open<E: Engine + ?Sized>(&mut self, engine: &mut E, device: DeviceDescriptor) -> Result<()> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        info!("Opening device '{}'...", device);
        let conn = engine.open(&device.dsn)?;
        self.state = SessionState::Open { device, conn };
        Ok(())
    }

    /// Close the connection. On engine failure the session stays open.
    pub fn close<E: Engine + ?Sized>(&mut self, engine: &mut E) -> Result<()> {
        let SessionState::Open { device, conn } = &self.state else {
            return Err(Error::NotOpen);
        };
        engine.close(conn)?;
        info!("Closed device '{}'", device);
        self.state = SessionState::Closed;
        Ok(())
    }

    pub fn connection(&self) -> Result<&Connection> {
        match &self.state {
            SessionState::Open { conn, .. } => Ok(conn),
            SessionState::Closed => Err(Error::NotOpen),
        }
    }

    pub fn device(&self) -> Option<&DeviceDescriptor> {
        match &self.state {
            SessionState::Open { device, .. } => Some(device),
            SessionState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fingerset_engine::{SimulatedEngine, Status};

    fn devices(names: &[&str]) -> Vec<DeviceDescriptor> {
        names.iter().map(|n| DeviceDescriptor::new(*n)).collect()
    }

    #[test]
    fn select_by_device_count() {
        assert!(matches!(Session::select(vec![], None), Err(Error::NoneFound)));
        assert!(matches!(Session::select(vec![], Some(0)), Err(Error::NoneFound)));

        let one = Session::select(devices(&["usb,#1"]), None).unwrap();
        assert_eq!(one.dsn, "usb,#1");

        let two = devices(&["usb,#1", "usb,#2"]);
        assert!(matches!(
            Session::select(two.clone(), None),
            Err(Error::AmbiguousChoice { count: 2 })
        ));
        assert_eq!(Session::select(two.clone(), Some(1)).unwrap().dsn, "usb,#2");
        assert!(matches!(
            Session::select(two, Some(2)),
            Err(Error::NoSuchDevice { index: 2, count: 2 })
        ));
    }

    #[test]
    fn open_twice_is_rejected() {
        let mut engine = SimulatedEngine::single_usb();
        let mut session = Session::new();
        session.open(&mut engine, DeviceDescriptor::new("usb,#1")).unwrap();
        assert!(matches!(
            session.open(&mut engine, DeviceDescriptor::new("usb,#1")),
            Err(Error::AlreadyOpen)
        ));
        assert_eq!(engine.open_sessions(), 1);
        assert_eq!(session.device().map(|d| d.dsn.as_str()), Some("usb,#1"));
    }

    #[test]
    fn close_requires_open_session() {
        let mut engine = SimulatedEngine::single_usb();
        let mut session = Session::new();
        assert!(matches!(session.close(&mut engine), Err(Error::NotOpen)));

        session.open(&mut engine, DeviceDescriptor::new("usb,#1")).unwrap();
        session.close(&mut engine).unwrap();
        assert!(!session.is_open());
        assert!(matches!(session.close(&mut engine), Err(Error::NotOpen)));
        assert!(matches!(session.connection(), Err(Error::NotOpen)));
    }

    #[test]
    fn failed_open_leaves_session_closed() {
        let mut engine = SimulatedEngine::single_usb();
        let mut session = Session::new();
        let err = session
            .open(&mut engine, DeviceDescriptor::new("usb,#7"))
            .unwrap_err();
        assert!(matches!(err, Error::Engine(e) if e.status == Status::NoSuchDevice));
        assert!(!session.is_open());
    }
}
