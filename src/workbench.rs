use std::path::{Path, PathBuf};

use fingerset_engine::{DeviceDescriptor, Engine, Observer, Operation};
use log::{info, warn};

use crate::dispatch::{Dispatcher, VerifyAllOutcome, VerifyOutcome};
use crate::error::{Error, Result};
use crate::observer::LogObserver;
use crate::record::Record;
use crate::registry::{Registry, SlotId};
use crate::session::Session;
use crate::storage;

/// Owns the engine, the device session and the template set, and runs
/// commands against them one at a time.
///
/// Dropping a workbench releases every template and closes the session.
pub struct Workbench<E: Engine> {
    engine: E,
    session: Session,
    registry: Registry,
    operation: Operation,
    observer: Box<dyn Observer>,
}

impl<E: Engine> Workbench<E> {
    pub fn new(engine: E, operation: Operation) -> Self {
        Self::with_observer(engine, operation, Box::new(LogObserver))
    }

    pub fn with_observer(engine: E, operation: Operation, observer: Box<dyn Observer>) -> Self {
        Self {
            engine,
            session: Session::new(),
            registry: Registry::new(),
            operation,
            observer,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Discover devices on `transport`, pick one and open it.
    pub fn open(&mut self, transport: &str, choice: Option<usize>) -> Result<DeviceDescriptor> {
        if self.session.is_open() {
            return Err(Error::AlreadyOpen);
        }
        let devices = Session::discover(&mut self.engine, transport)?;
        if devices.len() > 1 {
            for (i, device) in devices.iter().enumerate() {
                info!("   {}  {}", i, device);
            }
        }
        let device = Session::select(devices, choice)?;
        self.session.open(&mut self.engine, device.clone())?;
        Ok(device)
    }

    pub fn close(&mut self) -> Result<()> {
        self.session.close(&mut self.engine)
    }

    /// Enroll a new finger into the lowest free slot.
    pub fn enroll(&mut self) -> Result<SlotId> {
        let slot = self.registry.allocate()?;
        let conn = self.session.connection()?;
        let bir = self
            .engine
            .enroll(conn, &self.operation, self.observer.as_mut())?;
        self.registry.place(slot, Record::engine_allocated(bir));
        info!("Enrolled into slot #{}", slot);
        Ok(slot)
    }

    /// Import a template file into the lowest free slot.
    pub fn import(&mut self, path: &Path) -> Result<SlotId> {
        let slot = self.registry.allocate()?;
        let bir = storage::read_template(path)?;
        self.registry.place(slot, Record::imported(bir));
        info!("Imported {} as slot #{}", path.display(), slot);
        Ok(slot)
    }

    /// Import every `*.{extension}` file in `dir`. Unreadable files are
    /// skipped; the scan stops once the set is full.
    pub fn import_dir(&mut self, dir: &Path, extension: &str) -> Result<Vec<(SlotId, PathBuf)>> {
        info!("Looking in {}...", dir.display());
        let mut imported = Vec::new();
        for path in storage::template_files(dir, extension)? {
            match self.import(&path) {
                Ok(slot) => imported.push((slot, path)),
                Err(Error::Full) => {
                    warn!("Template set is full, skipping the rest of {}", dir.display());
                    break;
                }
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(imported)
    }

    /// Write the template in `slot` to `path`. Returns the byte count.
    pub fn export(&self, slot: SlotId, path: &Path) -> Result<usize> {
        let record = self.registry.get(slot)?;
        let written = storage::write_template(record.bir(), path)?;
        info!("Exported slot #{} to {} ({} bytes)", slot, path.display(), written);
        Ok(written)
    }

    pub fn delete(&mut self, slot: SlotId) -> Result<()> {
        self.registry.delete(slot, &mut self.engine)?;
        info!("Deleted slot {}", slot);
        Ok(())
    }

    pub fn delete_all(&mut self) -> usize {
        self.registry.delete_all(&mut self.engine)
    }

    pub fn list(&self) -> impl Iterator<Item = SlotId> + Clone + '_ {
        self.registry.list()
    }

    pub fn verify(&mut self, slot: SlotId) -> Result<VerifyOutcome> {
        Dispatcher::new(&mut self.engine, &self.session, &self.registry, &self.operation)
            .verify_one(slot, self.observer.as_mut())
    }

    pub fn verify_all(&mut self) -> Result<VerifyAllOutcome> {
        Dispatcher::new(&mut self.engine, &self.session, &self.registry, &self.operation)
            .verify_all(self.observer.as_mut())
    }

    pub fn compare(&mut self, a: SlotId, b: SlotId) -> Result<bool> {
        Dispatcher::new(&mut self.engine, &self.session, &self.registry, &self.operation)
            .compare(a, b)
    }

    pub fn save_snapshot(&self, path: &Path) -> Result<usize> {
        storage::save_snapshot(&self.registry, path)
    }

    /// Install a snapshot's templates into their original slots. Either all
    /// of them are installed or none.
    pub fn restore_snapshot(&mut self, path: &Path) -> Result<Vec<SlotId>> {
        let entries = storage::load_snapshot(path)?;
        let mut claimed = Vec::with_capacity(entries.len());
        for (slot, _) in &entries {
            if self.registry.is_occupied(*slot) || claimed.contains(slot) {
                return Err(Error::SlotOccupied(*slot));
            }
            claimed.push(*slot);
        }
        for (slot, bir) in entries {
            self.registry.place(slot, Record::imported(bir));
        }
        info!("Restored {} template(s) from {}", claimed.len(), path.display());
        Ok(claimed)
    }

    /// Release every template and close the session if it is open.
    pub fn shutdown(&mut self) -> Result<()> {
        self.delete_all();
        if self.session.is_open() {
            self.close()?;
        }
        Ok(())
    }
}

impl<E: Engine> Drop for Workbench<E> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!("closing session on drop: {}", e);
        }
    }
}
