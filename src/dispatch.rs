use fingerset_engine::{Engine, MatchIndex, Observer, Operation};
use log::{debug, info};

use crate::error::Result;
use crate::registry::{Registry, SlotId};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Matched,
    NotMatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyAllOutcome {
    Matched(SlotId),
    NotMatched,
    /// Nothing enrolled; the engine was not called.
    Empty,
}

/// Runs engine verification against the registry's templates and maps the
/// engine's array indices back to slot ids.
pub struct Dispatcher<'a, E: Engine + ?Sized> {
    engine: &'a mut E,
    session: &'a Session,
    registry: &'a Registry,
    operation: &'a Operation,
}

impl<'a, E: Engine + ?Sized> Dispatcher<'a, E> {
    pub fn new(
        engine: &'a mut E,
        session: &'a Session,
        registry: &'a Registry,
        operation: &'a Operation,
    ) -> Self {
        Self {
            engine,
            session,
            registry,
            operation,
        }
    }

    /// Capture a finger and match it against the template in `slot`.
    ///
    /// # Panics
    ///
    /// If the engine answers with an index other than 0 or a negative value.
    pub fn verify_one(&mut self, slot: SlotId, observer: &mut dyn Observer) -> Result<VerifyOutcome> {
        let record = self.registry.get(slot)?;
        let conn = self.session.connection()?;
        let index = self
            .engine
            .verify(conn, self.operation, observer, &[record.bir()])?;
        debug!("verify against slot {} -> index {}", slot, index);
        match index {
            0 => Ok(VerifyOutcome::Matched),
            i if i < 0 => Ok(VerifyOutcome::NotMatched),
            other => contract_violation(other, 1),
        }
    }

    /// Capture a finger and match it against every enrolled template.
    ///
    /// # Panics
    ///
    /// If the engine answers with an index past the end of the template list.
    pub fn verify_all(&mut self, observer: &mut dyn Observer) -> Result<VerifyAllOutcome> {
        let compacted = self.registry.compact();
        if compacted.is_empty() {
            return Ok(VerifyAllOutcome::Empty);
        }
        let conn = self.session.connection()?;
        info!("Matching against {} template(s)", compacted.len());
        let index = self
            .engine
            .verify(conn, self.operation, observer, compacted.records())?;
        if index < 0 {
            return Ok(VerifyAllOutcome::NotMatched);
        }
        match compacted.slot_at(index as usize) {
            Some(slot) => Ok(VerifyAllOutcome::Matched(slot)),
            None => contract_violation(index, compacted.len()),
        }
    }

    /// Compare two enrolled templates directly. Uses the open connection if
    /// there is one; whether the engine needs it is up to the engine.
    pub fn compare(&mut self, a: SlotId, b: SlotId) -> Result<bool> {
        let first = self.registry.get(a)?;
        let second = self.registry.get(b)?;
        let conn = self.session.connection().ok();
        let matched = self.engine.verify_match(conn, first.bir(), second.bir())?;
        debug!("compare {} <-> {}: {}", a, b, matched);
        Ok(matched)
    }
}

fn contract_violation(index: MatchIndex, count: usize) -> ! {
    panic!(
        "engine reported match index {} for {} template(s)",
        index, count
    )
}
