//! Registry sharing one writer per collector endpoint.
//!
//! Several outputs pointed at the same collector reuse a single connection.
//! The registry is an ordinary value owned by the host wiring code.

use std::{collections::HashMap, sync::Arc};

use log::warn;
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::syslog::{Endpoint, SyslogConfig, SyslogError, SyslogWriter};

type Slot = Arc<OnceCell<Arc<SyslogWriter>>>;

/// Endpoints map to slots that are filled by the first successful dial.
/// Dialing happens outside the map lock, so a slow collector only blocks
/// callers waiting on that same endpoint.
#[derive(Default)]
pub struct ConnectionRegistry {
    slots: RwLock<HashMap<Endpoint, Slot>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the writer for `config`'s endpoint, dialing it on first use.
    ///
    /// The first caller's timeouts win; concurrent callers for the same
    /// endpoint wait for its dial and share the writer. A failed dial
    /// leaves nothing behind, so the next caller dials again.
    pub fn get_or_dial(&self, config: &SyslogConfig) -> Result<Arc<SyslogWriter>, SyslogError> {
        let endpoint = config.endpoint()?;
        let slot = self.slot(&endpoint);
        let dialed = slot.get_or_try_init(|| {
            SyslogWriter::dial_endpoint(endpoint.clone(), config).map(Arc::new)
        });
        match dialed {
            Ok(writer) => Ok(Arc::clone(writer)),
            Err(err) => {
                self.discard_empty(&endpoint, &slot);
                Err(err.into())
            }
        }
    }

    fn slot(&self, endpoint: &Endpoint) -> Slot {
        if let Some(slot) = self.slots.read().get(endpoint) {
            return Arc::clone(slot);
        }
        Arc::clone(self.slots.write().entry(endpoint.clone()).or_default())
    }

    fn discard_empty(&self, endpoint: &Endpoint, slot: &Slot) {
        let mut slots = self.slots.write();
        let stale = slots
            .get(endpoint)
            .is_some_and(|current| Arc::ptr_eq(current, slot) && current.get().is_none());
        if stale {
            slots.remove(endpoint);
        }
    }

    pub fn get(&self, endpoint: &Endpoint) -> Option<Arc<SyslogWriter>> {
        self.slots.read().get(endpoint)?.get().cloned()
    }

    /// Forget the writer for `endpoint`; existing handles keep working.
    pub fn remove(&self, endpoint: &Endpoint) -> Option<Arc<SyslogWriter>> {
        self.slots.write().remove(endpoint)?.get().cloned()
    }

    /// Number of endpoints with a connected writer.
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.get().is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Close every registered writer and empty the registry.
    pub fn close_all(&self) {
        let slots: Vec<_> = self.slots.write().drain().collect();
        for (endpoint, slot) in slots {
            let Some(writer) = slot.get() else { continue };
            if let Err(err) = writer.close() {
                warn!("syslog: closing {endpoint} failed: {err}");
            }
        }
    }
}
