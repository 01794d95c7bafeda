//! The host table: every host's slot behind its own lock, indexed by
//! `HostId`.
//!
//! Only the owning worker locks a slot while a window runs.  The driver
//! thread locks slots between windows for inspection.

use std::sync::{Mutex, MutexGuard};

use des_core::HostId;
use des_host::{Host, HostSlot};

use crate::sync::lock;

pub(crate) struct HostTable<H: Host> {
    slots: Vec<Mutex<HostSlot<H>>>,
}

impl<H: Host> HostTable<H> {
    /// `slots[i]` must be the slot of `HostId(i)`.
    pub(crate) fn new(slots: Vec<HostSlot<H>>) -> Self {
        debug_assert!(slots.iter().enumerate().all(|(i, s)| s.meta.id.index() == i));
        Self { slots: slots.into_iter().map(Mutex::new).collect() }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn lock(&self, host: HostId) -> Option<MutexGuard<'_, HostSlot<H>>> {
        self.slots.get(host.index()).map(lock)
    }
}
