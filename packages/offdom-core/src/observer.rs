use log::trace;

use crate::ids::{NodeId, ObserverId};
use crate::record::MutationRecord;
use crate::tree::Document;

/// Single-method capability implemented by anything that can receive a batch
/// of mutation records. Blanket-implemented for closures so hosts and tests
/// can pass a plain `FnMut`.
///
/// The callback receives the document so it can mutate the tree or disconnect
/// observers from inside a delivery; edits made this way are queued for the
/// next delivery cycle, never folded into the one running.
pub trait MutationCallback {
    fn deliver(&mut self, document: &mut Document, records: Vec<MutationRecord>);
}

impl<F> MutationCallback for F
where
    F: FnMut(&mut Document, Vec<MutationRecord>),
{
    fn deliver(&mut self, document: &mut Document, records: Vec<MutationRecord>) {
        self(document, records)
    }
}

/// Handle returned by [`Document::observe`], consumed by the lifecycle calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ObserverHandle {
    id: ObserverId,
}

impl ObserverHandle {
    pub fn id(&self) -> ObserverId {
        self.id
    }
}

struct Registration {
    id: ObserverId,
    target: NodeId,
    /// Empty only while this observer's callback is being delivered.
    callback: Option<Box<dyn MutationCallback>>,
    queue: Vec<MutationRecord>,
}

/// Insertion-ordered table of active registrations, owned by the document.
/// Each registration binds one callback to one target node and carries its
/// own pending-record queue.
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    registrations: Vec<Registration>,
    next_observer: u64,
}

impl ObserverRegistry {
    pub(crate) fn observe(
        &mut self,
        target: NodeId,
        callback: Box<dyn MutationCallback>,
    ) -> ObserverHandle {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.registrations.push(Registration {
            id,
            target,
            callback: Some(callback),
            queue: Vec::new(),
        });
        trace!("observer {:?} registered on {:?}", id, target);
        ObserverHandle { id }
    }

    /// Re-target an existing registration. Pending records are untouched; a
    /// disconnected handle is ignored.
    pub(crate) fn reobserve(&mut self, handle: ObserverHandle, target: NodeId) {
        if let Some(reg) = self.find_mut(handle.id) {
            trace!("observer {:?} re-targeted to {:?}", reg.id, target);
            reg.target = target;
        }
    }

    /// Remove a registration and discard its pending records. Disconnecting
    /// an already-disconnected handle is a no-op.
    pub(crate) fn disconnect(&mut self, handle: ObserverHandle) {
        self.registrations.retain(|reg| reg.id != handle.id);
    }

    pub(crate) fn take_records(&mut self, handle: ObserverHandle) -> Vec<MutationRecord> {
        self.find_mut(handle.id)
            .map(|reg| std::mem::take(&mut reg.queue))
            .unwrap_or_default()
    }

    /// Fan a record out to every registration whose target is the record's
    /// target. Returns whether any queue grew.
    pub(crate) fn enqueue(&mut self, record: &MutationRecord) -> bool {
        let mut appended = false;
        for reg in &mut self.registrations {
            if reg.target == record.target {
                reg.queue.push(record.clone());
                appended = true;
            }
        }
        appended
    }

    /// Observers with records to deliver, in registration order.
    pub(crate) fn due(&self) -> Vec<ObserverId> {
        self.registrations
            .iter()
            .filter(|reg| !reg.queue.is_empty())
            .map(|reg| reg.id)
            .collect()
    }

    pub(crate) fn any_pending(&self) -> bool {
        self.registrations.iter().any(|reg| !reg.queue.is_empty())
    }

    /// Atomically take an observer's callback and full pending queue for one
    /// delivery. Returns `None` when the observer disconnected or drained in
    /// the meantime: a callback is never invoked with an empty sequence.
    pub(crate) fn begin_delivery(
        &mut self,
        id: ObserverId,
    ) -> Option<(Box<dyn MutationCallback>, Vec<MutationRecord>)> {
        let reg = self.registrations.iter_mut().find(|reg| reg.id == id)?;
        if reg.queue.is_empty() {
            return None;
        }
        let callback = reg.callback.take()?;
        let records = std::mem::take(&mut reg.queue);
        Some((callback, records))
    }

    /// Restore a callback after its delivery call, unless the observer
    /// disconnected from inside the callback.
    pub(crate) fn finish_delivery(&mut self, id: ObserverId, callback: Box<dyn MutationCallback>) {
        if let Some(reg) = self.find_mut(id) {
            if reg.callback.is_none() {
                reg.callback = Some(callback);
            }
        }
    }

    fn find_mut(&mut self, id: ObserverId) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|reg| reg.id == id)
    }
}
