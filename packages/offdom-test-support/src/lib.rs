#![forbid(unsafe_code)]
//! Shared helpers for the mutation observation suites: canonical testing
//! document construction and a cloneable sink for delivered record batches.

use std::cell::RefCell;
use std::rc::Rc;

use offdom_core::{Document, MutationRecord, NodeId};

/// A document with a `body` element attached, the fixture every observation
/// scenario starts from. Construction happens before any observer exists, so
/// the setup itself schedules no delivery.
pub struct TestingDocument {
    pub document: Document,
    pub body: NodeId,
}

pub fn testing_document() -> TestingDocument {
    let mut document = Document::new();
    let body = document.create_element("body");
    document
        .append_child(NodeId::DOCUMENT, body)
        .expect("append body to document root");
    TestingDocument { document, body }
}

/// Cloneable sink recording every delivered batch in delivery order. Shared
/// between the test body and the callback; single-threaded only.
#[derive(Clone, Default)]
pub struct RecordLog {
    batches: Rc<RefCell<Vec<Vec<MutationRecord>>>>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback that appends each delivered batch to this log.
    pub fn callback(&self) -> impl FnMut(&mut Document, Vec<MutationRecord>) + 'static {
        let batches = Rc::clone(&self.batches);
        move |_document: &mut Document, records: Vec<MutationRecord>| {
            batches.borrow_mut().push(records);
        }
    }

    /// Append a batch from a hand-written callback that does more than log.
    pub fn push_batch(&self, records: Vec<MutationRecord>) {
        self.batches.borrow_mut().push(records);
    }

    /// All delivered batches so far.
    pub fn batches(&self) -> Vec<Vec<MutationRecord>> {
        self.batches.borrow().clone()
    }

    /// Number of callback invocations observed.
    pub fn batch_count(&self) -> usize {
        self.batches.borrow().len()
    }

    /// All delivered records flattened in delivery order.
    pub fn records(&self) -> Vec<MutationRecord> {
        self.batches.borrow().iter().flatten().cloned().collect()
    }
}
