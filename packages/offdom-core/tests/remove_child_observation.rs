use std::cell::Cell;
use std::rc::Rc;

use offdom_core::{Document, MutationRecord, MutationRecordType, ObserverHandle};
use offdom_test_support::{testing_document, RecordLog};

#[test]
fn remove_child_mutation_observed_first_node() {
    let t = testing_document();
    let mut document = t.document;
    let body = t.body;
    let div = document.create_element("div");
    document.append_child(body, div).unwrap();

    let fired = Rc::new(Cell::new(0u32));
    let fired_in_callback = Rc::clone(&fired);
    let handle_cell: Rc<Cell<Option<ObserverHandle>>> = Rc::new(Cell::new(None));
    let handle_in_callback = Rc::clone(&handle_cell);
    let handle = document.observe(
        body,
        move |doc: &mut Document, records: Vec<MutationRecord>| {
            assert_eq!(
                records,
                vec![MutationRecord::child_list_removal(body, vec![div])]
            );
            fired_in_callback.set(fired_in_callback.get() + 1);
            if let Some(h) = handle_in_callback.get() {
                doc.disconnect(h);
            }
        },
    );
    handle_cell.set(Some(handle));

    document.remove_child(body, div).unwrap();
    document.run_microtasks();
    assert_eq!(fired.get(), 1);

    // disconnected from inside the callback: later edits never fire
    let p = document.create_element("p");
    document.append_child(body, p).unwrap();
    document.run_microtasks();
    assert_eq!(fired.get(), 1);
}

#[test]
fn remove_child_mutation_observed_sibling_node() {
    let t = testing_document();
    let mut document = t.document;
    let body = t.body;
    let div = document.create_element("div");
    let p = document.create_element("p");
    document.append_child(body, div).unwrap();
    document.append_child(body, p).unwrap();

    let log = RecordLog::new();
    document.observe(body, log.callback());

    document.remove_child(body, div).unwrap();
    document.run_microtasks();

    assert_eq!(
        log.batches(),
        vec![vec![MutationRecord::child_list_removal(body, vec![div])]]
    );
    assert_eq!(document.children(body).unwrap(), &[p]);
}

#[test]
fn remove_child_mutation_observed_multiple_sibling_nodes() {
    let t = testing_document();
    let mut document = t.document;
    let body = t.body;
    let div = document.create_element("div");
    let p = document.create_element("p");
    let input = document.create_element("input");
    document.append_child(body, div).unwrap();
    document.append_child(body, p).unwrap();
    document.append_child(body, input).unwrap();

    let log = RecordLog::new();
    document.observe(body, log.callback());

    document.remove_child(body, div).unwrap();
    document.remove_child(body, input).unwrap();
    document.run_microtasks();

    // one callback invocation, one record per removal, in call order
    assert_eq!(log.batch_count(), 1);
    assert_eq!(
        log.batches(),
        vec![vec![
            MutationRecord::child_list_removal(body, vec![div]),
            MutationRecord::child_list_removal(body, vec![input]),
        ]]
    );
    assert_eq!(document.children(body).unwrap(), &[p]);
}

#[test]
fn remove_child_mutation_observed_deeper_target() {
    let t = testing_document();
    let mut document = t.document;
    let body = t.body;
    let div = document.create_element("div");
    let p = document.create_element("p");
    document.append_child(body, div).unwrap();
    document.append_child(div, p).unwrap();

    let log = RecordLog::new();
    document.observe(div, log.callback());

    document.remove_child(div, p).unwrap();
    document.run_microtasks();

    let batches = log.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    let record = &batches[0][0];
    assert_eq!(record.kind, MutationRecordType::ChildList);
    // the target is the edited parent, not the document body above it
    assert_eq!(record.target, div);
    assert_eq!(record.removed_nodes, vec![p]);
    assert!(record.added_nodes.is_empty());
}
