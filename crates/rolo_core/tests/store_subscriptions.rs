use rolo_core::db::open_db_in_memory;
use rolo_core::{Collection, EntityStore, SqliteEntityStore, WriteBatch};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

fn store() -> SqliteEntityStore {
    SqliteEntityStore::new(open_db_in_memory().unwrap())
}

fn user() -> String {
    "u1".to_string()
}

#[test]
fn put_get_delete_roundtrip_in_insertion_order() {
    let store = store();
    let user = user();

    store
        .put(&user, Collection::Tasks, &"b".to_string(), json!({"title": "second"}))
        .unwrap();
    store
        .put(&user, Collection::Tasks, &"a".to_string(), json!({"title": "first"}))
        .unwrap();

    let records = store.get(&user, Collection::Tasks).unwrap();
    let ids: Vec<&str> = records.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);

    store.delete(&user, Collection::Tasks, &"b".to_string()).unwrap();
    let records = store.get(&user, Collection::Tasks).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "a");
}

#[test]
fn update_keeps_original_insertion_position() {
    let store = store();
    let user = user();

    for id in ["one", "two", "three"] {
        store
            .put(&user, Collection::Tasks, &id.to_string(), json!({"title": id}))
            .unwrap();
    }
    store
        .put(&user, Collection::Tasks, &"one".to_string(), json!({"title": "edited"}))
        .unwrap();

    let records = store.get(&user, Collection::Tasks).unwrap();
    let ids: Vec<&str> = records.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["one", "two", "three"]);
    assert_eq!(records[0].1["title"], "edited");
}

#[test]
fn delete_of_absent_record_is_a_noop() {
    let store = store();
    store
        .delete(&user(), Collection::Meetings, &"missing".to_string())
        .unwrap();
}

#[test]
fn subscribe_fires_immediately_with_empty_snapshot() {
    let store = store();
    let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let _sub = store.subscribe(
        &user(),
        Collection::Contacts,
        Box::new(move |snap| sink.borrow_mut().push(snap.records.len())),
    );

    assert_eq!(*seen.borrow(), vec![0]);
}

#[test]
fn mutations_notify_matching_subscribers_only() {
    let store = store();
    let user = user();
    let task_calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
    let meeting_calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&task_calls);
    let _tasks = store.subscribe(
        &user,
        Collection::Tasks,
        Box::new(move |_| *sink.borrow_mut() += 1),
    );
    let sink = Rc::clone(&meeting_calls);
    let _meetings = store.subscribe(
        &user,
        Collection::Meetings,
        Box::new(move |_| *sink.borrow_mut() += 1),
    );

    store
        .put(&user, Collection::Tasks, &"t1".to_string(), json!({"title": "x"}))
        .unwrap();

    // Initial snapshot plus one mutation for tasks; initial only for
    // meetings.
    assert_eq!(*task_calls.borrow(), 2);
    assert_eq!(*meeting_calls.borrow(), 1);

    // Another user's partition stays silent.
    store
        .put(&"someone-else".to_string(), Collection::Tasks, &"t9".to_string(), json!({}))
        .unwrap();
    assert_eq!(*task_calls.borrow(), 2);
}

#[test]
fn unsubscribe_is_idempotent_and_stops_delivery() {
    let store = store();
    let user = user();
    let calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&calls);
    let mut sub = store.subscribe(
        &user,
        Collection::Tasks,
        Box::new(move |_| *sink.borrow_mut() += 1),
    );
    assert_eq!(*calls.borrow(), 1);

    sub.unsubscribe();
    sub.unsubscribe();

    store
        .put(&user, Collection::Tasks, &"t1".to_string(), json!({"title": "x"}))
        .unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn drop_detaches_the_subscription() {
    let store = store();
    let user = user();
    let calls: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));

    let sink = Rc::clone(&calls);
    {
        let _sub = store.subscribe(
            &user,
            Collection::Tasks,
            Box::new(move |_| *sink.borrow_mut() += 1),
        );
    }
    store
        .put(&user, Collection::Tasks, &"t1".to_string(), json!({}))
        .unwrap();
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn mutation_inside_a_handler_is_delivered_after_it_returns() {
    let store = Rc::new(store());
    let user = user();
    let depth: Rc<RefCell<i32>> = Rc::new(RefCell::new(0));
    let max_depth: Rc<RefCell<i32>> = Rc::new(RefCell::new(0));
    let sizes: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));

    let handler_store = Rc::clone(&store);
    let handler_user = user.clone();
    let handler_depth = Rc::clone(&depth);
    let handler_max = Rc::clone(&max_depth);
    let handler_sizes = Rc::clone(&sizes);
    let _sub = store.subscribe(
        &user,
        Collection::Tasks,
        Box::new(move |snap| {
            *handler_depth.borrow_mut() += 1;
            let current = *handler_depth.borrow();
            if current > *handler_max.borrow() {
                *handler_max.borrow_mut() = current;
            }
            handler_sizes.borrow_mut().push(snap.records.len());

            // First delivery seeds a record; the resulting notification
            // must wait until this handler has returned.
            if snap.records.is_empty() {
                handler_store
                    .put(
                        &handler_user,
                        Collection::Tasks,
                        &"nested".to_string(),
                        serde_json::json!({"title": "nested"}),
                    )
                    .unwrap();
            }
            *handler_depth.borrow_mut() -= 1;
        }),
    );

    assert_eq!(*max_depth.borrow(), 1, "handler must never re-enter");
    assert_eq!(*sizes.borrow(), vec![0, 1]);
}

#[test]
fn batch_applies_atomically_and_notifies_each_collection() {
    let store = store();
    let user = user();

    store
        .put(&user, Collection::Meetings, &"m1".to_string(), json!({"topic": "x"}))
        .unwrap();

    let contact_sizes: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
    let meeting_sizes: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&contact_sizes);
    let _contacts = store.subscribe(
        &user,
        Collection::Contacts,
        Box::new(move |snap| sink.borrow_mut().push(snap.records.len())),
    );
    let sink = Rc::clone(&meeting_sizes);
    let _meetings = store.subscribe(
        &user,
        Collection::Meetings,
        Box::new(move |snap| sink.borrow_mut().push(snap.records.len())),
    );

    let mut batch = WriteBatch::new();
    batch.put(Collection::Contacts, "c1", json!({"firstName": "Dana"}));
    batch.delete(Collection::Meetings, "m1");
    store.apply(&user, batch).unwrap();

    assert_eq!(*contact_sizes.borrow(), vec![0, 1]);
    assert_eq!(*meeting_sizes.borrow(), vec![1, 0]);
}

#[test]
fn empty_batch_is_a_noop() {
    let store = store();
    store.apply(&user(), WriteBatch::new()).unwrap();
}
