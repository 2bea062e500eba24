//! SQLite-backed entity store.
//!
//! # Responsibility
//! - Persist records as JSON documents addressed by
//!   `users/{user}/{collection}/{record}`.
//! - Deliver change notifications as discrete, ordered, non-re-entrant
//!   handler invocations on the calling thread.
//!
//! # Invariants
//! - Batches commit in one SQLite transaction; notifications go out only
//!   after commit.
//! - Dispatch runs one drain loop at a time. A mutation issued from inside
//!   a handler enqueues its notification and returns; the outer loop
//!   delivers it after the current handler finishes.

use super::{
    ChangeHandler, Collection, CollectionSnapshot, EntityStore, StoreError, StoreResult,
    Subscription, WriteBatch, WriteOp,
};
use crate::model::RecordId;
use crate::session::UserId;
use log::{debug, error};
use rusqlite::{params, Connection};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

struct Subscriber {
    user: UserId,
    collection: Collection,
    handler: Rc<RefCell<ChangeHandler>>,
}

enum QueuedEvent {
    /// A committed mutation touched this user/collection.
    Broadcast { user: UserId, collection: Collection },
    /// A fresh subscription owes its initial snapshot.
    Initial { token: u64 },
}

/// Entity store over a single SQLite connection.
///
/// Single-threaded by design: all core logic runs synchronously inside
/// store callbacks on one logical thread, so interior mutability is cell
/// based rather than lock based.
pub struct SqliteEntityStore {
    conn: RefCell<Connection>,
    subscribers: Rc<RefCell<BTreeMap<u64, Subscriber>>>,
    next_token: Cell<u64>,
    queue: RefCell<VecDeque<QueuedEvent>>,
    dispatching: Cell<bool>,
}

impl SqliteEntityStore {
    /// Wraps an already-migrated connection (see [`crate::db::open_db`]).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: RefCell::new(conn),
            subscribers: Rc::new(RefCell::new(BTreeMap::new())),
            next_token: Cell::new(1),
            queue: RefCell::new(VecDeque::new()),
            dispatching: Cell::new(false),
        }
    }

    fn snapshot(
        &self,
        user: &UserId,
        collection: Collection,
    ) -> StoreResult<Vec<(RecordId, Value)>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(
            "SELECT record_id, doc FROM records
             WHERE user_id = ?1 AND collection = ?2
             ORDER BY seq ASC;",
        )?;
        let rows = stmt.query_map(params![user, collection.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (record_id, raw) = row.map_err(StoreError::from)?;
            let doc = serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
                record_id: record_id.clone(),
                source,
            })?;
            records.push((record_id, doc));
        }
        Ok(records)
    }

    fn enqueue(&self, event: QueuedEvent) {
        self.queue.borrow_mut().push_back(event);
        self.drain();
    }

    fn drain(&self) {
        if self.dispatching.get() {
            return;
        }
        self.dispatching.set(true);
        loop {
            let event = self.queue.borrow_mut().pop_front();
            let Some(event) = event else { break };
            match event {
                QueuedEvent::Broadcast { user, collection } => {
                    self.deliver_broadcast(&user, collection)
                }
                QueuedEvent::Initial { token } => self.deliver_initial(token),
            }
        }
        self.dispatching.set(false);
    }

    fn deliver_broadcast(&self, user: &UserId, collection: Collection) {
        let targets: Vec<(u64, Rc<RefCell<ChangeHandler>>)> = self
            .subscribers
            .borrow()
            .iter()
            .filter(|(_, sub)| sub.user == *user && sub.collection == collection)
            .map(|(token, sub)| (*token, Rc::clone(&sub.handler)))
            .collect();
        if targets.is_empty() {
            return;
        }

        let records = match self.snapshot(user, collection) {
            Ok(records) => records,
            Err(err) => {
                error!(
                    "event=store_notify module=store status=error collection={collection} error={err}"
                );
                return;
            }
        };
        let snap = CollectionSnapshot {
            user: user.clone(),
            collection,
            records,
        };

        for (token, handler) in targets {
            // A handler earlier in this pass may have unsubscribed this one.
            let live = self.subscribers.borrow().contains_key(&token);
            if !live {
                continue;
            }
            (handler.borrow_mut())(&snap);
        }
    }

    fn deliver_initial(&self, token: u64) {
        let target = self
            .subscribers
            .borrow()
            .get(&token)
            .map(|sub| (sub.user.clone(), sub.collection, Rc::clone(&sub.handler)));
        let Some((user, collection, handler)) = target else {
            return;
        };

        match self.snapshot(&user, collection) {
            Ok(records) => {
                let snap = CollectionSnapshot {
                    user,
                    collection,
                    records,
                };
                (handler.borrow_mut())(&snap);
            }
            Err(err) => error!(
                "event=store_subscribe module=store status=error collection={collection} error={err}"
            ),
        }
    }
}

impl EntityStore for SqliteEntityStore {
    fn get(&self, user: &UserId, collection: Collection) -> StoreResult<Vec<(RecordId, Value)>> {
        self.snapshot(user, collection)
    }

    fn put(
        &self,
        user: &UserId,
        collection: Collection,
        id: &RecordId,
        doc: Value,
    ) -> StoreResult<()> {
        let mut batch = WriteBatch::new();
        batch.put(collection, id.clone(), doc);
        self.apply(user, batch)
    }

    fn delete(&self, user: &UserId, collection: Collection, id: &RecordId) -> StoreResult<()> {
        let mut batch = WriteBatch::new();
        batch.delete(collection, id.clone());
        self.apply(user, batch)
    }

    fn apply(&self, user: &UserId, batch: WriteBatch) -> StoreResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut touched = BTreeSet::new();
        {
            let mut conn = self.conn.borrow_mut();
            let tx = conn.transaction().map_err(StoreError::from)?;
            for op in batch.ops() {
                match op {
                    WriteOp::Put {
                        collection,
                        id,
                        doc,
                    } => {
                        tx.execute(
                            "INSERT INTO records (user_id, collection, record_id, doc)
                             VALUES (?1, ?2, ?3, ?4)
                             ON CONFLICT (user_id, collection, record_id)
                             DO UPDATE SET doc = excluded.doc;",
                            params![user, collection.as_str(), id, doc.to_string()],
                        )?;
                        touched.insert(*collection);
                    }
                    WriteOp::Delete { collection, id } => {
                        tx.execute(
                            "DELETE FROM records
                             WHERE user_id = ?1 AND collection = ?2 AND record_id = ?3;",
                            params![user, collection.as_str(), id],
                        )?;
                        touched.insert(*collection);
                    }
                }
            }
            tx.commit()?;
        }

        debug!(
            "event=store_apply module=store status=ok ops={} collections={}",
            batch.ops().len(),
            touched.len()
        );
        for collection in touched {
            self.enqueue(QueuedEvent::Broadcast {
                user: user.clone(),
                collection,
            });
        }
        Ok(())
    }

    fn subscribe(
        &self,
        user: &UserId,
        collection: Collection,
        handler: ChangeHandler,
    ) -> Subscription {
        let token = self.next_token.get();
        self.next_token.set(token + 1);
        self.subscribers.borrow_mut().insert(
            token,
            Subscriber {
                user: user.clone(),
                collection,
                handler: Rc::new(RefCell::new(handler)),
            },
        );
        self.enqueue(QueuedEvent::Initial { token });

        let registry = Rc::downgrade(&self.subscribers);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().remove(&token);
            }
        })
    }
}
