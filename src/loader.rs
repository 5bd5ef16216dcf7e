//! Request-scoped batching and deduplication of entity store lookups.
//!
//! A [`BatchWindow`] lives for exactly one root resolution. Callers register [`LoadKey`]s and
//! get back a [`LoadHandle`]; nothing touches the store until the window is flushed. A flush
//! groups every pending key by entity kind or relation, calls the store once per group (groups
//! run concurrently) and settles every handle of the group from that single answer.
//!
//! Within a window a key is fetched at most once: asking again returns a clone of the first
//! handle, whether it is still pending or already settled. A failed group settles all of its
//! handles with the same shared cause and leaves everything settled earlier untouched. When a
//! window is cancelled or dropped, handles that were never dispatched settle with
//! [`LoadError::CancelledWindow`].

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::store::{Entity, EntityKind, EntityStore, Relation, StoreError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LoadKey {
    Entity(EntityKind, Uuid),
    Related(Relation, Uuid),
}

impl LoadKey {
    #[must_use]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Entity(_, id) | Self::Related(_, id) => *id,
        }
    }

    fn group(&self) -> LoadGroup {
        match self {
            Self::Entity(kind, _) => LoadGroup::Entities(*kind),
            Self::Related(relation, _) => LoadGroup::Related(*relation),
        }
    }
}

/// Keys sharing a group are answered by one store call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
enum LoadGroup {
    Entities(EntityKind),
    Related(Relation),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Loaded {
    /// `None` when the store has no row for the key.
    Entity(Option<Entity>),
    Related(Vec<Uuid>),
}

impl Loaded {
    #[must_use]
    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(entity) => entity,
            Self::Related(_) => None,
        }
    }

    #[must_use]
    pub fn into_related(self) -> Vec<Uuid> {
        match self {
            Self::Related(ids) => ids,
            Self::Entity(_) => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Error)]
pub enum LoadError {
    #[error("store failure: {0}")]
    Store(#[source] Arc<StoreError>),

    #[error("batch window was cancelled before the load completed")]
    CancelledWindow,
}

pub type LoadResult = Result<Loaded, LoadError>;

/// Pending or settled result of one key. Cheap to clone; every clone observes the same value.
#[derive(Clone)]
pub struct LoadHandle {
    inner: Shared<BoxFuture<'static, LoadResult>>,
}

impl LoadHandle {
    fn new(receiver: oneshot::Receiver<LoadResult>) -> Self {
        let inner = receiver
            .map(|settled| settled.unwrap_or(Err(LoadError::CancelledWindow)))
            .boxed()
            .shared();
        Self { inner }
    }

    /// The settled value, if the handle has already been awaited to completion.
    #[must_use]
    pub fn peek(&self) -> Option<&LoadResult> {
        self.inner.peek()
    }
}

impl Future for LoadHandle {
    type Output = LoadResult;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WindowStats {
    /// Calls to `request`, including coalesced ones.
    pub requests: usize,
    /// Requests answered by an existing handle.
    pub coalesced: usize,
    pub rounds: usize,
    pub store_calls: usize,
    pub keys_dispatched: usize,
}

#[derive(Default)]
struct WindowState {
    handles: HashMap<LoadKey, LoadHandle>,
    pending: Vec<(LoadKey, oneshot::Sender<LoadResult>)>,
    stats: WindowStats,
}

pub struct BatchWindow {
    store: Arc<dyn EntityStore>,
    state: Mutex<WindowState>,
    registered: Notify,
}

impl BatchWindow {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            state: Mutex::new(WindowState::default()),
            registered: Notify::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `key`, or returns the handle already registered for it in this window.
    pub fn request(&self, key: LoadKey) -> LoadHandle {
        let mut state = self.state();
        state.stats.requests += 1;
        if let Some(handle) = state.handles.get(&key) {
            let handle = handle.clone();
            state.stats.coalesced += 1;
            return handle;
        }
        let (sender, receiver) = oneshot::channel();
        let handle = LoadHandle::new(receiver);
        state.handles.insert(key, handle.clone());
        state.pending.push((key, sender));
        drop(state);
        self.registered.notify_one();
        handle
    }

    /// Loads one entity; resolves once a flush has answered it.
    ///
    /// # Errors
    ///
    /// Will return Err if the group's store call failed or the window was cancelled
    pub async fn load_entity(&self, kind: EntityKind, id: Uuid) -> Result<Option<Entity>, LoadError> {
        Ok(self.request(LoadKey::Entity(kind, id)).await?.into_entity())
    }

    /// Loads the keys related to `owner`; resolves once a flush has answered it.
    ///
    /// # Errors
    ///
    /// Will return Err if the group's store call failed or the window was cancelled
    pub async fn load_related(&self, relation: Relation, owner: Uuid) -> Result<Vec<Uuid>, LoadError> {
        Ok(self.request(LoadKey::Related(relation, owner)).await?.into_related())
    }

    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state().pending.len()
    }

    #[must_use]
    pub fn stats(&self) -> WindowStats {
        self.state().stats
    }

    /// Dispatches pending keys, round after round, until none remain. Keys registered while a
    /// round is in flight are picked up by the next round. Returns the number of rounds run;
    /// flushing an empty window is a no-op returning 0.
    pub async fn flush(&self) -> usize {
        let mut rounds = 0;
        loop {
            let pending = std::mem::take(&mut self.state().pending);
            if pending.is_empty() {
                return rounds;
            }
            rounds += 1;
            self.dispatch(pending).await;
        }
    }

    /// Drops every undispatched key; their handles settle with `CancelledWindow`.
    pub fn cancel(&self) -> usize {
        let pending = std::mem::take(&mut self.state().pending);
        if !pending.is_empty() {
            log::debug!("Cancelling {} pending loads", pending.len());
        }
        pending.len()
    }

    /// Drives `resolution` to completion, flushing whenever it is blocked with keys pending.
    ///
    /// Everything `resolution` registers during one poll lands in the same round, so
    /// independent requests joined together are batched, and requests issued after earlier
    /// ones settle are batched into the following round.
    pub async fn run<F: Future>(&self, resolution: F) -> F::Output {
        futures::pin_mut!(resolution);
        loop {
            tokio::select! {
                biased;
                output = &mut resolution => return output,
                _ = self.registered.notified() => {}
            }
            self.flush().await;
        }
    }

    async fn dispatch(&self, pending: Vec<(LoadKey, oneshot::Sender<LoadResult>)>) {
        let mut groups: BTreeMap<LoadGroup, Vec<(Uuid, oneshot::Sender<LoadResult>)>> =
            BTreeMap::new();
        let keys = pending.len();
        for (key, sender) in pending {
            groups.entry(key.group()).or_default().push((key.id(), sender));
        }
        {
            let mut state = self.state();
            state.stats.rounds += 1;
            state.stats.store_calls += groups.len();
            state.stats.keys_dispatched += keys;
            log::debug!(
                "Batch round {}: {} keys in {} store calls",
                state.stats.rounds,
                keys,
                groups.len()
            );
        }
        let store = &*self.store;
        join_all(
            groups
                .into_iter()
                .map(|(group, waiters)| settle_group(store, group, waiters)),
        )
        .await;
    }
}

impl Drop for BatchWindow {
    fn drop(&mut self) {
        let state = self.state();
        log::trace!("Batch window closed: {:?}", state.stats);
        if !state.pending.is_empty() {
            log::debug!("Batch window dropped with {} pending loads", state.pending.len());
        }
    }
}

async fn settle_group(
    store: &dyn EntityStore,
    group: LoadGroup,
    waiters: Vec<(Uuid, oneshot::Sender<LoadResult>)>,
) {
    let ids: Vec<Uuid> = waiters.iter().map(|(id, _)| *id).collect();
    // A closed receiver means every clone of the handle was dropped; nothing to settle.
    match group {
        LoadGroup::Entities(kind) => match store.get_by_ids(kind, &ids).await {
            Ok(mut found) => {
                for (id, sender) in waiters {
                    let _ = sender.send(Ok(Loaded::Entity(found.remove(&id))));
                }
            }
            Err(error) => fail_group(group, error, waiters),
        },
        LoadGroup::Related(relation) => match store.get_related(relation, &ids).await {
            Ok(mut related) => {
                for (id, sender) in waiters {
                    let keys = related.remove(&id).unwrap_or_default();
                    let _ = sender.send(Ok(Loaded::Related(keys)));
                }
            }
            Err(error) => fail_group(group, error, waiters),
        },
    }
}

fn fail_group(group: LoadGroup, error: StoreError, waiters: Vec<(Uuid, oneshot::Sender<LoadResult>)>) {
    log::warn!("{:?} lookup for {} keys failed: {}", group, waiters.len(), error);
    let cause = Arc::new(error);
    for (_, sender) in waiters {
        let _ = sender.send(Err(LoadError::Store(cause.clone())));
    }
}
