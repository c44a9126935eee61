//! Entity store: cached collection + fetch coordinator for one entity type.
//!
//! - `list()` fetches at most once per store lifetime (until `reset()`); concurrent callers
//!   share the in-flight view
//! - fetches and `add` / `update` / `remove` mark the view `loading` synchronously, then run
//!   on one per-store FIFO worker so their effects land in call order
//! - the view only leaves `loading` once the queue is drained
//! - jobs queued before a `reset()` or a token switch never reach the API
//! - every change is published on a `watch` channel; subscribers get clones, never the
//!   backing collection

use crate::domain::{
    CategoryModel, DataStatus, DomainError, Entity, EventModel, NewCategory, NewParticipant,
    ParticipantModel, Status,
};
use crate::ports::{EntityApi, TokenSource};
use crate::usecases::view::{Pending, View};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

pub type CategoryStore = EntityStore<CategoryModel, NewCategory>;
pub type EventStore = EntityStore<EventModel, EventModel>;
pub type ParticipantStore = EntityStore<ParticipantModel, NewParticipant>;

type SharedApi<E, D> = Arc<dyn EntityApi<Entity = E, Draft = D>>;
type CollectionState<E> = watch::Sender<DataStatus<Vec<E>>>;

/// What `remove` does to the cache when the server reports failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemovePolicy {
    /// Leave the entity cached until the server confirms deletion.
    #[default]
    KeepOnFailure,
    /// Drop the entity from the cache as soon as any response arrives.
    PruneOnFailure,
}

impl RemovePolicy {
    pub fn from_prune_flag(prune_on_failed_remove: bool) -> Self {
        if prune_on_failed_remove {
            Self::PruneOnFailure
        } else {
            Self::KeepOnFailure
        }
    }
}

enum Job<E, D> {
    Fetch,
    Add {
        draft: D,
        reply: oneshot::Sender<DataStatus<Option<E>>>,
    },
    Update {
        entity: E,
        reply: oneshot::Sender<DataStatus<()>>,
    },
    Remove {
        entity: E,
        reply: oneshot::Sender<DataStatus<()>>,
    },
}

impl<E, D> Job<E, D> {
    /// Answer the job with `error` without running it.
    fn refuse(self, error: DomainError) -> (Effect<E>, Reply<E>) {
        let cached = Effect::Failed {
            error: error.clone(),
            prune: None,
        };
        match self {
            Job::Fetch => (Effect::LoadFailed(error), Reply::Nobody),
            Job::Add { reply, .. } => {
                (cached, Reply::Created(reply, DataStatus::failure(None, error)))
            }
            Job::Update { reply, .. } | Job::Remove { reply, .. } => {
                (cached, Reply::Done(reply, DataStatus::failure((), error)))
            }
        }
    }
}

/// A job plus the workspace scope it was requested under.
struct Queued<E, D> {
    job: Job<E, D>,
    generation: u64,
    token: Option<String>,
}

/// How a finished job changes the cached collection.
enum Effect<E> {
    Loaded(Vec<E>),
    LoadFailed(DomainError),
    Push(E),
    Patch(E),
    Drop(E),
    Failed {
        error: DomainError,
        prune: Option<E>,
    },
}

/// The caller's answer, sent once the effect is published.
enum Reply<E> {
    Nobody,
    Created(oneshot::Sender<DataStatus<Option<E>>>, DataStatus<Option<E>>),
    Done(oneshot::Sender<DataStatus<()>>, DataStatus<()>),
}

impl<E> Reply<E> {
    fn send(self) {
        match self {
            Reply::Nobody => {}
            Reply::Created(tx, outcome) => {
                let _ = tx.send(outcome);
            }
            Reply::Done(tx, outcome) => {
                let _ = tx.send(outcome);
            }
        }
    }
}

pub struct EntityStore<E: Entity, D: Send + Sync + 'static> {
    name: &'static str,
    state: Arc<CollectionState<E>>,
    fetch_status: Arc<watch::Sender<Status>>,
    /// Bumped by `reset()`; jobs queued under an older generation are discarded.
    generation: Arc<AtomicU64>,
    tokens: Option<Arc<dyn TokenSource>>,
    jobs: mpsc::UnboundedSender<Queued<E, D>>,
}

impl<E: Entity, D: Send + Sync + 'static> EntityStore<E, D> {
    /// Create the store and spawn its worker. Must be called inside a Tokio runtime.
    pub fn new(name: &'static str, api: SharedApi<E, D>, remove_policy: RemovePolicy) -> Self {
        Self::build(name, api, remove_policy, None)
    }

    /// Like `new`, but jobs are tied to the token current when they were requested: a job
    /// whose token is no longer current when its turn comes is answered with `Unavailable`.
    pub fn new_scoped(
        name: &'static str,
        api: SharedApi<E, D>,
        remove_policy: RemovePolicy,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self::build(name, api, remove_policy, Some(tokens))
    }

    fn build(
        name: &'static str,
        api: SharedApi<E, D>,
        remove_policy: RemovePolicy,
        tokens: Option<Arc<dyn TokenSource>>,
    ) -> Self {
        let (state, _) = watch::channel(DataStatus::never(Vec::new()));
        let (fetch_status, _) = watch::channel(Status::Never);
        let state = Arc::new(state);
        let fetch_status = Arc::new(fetch_status);
        let generation = Arc::new(AtomicU64::new(0));
        let (tx, rx) = mpsc::unbounded_channel();

        let worker = StoreWorker {
            name,
            api,
            state: Arc::clone(&state),
            fetch_status: Arc::clone(&fetch_status),
            generation: Arc::clone(&generation),
            tokens: tokens.clone(),
            remove_policy,
        };
        tokio::spawn(worker.run(rx));

        Self {
            name,
            state,
            fetch_status,
            generation,
            tokens,
            jobs: tx,
        }
    }

    /// Subscribe to the collection without triggering a fetch.
    pub fn subscribe(&self) -> View<DataStatus<Vec<E>>> {
        View::new(self.state.subscribe())
    }

    pub fn snapshot(&self) -> DataStatus<Vec<E>> {
        self.state.borrow().clone()
    }

    /// Load the collection. No request is issued while a fetch is queued or in flight, or
    /// after one succeeded; a failed fetch is retried by the next call.
    pub fn list(&self) -> View<DataStatus<Vec<E>>> {
        let mut should_fetch = false;
        self.fetch_status.send_if_modified(|status| {
            if matches!(status, Status::Loading | Status::Success) {
                return false;
            }
            *status = Status::Loading;
            should_fetch = true;
            true
        });
        if !should_fetch {
            debug!(store = self.name, "list served from cache");
            return self.subscribe();
        }

        if !self.enqueue(Job::Fetch) {
            self.fetch_status.send_replace(Status::Error);
        }
        self.subscribe()
    }

    /// Persist a draft; on success the confirmed entity is appended to the cache.
    pub fn add(&self, draft: D) -> Pending<Option<E>> {
        let (reply, rx) = oneshot::channel();
        self.enqueue(Job::Add { draft, reply });
        Pending::new(rx)
    }

    /// Replace the cached entry with the same id once the server accepts the change.
    pub fn update(&self, entity: E) -> Pending<()> {
        let (reply, rx) = oneshot::channel();
        self.enqueue(Job::Update { entity, reply });
        Pending::new(rx)
    }

    /// Delete an entity; the cache drops it once the server confirms (see `RemovePolicy`).
    pub fn remove(&self, entity: E) -> Pending<()> {
        let (reply, rx) = oneshot::channel();
        self.enqueue(Job::Remove { entity, reply });
        Pending::new(rx)
    }

    /// Forget everything: status back to `never`, empty collection, next `list()` fetches.
    /// Queued jobs are answered with `Unavailable`; a job already in flight is not published.
    pub fn reset(&self) {
        self.state.send_modify(|s| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            self.fetch_status.send_replace(Status::Never);
            *s = DataStatus::never(Vec::new());
        });
        debug!(store = self.name, "store reset");
    }

    /// Mark the view `loading` and queue the job under the current scope.
    fn enqueue(&self, job: Job<E, D>) -> bool {
        let mut sent = true;
        // Scoped and sent under the state lock, so neither `reset()` nor a publish lands
        // between the capture and the `loading` mark.
        self.state.send_modify(|s| {
            let queued = Queued {
                job,
                generation: self.generation.load(Ordering::SeqCst),
                token: current_token(self.tokens.as_deref()),
            };
            if self.jobs.send(queued).is_ok() {
                s.mark_loading();
            } else {
                // Worker gone: the reply sender dropped with the job, so Pending reports it too.
                sent = false;
                s.fail(DomainError::Unavailable(format!(
                    "{} store is shut down",
                    self.name
                )));
            }
        });
        if !sent {
            warn!(store = self.name, "store worker stopped");
        }
        sent
    }
}

fn current_token(tokens: Option<&dyn TokenSource>) -> Option<String> {
    tokens.and_then(|t| t.current_token())
}

/// Runs fetches and mutations one at a time, in the order they were queued.
struct StoreWorker<E: Entity, D: Send + Sync + 'static> {
    name: &'static str,
    api: SharedApi<E, D>,
    state: Arc<CollectionState<E>>,
    fetch_status: Arc<watch::Sender<Status>>,
    generation: Arc<AtomicU64>,
    tokens: Option<Arc<dyn TokenSource>>,
    remove_policy: RemovePolicy,
}

impl<E: Entity, D: Send + Sync + 'static> StoreWorker<E, D> {
    async fn run(self, mut rx: mpsc::UnboundedReceiver<Queued<E, D>>) {
        while let Some(Queued {
            job,
            generation,
            token,
        }) = rx.recv().await
        {
            let (effect, reply) = if self.generation.load(Ordering::SeqCst) != generation {
                debug!(store = self.name, "skipping job queued before reset");
                job.refuse(DomainError::Unavailable(format!(
                    "{} store was reset before the request ran",
                    self.name
                )))
            } else if current_token(self.tokens.as_deref()) != token {
                debug!(store = self.name, "skipping job queued under another token");
                job.refuse(DomainError::Unavailable(format!(
                    "workspace changed before the {} request ran",
                    self.name
                )))
            } else {
                self.execute(job).await
            };
            if !self.publish(generation, effect, &rx) {
                debug!(store = self.name, "job finished after reset; cache left alone");
            }
            reply.send();
        }
        debug!(store = self.name, "store worker finished (store dropped)");
    }

    async fn execute(&self, job: Job<E, D>) -> (Effect<E>, Reply<E>) {
        match job {
            Job::Fetch => match self.api.fetch_all().await {
                Ok(items) => {
                    info!(store = self.name, count = items.len(), "collection loaded");
                    (Effect::Loaded(items), Reply::Nobody)
                }
                Err(e) => {
                    warn!(store = self.name, error = %e, "collection fetch failed");
                    (Effect::LoadFailed(e), Reply::Nobody)
                }
            },
            Job::Add { draft, reply } => match self.api.create(&draft).await {
                Ok(created) => {
                    info!(store = self.name, id = ?created.id(), "entity added");
                    let outcome = DataStatus::success(Some(created.clone()));
                    (Effect::Push(created), Reply::Created(reply, outcome))
                }
                Err(e) => {
                    warn!(store = self.name, error = %e, "add failed");
                    let outcome = DataStatus::failure(None, e.clone());
                    (Effect::Failed { error: e, prune: None }, Reply::Created(reply, outcome))
                }
            },
            Job::Update { entity, reply } => match self.api.update(&entity).await {
                Ok(()) => {
                    info!(store = self.name, id = ?entity.id(), "entity updated");
                    (Effect::Patch(entity), Reply::Done(reply, DataStatus::success(())))
                }
                Err(e) => {
                    warn!(store = self.name, error = %e, "update failed");
                    let outcome = DataStatus::failure((), e.clone());
                    (Effect::Failed { error: e, prune: None }, Reply::Done(reply, outcome))
                }
            },
            Job::Remove { entity, reply } => match self.api.delete(&entity).await {
                Ok(()) => {
                    info!(store = self.name, id = ?entity.id(), "entity removed");
                    (Effect::Drop(entity), Reply::Done(reply, DataStatus::success(())))
                }
                Err(e) => {
                    warn!(store = self.name, error = %e, "remove failed");
                    let prune =
                        (self.remove_policy == RemovePolicy::PruneOnFailure).then_some(entity);
                    let outcome = DataStatus::failure((), e.clone());
                    (Effect::Failed { error: e, prune }, Reply::Done(reply, outcome))
                }
            },
        }
    }

    /// Apply `effect` unless the store was reset since the job was queued. The view stays
    /// `loading` while more jobs wait; their callers get errors through `Pending`.
    fn publish(
        &self,
        generation: u64,
        effect: Effect<E>,
        queue: &mpsc::UnboundedReceiver<Queued<E, D>>,
    ) -> bool {
        self.state.send_if_modified(|s| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let outcome = match effect {
                Effect::Loaded(items) => {
                    *s.data_mut() = items;
                    self.fetch_status.send_replace(Status::Success);
                    Ok(())
                }
                Effect::LoadFailed(e) => {
                    // Prior collection stays cached.
                    self.fetch_status.send_replace(Status::Error);
                    Err(e)
                }
                Effect::Push(created) => {
                    s.data_mut().push(created);
                    Ok(())
                }
                Effect::Patch(entity) => {
                    if let Some(slot) = s.data_mut().iter_mut().find(|c| c.same_id(&entity)) {
                        *slot = entity;
                    }
                    Ok(())
                }
                Effect::Drop(entity) => {
                    s.data_mut().retain(|c| !c.same_id(&entity));
                    Ok(())
                }
                Effect::Failed { error, prune } => {
                    if let Some(entity) = prune {
                        s.data_mut().retain(|c| !c.same_id(&entity));
                    }
                    Err(error)
                }
            };
            if queue.is_empty() {
                match outcome {
                    Ok(()) => s.succeed(),
                    Err(e) => s.fail(e),
                }
            }
            true
        })
    }
}
