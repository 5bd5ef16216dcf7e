//! Bounded expansion of a user's subscription graph.
//!
//! Starting from a root user, every user within `depth` hops gets both of its subscription
//! lists loaded; users one hop further are loaded as leaves. All lookups go through one
//! [`BatchWindow`] per resolution, so each level costs one store call per relation no matter
//! how many users it holds, and a user reachable along several paths is fetched once.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use uuid::Uuid;

use crate::loader::{BatchWindow, LoadError, WindowStats};
use crate::models::{Post, Profile, User};
use crate::store::{Entity, EntityKind, EntityStore, Relation};

mod assemble;
#[cfg(test)]
mod tests;

pub use assemble::{Edges, GraphParts, UserNode};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GraphSettings {
    /// Hops from the root whose users still get their subscription lists expanded.
    pub depth: usize,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self { depth: 1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionState {
    Pending,
    RootFetched,
    NeighborsRequested,
    NeighborsExpanded,
    Assembled,
    NotFound,
}

impl ResolutionState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Assembled | Self::NotFound)
    }

    fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::RootFetched)
                | (Self::Pending, Self::NotFound)
                | (Self::RootFetched, Self::NeighborsRequested)
                | (Self::NeighborsRequested, Self::NeighborsExpanded)
                | (Self::NeighborsExpanded, Self::Assembled)
        )
    }
}

#[derive(Debug)]
pub enum GraphOutcome {
    Found(UserNode),
    NotFound,
}

impl GraphOutcome {
    #[must_use]
    pub fn into_node(self) -> Option<UserNode> {
        match self {
            Self::Found(node) => Some(node),
            Self::NotFound => None,
        }
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub outcome: GraphOutcome,
    /// States visited, in order, ending with a terminal one.
    pub trace: Vec<ResolutionState>,
    pub stats: WindowStats,
}

struct Progress {
    root: Uuid,
    trace: Vec<ResolutionState>,
}

impl Progress {
    fn new(root: Uuid) -> Self {
        Self {
            root,
            trace: vec![ResolutionState::Pending],
        }
    }

    fn current(&self) -> ResolutionState {
        self.trace
            .last()
            .copied()
            .unwrap_or(ResolutionState::Pending)
    }

    fn advance(&mut self, next: ResolutionState) {
        let current = self.current();
        debug_assert!(
            current.can_advance_to(next),
            "illegal transition {:?} -> {:?}",
            current,
            next
        );
        log::trace!("Resolving {}: {:?} -> {:?}", self.root, current, next);
        self.trace.push(next);
    }
}

pub struct GraphResolver {
    store: Arc<dyn EntityStore>,
    settings: GraphSettings,
}

impl GraphResolver {
    pub fn new(store: Arc<dyn EntityStore>, settings: GraphSettings) -> Self {
        Self { store, settings }
    }

    /// Resolves `root` and its subscription graph inside a fresh batch window.
    ///
    /// # Errors
    ///
    /// Will return Err only if the root lookup itself fails; failures further out are kept
    /// on the affected lists of the returned graph.
    pub async fn resolve(&self, root: Uuid) -> Result<Resolution, LoadError> {
        let window = BatchWindow::new(self.store.clone());
        let mut progress = Progress::new(root);
        let outcome = window
            .run(self.resolve_in(&window, root, &mut progress))
            .await?;
        let stats = window.stats();
        log::debug!("Resolved user {} in {} rounds", root, stats.rounds);
        Ok(Resolution {
            outcome,
            trace: progress.trace,
            stats,
        })
    }

    async fn resolve_in(
        &self,
        window: &BatchWindow,
        root: Uuid,
        progress: &mut Progress,
    ) -> Result<GraphOutcome, LoadError> {
        let root_user = match window
            .load_entity(EntityKind::User, root)
            .await?
            .and_then(Entity::into_user)
        {
            Some(user) => user,
            None => {
                progress.advance(ResolutionState::NotFound);
                return Ok(GraphOutcome::NotFound);
            }
        };
        progress.advance(ResolutionState::RootFetched);

        let (posts, profile, parts) = futures::join!(
            load_posts(window, root),
            load_profile(window, root),
            self.expand(window, root, root_user.clone(), progress),
        );
        progress.advance(ResolutionState::NeighborsExpanded);

        let mut node = parts.assemble(root, &root_user, self.settings.depth);
        node.posts = Some(posts);
        node.profile = Some(profile);
        progress.advance(ResolutionState::Assembled);
        Ok(GraphOutcome::Found(node))
    }

    /// Walks the graph level by level. Each level requests the entities of newly reached users
    /// together with the subscription lists of those still within depth, so a level is one
    /// batch round.
    async fn expand(
        &self,
        window: &BatchWindow,
        root: Uuid,
        root_user: User,
        progress: &mut Progress,
    ) -> GraphParts {
        let mut parts = GraphParts::default();
        parts.users.insert(root, Ok(Some(root_user)));
        let mut frontier = vec![root];
        let mut level = 0;

        while !frontier.is_empty() {
            let expanding = level <= self.settings.depth;
            let unknown: Vec<Uuid> = frontier
                .iter()
                .copied()
                .filter(|id| !parts.users.contains_key(id))
                .collect();
            let owners: &[Uuid] = if expanding { &frontier } else { &[] };
            if level == 0 {
                progress.advance(ResolutionState::NeighborsRequested);
            }

            let (users, edges) = futures::join!(
                join_all(unknown.iter().map(|id| async move {
                    let user = window
                        .load_entity(EntityKind::User, *id)
                        .await
                        .map(|entity| entity.and_then(Entity::into_user));
                    (*id, user)
                })),
                join_all(owners.iter().map(|id| async move {
                    let (subscribed_to, subscribers) = futures::join!(
                        window.load_related(Relation::UserSubscribedTo, *id),
                        window.load_related(Relation::SubscribedToUser, *id),
                    );
                    (
                        *id,
                        Edges {
                            user_subscribed_to: subscribed_to,
                            subscribed_to_user: subscribers,
                        },
                    )
                })),
            );

            parts.users.extend(users);
            let mut seen: HashSet<Uuid> = HashSet::new();
            let mut next = Vec::new();
            for (owner, edges) in edges {
                for id in edges.neighbors() {
                    if !parts.users.contains_key(&id) && seen.insert(id) {
                        next.push(id);
                    }
                }
                parts.edges.insert(owner, edges);
            }
            log::trace!(
                "Level {} of {}: {} users, {} newly reached",
                level,
                root,
                frontier.len(),
                next.len()
            );
            frontier = next;
            level += 1;
        }
        parts
    }
}

async fn load_posts(window: &BatchWindow, owner: Uuid) -> Result<Vec<Post>, LoadError> {
    let ids = window.load_related(Relation::AuthoredPosts, owner).await?;
    let posts = try_join_all(ids.iter().map(|id| window.load_entity(EntityKind::Post, *id))).await?;
    Ok(posts
        .into_iter()
        .flatten()
        .filter_map(Entity::into_post)
        .collect())
}

async fn load_profile(window: &BatchWindow, owner: Uuid) -> Result<Option<Profile>, LoadError> {
    let ids = window.load_related(Relation::OwnedProfile, owner).await?;
    match ids.first() {
        Some(id) => Ok(window
            .load_entity(EntityKind::Profile, *id)
            .await?
            .and_then(Entity::into_profile)),
        None => Ok(None),
    }
}
