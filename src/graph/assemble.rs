use std::collections::HashMap;

use uuid::Uuid;

use crate::loader::LoadError;
use crate::models::{Post, Profile, User};

/// Both subscription lists of one user, as returned by the store.
#[derive(Clone, Debug)]
pub struct Edges {
    pub user_subscribed_to: Result<Vec<Uuid>, LoadError>,
    pub subscribed_to_user: Result<Vec<Uuid>, LoadError>,
}

impl Edges {
    /// Keys from both directions in list order; failed lists contribute nothing.
    pub fn neighbors(&self) -> impl Iterator<Item = Uuid> + '_ {
        let forward = self.user_subscribed_to.iter().flatten();
        let backward = self.subscribed_to_user.iter().flatten();
        forward.chain(backward).copied()
    }
}

/// Raw batch results for one resolution, keyed by user.
#[derive(Debug, Default)]
pub struct GraphParts {
    pub users: HashMap<Uuid, Result<Option<User>, LoadError>>,
    pub edges: HashMap<Uuid, Edges>,
}

/// A user with whatever relations were resolved for it. `None` means not loaded.
#[derive(Clone, Debug)]
pub struct UserNode {
    pub user: User,
    pub posts: Option<Result<Vec<Post>, LoadError>>,
    pub profile: Option<Result<Option<Profile>, LoadError>>,
    pub user_subscribed_to: Option<Result<Vec<UserNode>, LoadError>>,
    pub subscribed_to_user: Option<Result<Vec<UserNode>, LoadError>>,
}

impl UserNode {
    #[must_use]
    pub fn leaf(user: User) -> Self {
        Self {
            user,
            posts: None,
            profile: None,
            user_subscribed_to: None,
            subscribed_to_user: None,
        }
    }
}

impl GraphParts {
    /// Builds the nested tree rooted at `root`. Users at a level up to `depth` carry their
    /// lists; deeper users are leaves. Every occurrence of a user is its own copy, and list
    /// order follows the store.
    #[must_use]
    pub fn assemble(&self, root: Uuid, root_user: &User, depth: usize) -> UserNode {
        self.node(root, root_user, 0, depth)
    }

    fn node(&self, id: Uuid, user: &User, level: usize, depth: usize) -> UserNode {
        let mut node = UserNode::leaf(user.clone());
        if level > depth {
            return node;
        }
        if let Some(edges) = self.edges.get(&id) {
            node.user_subscribed_to = Some(self.list(&edges.user_subscribed_to, level, depth));
            node.subscribed_to_user = Some(self.list(&edges.subscribed_to_user, level, depth));
        }
        node
    }

    fn list(
        &self,
        ids: &Result<Vec<Uuid>, LoadError>,
        level: usize,
        depth: usize,
    ) -> Result<Vec<UserNode>, LoadError> {
        let ids = ids.as_ref().map_err(Clone::clone)?;
        let mut nodes = Vec::with_capacity(ids.len());
        for id in ids {
            match self.users.get(id) {
                Some(Ok(Some(user))) => nodes.push(self.node(*id, user, level + 1, depth)),
                Some(Err(error)) => return Err(error.clone()),
                Some(Ok(None)) | None => log::warn!("Subscription points at missing user {}", id),
            }
        }
        Ok(nodes)
    }
}
