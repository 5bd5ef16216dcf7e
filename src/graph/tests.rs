use std::sync::Arc;

use uuid::Uuid;

use super::*;
use crate::models::MemberTypeId;
use crate::store::memory::StoreCall;
use crate::store::MemoryStore;

fn resolver(store: &Arc<MemoryStore>, depth: usize) -> GraphResolver {
    GraphResolver::new(store.clone(), GraphSettings { depth })
}

fn names(list: &Option<Result<Vec<UserNode>, LoadError>>) -> Vec<String> {
    list.as_ref()
        .expect("list was not loaded")
        .as_ref()
        .expect("list failed to load")
        .iter()
        .map(|node| node.user.name.clone())
        .collect()
}

async fn resolve_found(store: &Arc<MemoryStore>, root: Uuid, depth: usize) -> (UserNode, Resolution) {
    let mut resolution = resolver(store, depth).resolve(root).await.unwrap();
    let outcome = std::mem::replace(&mut resolution.outcome, GraphOutcome::NotFound);
    (outcome.into_node().expect("root should exist"), resolution)
}

#[tokio::test]
async fn shared_second_degree_neighbor_is_fetched_once() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    let b = store.add_user("b").await;
    let c = store.add_user("c").await;
    let d = store.add_user("d").await;
    store.subscribe(a, b).await;
    store.subscribe(a, c).await;
    store.subscribe(b, d).await;
    store.subscribe(c, d).await;

    let (root, resolution) = resolve_found(&store, a, 1).await;

    assert_eq!(names(&root.user_subscribed_to), vec!["b", "c"]);
    assert!(names(&root.subscribed_to_user).is_empty());
    for neighbor in root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap() {
        assert_eq!(names(&neighbor.user_subscribed_to), vec!["d"]);
        assert_eq!(names(&neighbor.subscribed_to_user), vec!["a"]);
        let leaf = &neighbor.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
        assert!(leaf.user_subscribed_to.is_none());
        assert!(leaf.subscribed_to_user.is_none());
    }

    assert_eq!(
        store.entity_calls(EntityKind::User).await,
        vec![vec![a], vec![b, c], vec![d]]
    );
    assert_eq!(resolution.stats.rounds, 4);
}

#[tokio::test]
async fn second_level_lookups_cover_distinct_neighbors_only() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    let b = store.add_user("b").await;
    let c = store.add_user("c").await;
    let d = store.add_user("d").await;
    // a follows b and c; b and d follow a; b is in both directions
    store.subscribe(a, b).await;
    store.subscribe(a, c).await;
    store.subscribe(b, a).await;
    store.subscribe(d, a).await;

    let (root, _) = resolve_found(&store, a, 1).await;

    assert_eq!(names(&root.user_subscribed_to), vec!["b", "c"]);
    assert_eq!(names(&root.subscribed_to_user), vec!["b", "d"]);
    for relation in &[Relation::UserSubscribedTo, Relation::SubscribedToUser] {
        let calls = store.related_calls(*relation).await;
        assert_eq!(calls, vec![vec![a], vec![b, c, d]]);
    }
    // b appears under both lists with the same relation membership
    let b_forward = &root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    let b_backward = &root.subscribed_to_user.as_ref().unwrap().as_ref().unwrap()[0];
    assert_eq!(names(&b_forward.user_subscribed_to), vec!["a"]);
    assert_eq!(names(&b_backward.user_subscribed_to), vec!["a"]);
    assert_eq!(names(&b_backward.subscribed_to_user), vec!["a"]);
}

#[tokio::test]
async fn missing_root_issues_no_relation_lookups() {
    let store = MemoryStore::new_shared();
    store.add_user("someone").await;
    let ghost = Uuid::new_v4();

    let resolution = resolver(&store, 1).resolve(ghost).await.unwrap();

    assert!(matches!(resolution.outcome, GraphOutcome::NotFound));
    assert_eq!(
        resolution.trace,
        vec![ResolutionState::Pending, ResolutionState::NotFound]
    );
    assert_eq!(store.calls().await.len(), 1);
    assert!(store.related_calls(Relation::UserSubscribedTo).await.is_empty());
    assert!(store.related_calls(Relation::SubscribedToUser).await.is_empty());
}

#[tokio::test]
async fn isolated_user_gets_empty_lists() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;

    let (root, resolution) = resolve_found(&store, a, 1).await;

    assert!(names(&root.user_subscribed_to).is_empty());
    assert!(names(&root.subscribed_to_user).is_empty());
    assert_eq!(store.related_calls(Relation::UserSubscribedTo).await, vec![vec![a]]);
    assert_eq!(store.related_calls(Relation::SubscribedToUser).await, vec![vec![a]]);
    // the root's posts and profile are one lookup each, part of fetching the root
    assert_eq!(store.related_calls(Relation::AuthoredPosts).await, vec![vec![a]]);
    assert_eq!(store.related_calls(Relation::OwnedProfile).await, vec![vec![a]]);
    let relation_calls = store
        .calls()
        .await
        .into_iter()
        .filter(|call| matches!(call, StoreCall::Related { .. }))
        .count();
    assert_eq!(relation_calls, 4);
    assert_eq!(store.calls().await.len(), 5);
    assert_eq!(
        resolution.trace,
        vec![
            ResolutionState::Pending,
            ResolutionState::RootFetched,
            ResolutionState::NeighborsRequested,
            ResolutionState::NeighborsExpanded,
            ResolutionState::Assembled,
        ]
    );
    assert!(resolution.trace.last().unwrap().is_terminal());
}

#[tokio::test]
async fn self_subscription_is_not_expanded_twice() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    store.subscribe(a, a).await;

    let (root, _) = resolve_found(&store, a, 1).await;

    assert_eq!(names(&root.user_subscribed_to), vec!["a"]);
    assert_eq!(names(&root.subscribed_to_user), vec!["a"]);
    let itself = &root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    assert_eq!(names(&itself.user_subscribed_to), vec!["a"]);
    assert_eq!(store.related_calls(Relation::UserSubscribedTo).await, vec![vec![a]]);
    assert_eq!(store.entity_calls(EntityKind::User).await, vec![vec![a]]);
}

#[tokio::test]
async fn failed_neighbor_lookup_leaves_other_branches_intact() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    let b = store.add_user("b").await;
    let c = store.add_user("c").await;
    store.subscribe(a, b).await;
    store.subscribe(c, a).await;
    store.fail_related_for(Relation::UserSubscribedTo, b).await;

    let (root, _) = resolve_found(&store, a, 1).await;

    assert_eq!(names(&root.user_subscribed_to), vec!["b"]);
    assert_eq!(names(&root.subscribed_to_user), vec!["c"]);
    let b_node = &root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    assert!(matches!(
        b_node.user_subscribed_to,
        Some(Err(LoadError::Store(_)))
    ));
    assert_eq!(names(&b_node.subscribed_to_user), vec!["a"]);
    // c shared the failed group with b
    let c_node = &root.subscribed_to_user.as_ref().unwrap().as_ref().unwrap()[0];
    assert!(matches!(
        c_node.user_subscribed_to,
        Some(Err(LoadError::Store(_)))
    ));
    assert!(c_node.subscribed_to_user.as_ref().unwrap().is_ok());
}

#[tokio::test]
async fn root_lookup_failure_is_an_error() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    store.fail_kind(EntityKind::User).await;

    let result = resolver(&store, 1).resolve(a).await;

    assert!(matches!(result, Err(LoadError::Store(_))));
}

#[tokio::test]
async fn root_details_are_preloaded() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    store.add_post(a, "first").await;
    store.add_post(a, "second").await;
    store.add_profile(a, MemberTypeId::Business).await;

    let (root, resolution) = resolve_found(&store, a, 1).await;

    let titles: Vec<String> = root
        .posts
        .unwrap()
        .unwrap()
        .into_iter()
        .map(|post| post.title)
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
    let profile = root.profile.unwrap().unwrap().unwrap();
    assert_eq!(profile.member_type_id, "business");
    assert_eq!(store.related_calls(Relation::AuthoredPosts).await.len(), 1);
    assert_eq!(store.entity_calls(EntityKind::Post).await.len(), 1);
    // posts and profile ride along with the subscription rounds
    assert_eq!(resolution.stats.rounds, 3);
}

#[tokio::test]
async fn failed_posts_do_not_affect_subscriptions() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    let b = store.add_user("b").await;
    store.subscribe(a, b).await;
    store.fail_relation(Relation::AuthoredPosts).await;

    let (root, _) = resolve_found(&store, a, 1).await;

    assert!(matches!(root.posts, Some(Err(_))));
    assert!(matches!(root.profile, Some(Ok(None))));
    assert_eq!(names(&root.user_subscribed_to), vec!["b"]);
}

#[tokio::test]
async fn depth_bounds_expansion() {
    let store = MemoryStore::new_shared();
    let a = store.add_user("a").await;
    let b = store.add_user("b").await;
    let c = store.add_user("c").await;
    let d = store.add_user("d").await;
    store.subscribe(a, b).await;
    store.subscribe(b, c).await;
    store.subscribe(c, d).await;

    let (root, _) = resolve_found(&store, a, 0).await;
    let b_node = &root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    assert!(b_node.user_subscribed_to.is_none());
    assert_eq!(store.related_calls(Relation::UserSubscribedTo).await, vec![vec![a]]);

    let deeper = MemoryStore::new_shared();
    let a = deeper.add_user("a").await;
    let b = deeper.add_user("b").await;
    let c = deeper.add_user("c").await;
    let d = deeper.add_user("d").await;
    deeper.subscribe(a, b).await;
    deeper.subscribe(b, c).await;
    deeper.subscribe(c, d).await;

    let (root, _) = resolve_found(&deeper, a, 2).await;
    let b_node = &root.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    let c_node = &b_node.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    assert_eq!(names(&c_node.user_subscribed_to), vec!["d"]);
    let d_node = &c_node.user_subscribed_to.as_ref().unwrap().as_ref().unwrap()[0];
    assert!(d_node.user_subscribed_to.is_none());
    assert_eq!(
        deeper.related_calls(Relation::UserSubscribedTo).await,
        vec![vec![a], vec![b], vec![c]]
    );
}

#[test]
fn only_forward_transitions_are_legal() {
    use ResolutionState::*;
    assert!(Pending.can_advance_to(RootFetched));
    assert!(Pending.can_advance_to(NotFound));
    assert!(NeighborsExpanded.can_advance_to(Assembled));
    assert!(!RootFetched.can_advance_to(NotFound));
    assert!(!Assembled.can_advance_to(Pending));
    assert!(NotFound.is_terminal());
}
