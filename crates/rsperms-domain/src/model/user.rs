//! The user entity.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Node, NodeSet, UserIdentifier};
use crate::error::DomainResult;

/// A cached user: identity plus a lock-guarded permission state.
///
/// Every read-modify-write of the node set or primary group happens under
/// the per-user lock, so changes made from the primary and background
/// contexts never interleave. Reads hand out copies.
#[derive(Debug)]
pub struct User {
    id: UserIdentifier,
    state: RwLock<UserState>,
}

/// Mutable state of a user, only reachable through the user's lock.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserState {
    pub(crate) name: Option<String>,
    pub(crate) nodes: NodeSet,
    pub(crate) primary_group: Option<String>,
}

impl UserState {
    /// Returns true if the primary group is set and a permanent group node
    /// exists.
    pub(crate) fn has_permanent_group(&self) -> bool {
        self.primary_group.as_deref().is_some_and(|g| !g.is_empty())
            && self
                .nodes
                .iter()
                .any(|node| !node.is_temporary() && node.is_group_node())
    }
}

/// Owned copy of a user's state at one instant.
///
/// Saves persist snapshots, so a save reflects the state that existed when
/// it was initiated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSnapshot {
    pub unique_id: Uuid,
    pub name: Option<String>,
    pub primary_group: Option<String>,
    pub nodes: Vec<Node>,
}

impl User {
    /// Creates a user with empty state. The display name is taken from the
    /// identifier.
    pub fn new(id: UserIdentifier) -> Self {
        let state = UserState {
            name: id.display_name().map(str::to_string),
            ..UserState::default()
        };
        Self {
            id,
            state: RwLock::new(state),
        }
    }

    /// Returns the identifier the user was created with.
    pub fn id(&self) -> &UserIdentifier {
        &self.id
    }

    /// Returns the internal unique id.
    pub fn unique_id(&self) -> Uuid {
        self.id.unique_id()
    }

    /// Returns the current display name.
    pub fn name(&self) -> Option<String> {
        self.read().name.clone()
    }

    /// Returns true if the display name equals `name`, ignoring case.
    pub fn name_matches(&self, name: &str) -> bool {
        self.read()
            .name
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == name.to_lowercase())
    }

    /// Updates the display name.
    pub fn set_name(&self, name: impl Into<String>) {
        self.write().name = Some(name.into());
    }

    /// Returns the primary group.
    pub fn primary_group(&self) -> Option<String> {
        self.read().primary_group.clone()
    }

    /// Sets the primary group.
    pub fn set_primary_group(&self, group: impl Into<String>) {
        self.write().primary_group = Some(group.into());
    }

    /// Returns every node.
    pub fn nodes(&self) -> Vec<Node> {
        self.read().nodes.to_vec()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.read().nodes.len()
    }

    /// Returns the permanent (non-expiring) nodes.
    pub fn permanent_nodes(&self) -> Vec<Node> {
        self.filtered_nodes(|node| !node.is_temporary())
    }

    /// Returns the temporary (expiring) nodes.
    pub fn temporary_nodes(&self) -> Vec<Node> {
        self.filtered_nodes(Node::is_temporary)
    }

    /// Names of groups this user is directly a member of, through granted
    /// group nodes of any scope.
    pub fn group_names(&self) -> Vec<String> {
        self.read()
            .nodes
            .iter()
            .filter(|node| node.value())
            .filter_map(Node::group_name)
            .collect()
    }

    /// Returns true if the user holds `node` with the same value.
    pub fn has_node(&self, node: &Node) -> bool {
        self.read().nodes.contains(node)
    }

    /// Adds a node. See [`NodeSet::insert`].
    pub fn set_permission(&self, node: Node) -> DomainResult<()> {
        self.write().nodes.insert(node)
    }

    /// Removes a node. See [`NodeSet::remove`].
    pub fn unset_permission(&self, node: &Node) -> DomainResult<()> {
        self.write().nodes.remove(node).map(|_| ())
    }

    /// Removes every node. The primary group is kept.
    pub fn clear_nodes(&self) {
        self.write().nodes.clear();
    }

    /// Replaces the whole state at once, as done when data is loaded from
    /// storage. A `None` name keeps the current one.
    pub fn replace_data(
        &self,
        name: Option<String>,
        primary_group: Option<String>,
        nodes: impl IntoIterator<Item = Node>,
    ) {
        let nodes: NodeSet = nodes.into_iter().collect();
        let mut state = self.write();
        if name.is_some() {
            state.name = name;
        }
        state.primary_group = primary_group;
        state.nodes = nodes;
    }

    /// Removes expired temporary nodes, returning how many were dropped.
    pub fn audit_temporary_permissions(&self, now: DateTime<Utc>) -> usize {
        self.write().nodes.remove_expired(now)
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> UserSnapshot {
        let state = self.read();
        UserSnapshot {
            unique_id: self.unique_id(),
            name: state.name.clone(),
            primary_group: state.primary_group.clone(),
            nodes: state.nodes.to_vec(),
        }
    }

    fn filtered_nodes(&self, predicate: impl Fn(&Node) -> bool) -> Vec<Node> {
        self.read()
            .nodes
            .iter()
            .filter(|node| predicate(node))
            .cloned()
            .collect()
    }

    // A panic while holding the lock cannot leave the state half-written:
    // every mutation is a single assignment or NodeSet call.
    pub(crate) fn read(&self) -> RwLockReadGuard<'_, UserState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, UserState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;
    use chrono::Duration;

    fn user(name: &str) -> User {
        User::new(UserIdentifier::named(Uuid::new_v4(), name))
    }

    #[test]
    fn test_new_user_has_empty_state() {
        let user = user("Alice");
        assert_eq!(user.name().as_deref(), Some("Alice"));
        assert_eq!(user.primary_group(), None);
        assert_eq!(user.node_count(), 0);
    }

    #[test]
    fn test_name_matches_ignores_case() {
        let user = user("Alice");
        assert!(user.name_matches("alice"));
        assert!(user.name_matches("ALICE"));
        assert!(!user.name_matches("alicia"));

        let nameless = User::new(UserIdentifier::of(Uuid::new_v4()));
        assert!(!nameless.name_matches(""));
    }

    #[test]
    fn test_set_permission_twice_fails() {
        let user = user("Alice");
        user.set_permission(Node::group("default").unwrap()).unwrap();
        let result = user.set_permission(Node::group("default").unwrap());
        assert!(matches!(result, Err(DomainError::NodeAlreadyPresent { .. })));
        assert_eq!(user.node_count(), 1);
    }

    #[test]
    fn test_permanent_and_temporary_views() {
        let user = user("Alice");
        let expiry = Utc::now() + Duration::hours(1);
        user.set_permission(Node::group("default").unwrap()).unwrap();
        user.set_permission(
            Node::builder("group.vip")
                .expiry(expiry)
                .build()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(user.permanent_nodes().len(), 1);
        assert_eq!(user.temporary_nodes().len(), 1);
        assert_eq!(user.temporary_nodes()[0].group_name().as_deref(), Some("vip"));
    }

    #[test]
    fn test_group_names_skip_negated_nodes() {
        let user = user("Alice");
        user.set_permission(Node::group("staff").unwrap()).unwrap();
        user.set_permission(
            Node::builder("group.banned")
                .value(false)
                .build()
                .unwrap(),
        )
        .unwrap();
        user.set_permission(Node::builder("essentials.fly").build().unwrap())
            .unwrap();

        assert_eq!(user.group_names(), vec!["staff".to_string()]);
    }

    #[test]
    fn test_replace_data_swaps_state() {
        let user = user("Alice");
        user.set_permission(Node::builder("a.b").build().unwrap())
            .unwrap();

        user.replace_data(
            None,
            Some("admin".to_string()),
            vec![Node::group("admin").unwrap()],
        );

        assert_eq!(user.name().as_deref(), Some("Alice"));
        assert_eq!(user.primary_group().as_deref(), Some("admin"));
        assert_eq!(user.nodes(), vec![Node::group("admin").unwrap()]);
    }

    #[test]
    fn test_audit_removes_expired_nodes() {
        let user = user("Alice");
        let now = Utc::now();
        user.set_permission(
            Node::builder("a.b")
                .expiry(now - Duration::seconds(10))
                .build()
                .unwrap(),
        )
        .unwrap();
        user.set_permission(Node::builder("c.d").build().unwrap())
            .unwrap();

        assert_eq!(user.audit_temporary_permissions(now), 1);
        assert_eq!(user.node_count(), 1);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let user = user("Alice");
        user.set_primary_group("default");
        user.set_permission(Node::group("default").unwrap()).unwrap();

        let snapshot = user.snapshot();
        user.clear_nodes();

        assert_eq!(snapshot.unique_id, user.unique_id());
        assert_eq!(snapshot.nodes.len(), 1);
        assert_eq!(user.node_count(), 0);
    }

    #[test]
    fn test_has_permanent_group_requires_primary_group() {
        let user = user("Alice");
        user.set_permission(Node::group("admin").unwrap()).unwrap();
        assert!(!user.read().has_permanent_group());

        user.set_primary_group("");
        assert!(!user.read().has_permanent_group());

        user.set_primary_group("admin");
        assert!(user.read().has_permanent_group());
    }
}
