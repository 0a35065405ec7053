//! Permission resolver over users and loaded groups.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;

use super::config::ResolverConfig;
use super::types::Tristate;
use crate::cache::GroupCache;
use crate::model::{Node, QueryContext, User};

/// Resolves inherited groups and effective permissions.
///
/// Groups are looked up by name on every call; the resolver holds no group
/// itself. A group that is referenced but not loaded still counts as a
/// membership but contributes no nodes and no parents.
#[derive(Debug)]
pub struct PermissionResolver {
    groups: Arc<GroupCache>,
    config: ResolverConfig,
}

impl PermissionResolver {
    /// Creates a resolver with the default configuration.
    pub fn new(groups: Arc<GroupCache>) -> Self {
        Self::with_config(groups, ResolverConfig::default())
    }

    /// Creates a resolver with the given configuration.
    pub fn with_config(groups: Arc<GroupCache>, config: ResolverConfig) -> Self {
        Self { groups, config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Groups `user` belongs to in `ctx`, directly or through inheritance,
    /// in breadth-first resolution order.
    ///
    /// Cycles are cut by tracking visited groups. Groups further than
    /// `max_depth` hops from the user are not followed.
    pub fn inherited_groups(&self, user: &User, ctx: &QueryContext) -> Vec<String> {
        let mut resolved = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, u32)> = granted_groups(&user.nodes(), ctx)
            .map(|group| (group, 1))
            .collect();

        while let Some((name, depth)) = queue.pop_front() {
            if !visited.insert(name.clone()) {
                continue;
            }
            resolved.push(name.clone());

            let Some(group) = self.groups.get_group(&name) else {
                continue;
            };
            if depth >= self.config.max_depth {
                debug!(
                    group = %name,
                    max_depth = self.config.max_depth,
                    "group inheritance depth limit reached"
                );
                continue;
            }
            queue.extend(granted_groups(&group.nodes(), ctx).map(|parent| (parent, depth + 1)));
        }

        resolved
    }

    /// Checks `permission` for `user` in `ctx`.
    pub fn check(&self, user: &User, permission: &str, ctx: &QueryContext) -> Tristate {
        let own = decide(&user.nodes(), permission, ctx);
        if own != Tristate::Undefined {
            return own;
        }

        for name in self.inherited_groups(user, ctx) {
            if let Some(group) = self.groups.get_group(&name) {
                let inherited = decide(&group.nodes(), permission, ctx);
                if inherited != Tristate::Undefined {
                    return inherited;
                }
            }
        }

        Tristate::Undefined
    }

    /// Every permission decided for `user` in `ctx`, keyed by lowercased
    /// permission. Resolution order matches [`PermissionResolver::check`].
    pub fn effective_permissions(&self, user: &User, ctx: &QueryContext) -> BTreeMap<String, bool> {
        let mut effective = BTreeMap::new();
        merge_source(&mut effective, &user.nodes(), ctx);

        for name in self.inherited_groups(user, ctx) {
            if let Some(group) = self.groups.get_group(&name) {
                merge_source(&mut effective, &group.nodes(), ctx);
            }
        }

        effective
    }
}

/// Names of groups granted (value true) by applicable nodes.
fn granted_groups<'a>(
    nodes: &'a [Node],
    ctx: &'a QueryContext,
) -> impl Iterator<Item = String> + 'a {
    nodes
        .iter()
        .filter(move |node| node.value() && node.applies_to(ctx))
        .filter_map(Node::group_name)
}

/// Scope rank; higher is more specific.
fn specificity(node: &Node) -> u8 {
    (node.is_server_specific() as u8) * 2 + node.is_world_specific() as u8
}

/// Decides `permission` from one source's nodes.
fn decide(nodes: &[Node], permission: &str, ctx: &QueryContext) -> Tristate {
    nodes
        .iter()
        .filter(|node| node.matches_permission(permission) && node.applies_to(ctx))
        // Among equally specific nodes the denial sorts last and wins.
        .max_by_key(|node| (specificity(node), !node.value()))
        .map_or(Tristate::Undefined, |node| Tristate::from(node.value()))
}

/// Adds the permissions decided by one source that earlier sources left
/// undecided.
fn merge_source(effective: &mut BTreeMap<String, bool>, nodes: &[Node], ctx: &QueryContext) {
    let mut decided: BTreeMap<String, bool> = BTreeMap::new();
    for node in nodes.iter().filter(|node| node.applies_to(ctx)) {
        let permission = node.permission().to_lowercase();
        if !decided.contains_key(&permission) {
            let decision = decide(nodes, &permission, ctx);
            if let Some(value) = decision.as_bool() {
                decided.insert(permission, value);
            }
        }
    }
    for (permission, value) in decided {
        effective.entry(permission).or_insert(value);
    }
}
