//! Property-based tests for model types.

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use uuid::Uuid;

    use crate::model::{Node, User, UserIdentifier};

    /// Strategy to generate dotted permission strings like "essentials.fly"
    fn permission_strategy() -> impl Strategy<Value = String> {
        ("[a-z]{1,10}", "[a-z0-9]{1,10}").prop_map(|(plugin, perm)| format!("{plugin}.{perm}"))
    }

    /// Strategy to generate mixed-case names
    fn name_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_]{0,15}"
    }

    proptest! {
        #[test]
        fn test_key_is_case_insensitive(permission in permission_strategy()) {
            let lower = Node::builder(permission.to_lowercase()).build().unwrap();
            let upper = Node::builder(permission.to_uppercase()).build().unwrap();
            prop_assert_eq!(lower.key(), upper.key());
        }

        #[test]
        fn test_group_node_names_round_trip(name in "[a-z][a-z0-9_]{0,15}") {
            let node = Node::group(&name).unwrap();
            prop_assert!(node.is_group_node());
            prop_assert_eq!(node.group_name(), Some(name));
        }

        #[test]
        fn test_plain_permissions_are_not_group_nodes(permission in permission_strategy()) {
            prop_assume!(!permission.starts_with("group."));
            let node = Node::builder(&permission).build().unwrap();
            prop_assert!(!node.is_group_node());
        }

        #[test]
        fn test_name_matching_ignores_case(name in name_strategy()) {
            let user = User::new(UserIdentifier::named(Uuid::new_v4(), name.clone()));
            prop_assert!(user.name_matches(&name.to_lowercase()));
            prop_assert!(user.name_matches(&name.to_uppercase()));
        }
    }
}
