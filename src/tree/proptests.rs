use std::sync::Arc;

use proptest::prelude::*;

use super::Node;
use super::test_support::check_invariants;
use crate::context::Params;

fn static_path() -> impl Strategy<Value = String> {
    (prop::collection::vec("[a-c]{1,3}", 1..4), any::<bool>()).prop_map(|(segments, trailing)| {
        let mut path = format!("/{}", segments.join("/"));
        if trailing {
            path.push('/');
        }
        path
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn static_routes_match_themselves(paths in prop::collection::btree_set(static_path(), 1..40)) {
        let paths: Vec<String> = paths.into_iter().collect();
        let mut root = Node::root();
        for (i, path) in paths.iter().enumerate() {
            prop_assert!(root.add_route(path, Arc::from(vec![i])).is_ok(), "inserting {}", path);
        }
        prop_assert_eq!(check_invariants(&root) as usize, paths.len());

        let mut stack = Vec::new();
        for (i, path) in paths.iter().enumerate() {
            let value = root.get_value(path, None, &mut stack, false);
            prop_assert_eq!(value.handlers.map(|h| h[0]), Some(i));
            prop_assert_eq!(value.full_path, Some(path.as_str()));
        }
    }

    #[test]
    fn static_siblings_shadow_params(
        prefixes in prop::collection::btree_set("[a-c]{1,3}", 1..5),
        literals in prop::collection::btree_set("[a-f]{1,3}", 1..5),
        value in "[a-f]{1,4}",
    ) {
        let mut routes = Vec::new();
        for prefix in &prefixes {
            routes.push(format!("/{prefix}/:id"));
            for literal in &literals {
                routes.push(format!("/{prefix}/{literal}"));
            }
        }

        let mut root = Node::root();
        for (i, route) in routes.iter().enumerate() {
            prop_assert!(root.add_route(route, Arc::from(vec![i])).is_ok(), "inserting {}", route);
        }
        check_invariants(&root);

        let mut params = Params::new();
        let mut stack = Vec::new();
        for prefix in &prefixes {
            let path = format!("/{prefix}/{value}");
            let found = root.get_value(&path, Some(&mut params), &mut stack, false);
            if literals.contains(&value) {
                prop_assert_eq!(found.full_path, Some(path.as_str()));
                prop_assert!(params.is_empty());
            } else {
                let pattern = format!("/{prefix}/:id");
                prop_assert_eq!(found.full_path, Some(pattern.as_str()));
                prop_assert_eq!(params.get("id"), Some(value.as_str()));
            }
        }
    }

    #[test]
    fn lookups_are_repeatable(
        paths in prop::collection::btree_set(static_path(), 1..20),
        probe in static_path(),
    ) {
        let mut root = Node::root();
        for (i, path) in paths.iter().enumerate() {
            prop_assert!(root.add_route(path, Arc::from(vec![i])).is_ok());
        }

        let mut stack = Vec::new();
        let first = root.get_value(&probe, None, &mut stack, false);
        let (handlers, tsr) = (first.handlers.map(|h| h[0]), first.tsr);
        for _ in 0..3 {
            let again = root.get_value(&probe, None, &mut stack, false);
            prop_assert_eq!(again.handlers.map(|h| h[0]), handlers);
            prop_assert_eq!(again.tsr, tsr);
        }
    }
}
