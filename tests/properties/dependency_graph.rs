//! Property tests for the frozen dependency graph.

use indexmap::IndexMap;
use proptest::prelude::*;

use assetplan::domain::services::DependencyGraph;

/// Edges only point at lower-numbered assets, so the graph is acyclic
fn acyclic() -> impl Strategy<Value = IndexMap<String, Vec<String>>> {
    (1usize..10).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(any::<prop::sample::Index>(), 0..4), n)
            .prop_map(move |edges| {
                edges
                    .into_iter()
                    .enumerate()
                    .map(|(i, targets)| {
                        let deps = if i == 0 {
                            Vec::new()
                        } else {
                            let mut deps: Vec<String> = Vec::new();
                            for t in targets {
                                let dep = format!("a{}", t.index(i));
                                if !deps.contains(&dep) {
                                    deps.push(dep);
                                }
                            }
                            deps
                        };
                        (format!("a{}", i), deps)
                    })
                    .collect()
            })
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: load order lists every dependency before its dependents,
    /// each asset once, and ends with the requested asset.
    #[test]
    fn property_load_order_is_topological(
        deps in acyclic()
    ) {
        let graph = DependencyGraph::build(&deps).unwrap();
        for name in deps.keys() {
            let order = graph.load_order(name).unwrap();
            prop_assert_eq!(order.last().copied(), Some(name.as_str()));

            let mut unique = order.clone();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(unique.len(), order.len());

            let mut expected = graph.closure(name).unwrap();
            expected.push(name.as_str());
            expected.sort_unstable();
            prop_assert_eq!(unique, expected);

            for (pos, asset) in order.iter().enumerate() {
                for dep in &deps[*asset] {
                    let dep_pos = order.iter().position(|a| *a == dep.as_str()).unwrap();
                    prop_assert!(dep_pos < pos, "{} must load before {}", dep, asset);
                }
            }
        }
    }

    /// PROPERTY: closing any chain into a loop means there is no graph.
    #[test]
    fn property_cycles_never_build(
        n in 1usize..8
    ) {
        let mut deps: IndexMap<String, Vec<String>> = (0..n)
            .map(|i| {
                let next = if i + 1 < n { vec![format!("a{}", i + 1)] } else { Vec::new() };
                (format!("a{}", i), next)
            })
            .collect();
        deps[n - 1].push("a0".to_string());

        let errors = DependencyGraph::build(&deps).unwrap_err();
        prop_assert!(!errors.is_empty());
    }
}
