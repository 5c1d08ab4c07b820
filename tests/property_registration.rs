/// Property-based tests for registration and resolution invariants.
///
/// Names come from a fixed pool because registration names are `'static`.
use ferrous_ioc::{param, Container, ContainerOptions, Injectable, TypeDescriptor};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

const NAMES: [&str; 8] = ["alpha", "beta", "gamma", "delta", "epsilon", "zeta", "eta", "theta"];

#[derive(Debug, Clone)]
struct Tagged {
    id: u32,
}

impl Injectable for Tagged {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<u32>("id")], |args| Ok(Tagged { id: args.value(0)? }))
            .build()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Register(usize),
    Unregister(usize),
    Resolve(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..NAMES.len()).prop_map(Op::Register),
        (0..NAMES.len()).prop_map(Op::Unregister),
        (0..NAMES.len()).prop_map(Op::Resolve),
    ]
}

proptest! {
    #[test]
    fn registry_matches_a_set_model(ops in prop::collection::vec(op(), 1..40)) {
        let container = Container::with_options(ContainerOptions::new().auto_discovery(false));
        let mut model = HashSet::new();

        for op in ops {
            match op {
                Op::Register(i) => {
                    let result = container.register_instance_named(NAMES[i], Arc::new(Tagged { id: i as u32 }));
                    prop_assert_eq!(result.is_ok(), model.insert(i));
                }
                Op::Unregister(i) => {
                    prop_assert_eq!(container.unregister_named::<Tagged>(NAMES[i]), model.remove(&i));
                    prop_assert!(!container.is_cached_named::<Tagged>(NAMES[i]));
                }
                Op::Resolve(i) => {
                    let resolved = container.get_instance_named::<Tagged>(NAMES[i]);
                    prop_assert_eq!(resolved.is_ok(), model.contains(&i));
                    if let Ok(tagged) = resolved {
                        prop_assert_eq!(tagged.id, i as u32);
                        prop_assert!(container.is_cached_named::<Tagged>(NAMES[i]));
                    }
                }
            }
        }

        for (i, name) in NAMES.iter().enumerate() {
            prop_assert_eq!(container.is_registered_named::<Tagged>(name), model.contains(&i));
        }
        prop_assert_eq!(container.registrations().len(), model.len());
    }
}

proptest! {
    #[test]
    fn get_all_follows_registration_order(picks in prop::collection::btree_set(0..NAMES.len(), 1..NAMES.len())) {
        let container = Container::new();
        let order: Vec<usize> = picks.iter().rev().copied().collect();
        for &i in &order {
            container.register_instance_named(NAMES[i], Arc::new(Tagged { id: i as u32 })).unwrap();
        }

        let ids: Vec<u32> = container
            .get_all_instances::<Tagged>()
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        let expected: Vec<u32> = order.iter().map(|&i| i as u32).collect();
        prop_assert_eq!(ids, expected);
    }
}

proptest! {
    #[test]
    fn literal_reaches_the_constructor(id in any::<u32>(), singleton in any::<bool>()) {
        let container = Container::new();
        let options = container.register::<Tagged>().unwrap().with_value("id", id);
        if singleton {
            options.as_singleton();
        }

        let first = container.get_instance::<Tagged>().unwrap();
        let second = container.get_instance::<Tagged>().unwrap();
        prop_assert_eq!(first.id, id);
        prop_assert_eq!(Arc::ptr_eq(&first, &second), singleton);
    }
}

proptest! {
    #[test]
    fn unregister_all_clears_every_name(picks in prop::collection::btree_set(0..NAMES.len(), 0..NAMES.len())) {
        let container = Container::new();
        for &i in &picks {
            container
                .register_named::<Tagged>(NAMES[i])
                .unwrap()
                .as_singleton()
                .with_value("id", i as u32);
            container.get_instance_named::<Tagged>(NAMES[i]).unwrap();
        }

        prop_assert_eq!(container.unregister_all::<Tagged>(), picks.len());
        let left: BTreeSet<usize> = (0..NAMES.len())
            .filter(|&i| container.is_registered_named::<Tagged>(NAMES[i]) || container.is_cached_named::<Tagged>(NAMES[i]))
            .collect();
        prop_assert!(left.is_empty());
    }
}
