use ferrous_ioc::{
    param, ActivationKind, ActivationStrategy, ActivatorCache, AnyService, Arguments, Container, ContainerOptions,
    DiError, DiResult, Injectable, ResolutionFailure, TypeDescriptor, TypeInformation,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Engine {
    cylinders: u8,
}

impl Injectable for Engine {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<u8>("cylinders")], |args| {
                Ok(Engine {
                    cylinders: args.value(0)?,
                })
            })
            .build()
    }
}

#[derive(Debug)]
struct Car {
    engine: Arc<Engine>,
    model: String,
}

impl Injectable for Car {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<Engine>("engine"), param::<String>("model")], |args| {
                Ok(Car {
                    engine: args.service(0)?,
                    model: args.value(1)?,
                })
            })
            .build()
    }
}

fn reason(err: DiError) -> ResolutionFailure {
    match err {
        DiError::ResolutionFailed { reason, .. } => reason,
        other => panic!("expected a resolution failure, got {}", other),
    }
}

fn configured(kind: ActivationKind) -> Container {
    let container = Container::with_options(ContainerOptions::new().activation(kind));
    container.register::<Engine>().unwrap().with_value("cylinders", 6u8);
    container.register::<Car>().unwrap().with_value("model", "Roadster");
    container
}

#[test]
fn test_both_strategies_build_the_same_graph() {
    for kind in [ActivationKind::Compiled, ActivationKind::Reflective] {
        let container = configured(kind);
        let car = container.get_instance::<Car>().unwrap();
        assert_eq!(car.engine.cylinders, 6, "{:?}", kind);
        assert_eq!(car.model, "Roadster", "{:?}", kind);
    }
}

#[test]
fn test_only_compiled_activation_fills_the_cache() {
    let reflective = configured(ActivationKind::Reflective);
    reflective.get_instance::<Car>().unwrap();
    assert!(reflective.activators().is_empty());

    let compiled = configured(ActivationKind::Compiled);
    compiled.get_instance::<Car>().unwrap();
    compiled.get_instance::<Car>().unwrap();
    assert_eq!(compiled.activators().len(), 2);
}

#[test]
fn test_switching_strategies_keeps_activators() {
    let container = configured(ActivationKind::Compiled);
    container.get_instance::<Car>().unwrap();
    let compiled = container.activators().len();

    container.set_activation(ActivationKind::Reflective);
    assert_eq!(container.activation_strategy_name(), "reflective");
    let car = container.get_instance::<Car>().unwrap();
    assert_eq!(car.model, "Roadster");
    assert_eq!(container.activators().len(), compiled);

    container.set_activation(ActivationKind::Compiled);
    container.get_instance::<Car>().unwrap();
    assert_eq!(container.activators().len(), compiled);
}

#[test]
fn test_wrong_literal_shape_is_an_invalid_argument() {
    for kind in [ActivationKind::Compiled, ActivationKind::Reflective] {
        let container = configured(kind);
        container.unregister::<Car>();
        container
            .register::<Car>()
            .unwrap()
            .with_value("engine", "not an engine")
            .with_value("model", "Roadster");

        match reason(container.get_instance::<Car>().unwrap_err()) {
            ResolutionFailure::InvalidArgument { index, parameter, .. } => {
                assert_eq!(index, 0, "{:?}", kind);
                assert_eq!(parameter, "engine", "{:?}", kind);
            }
            other => panic!("{:?}: unexpected {:?}", kind, other),
        }
    }
}

#[test]
fn test_out_of_range_literal() {
    let container = Container::new();
    container.register::<Engine>().unwrap().with_value("cylinders", 300u32);
    assert!(matches!(
        reason(container.get_instance::<Engine>().unwrap_err()),
        ResolutionFailure::InvalidArgument { parameter: "cylinders", .. }
    ));
}

struct Counting {
    calls: AtomicUsize,
}

impl ActivationStrategy for Counting {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn create_instance(
        &self,
        info: &TypeInformation,
        arguments: &Arguments,
        activators: &ActivatorCache,
    ) -> DiResult<AnyService> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        activators.get_or_compile(info.constructor()).activate(arguments)
    }
}

#[test]
fn test_custom_strategy() {
    let container = configured(ActivationKind::Compiled);
    let strategy = Arc::new(Counting {
        calls: AtomicUsize::new(0),
    });
    container.set_activation_strategy(strategy.clone());
    assert_eq!(container.activation_strategy_name(), "counting");

    container.get_instance::<Car>().unwrap();
    // Car and its Engine.
    assert_eq!(strategy.calls.load(Ordering::SeqCst), 2);
}

#[derive(Debug)]
struct Gauge {
    origin: &'static str,
}

impl Injectable for Gauge {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .non_public_constructor([param::<u8>("calibration")], |_| Ok(Gauge { origin: "hidden" }))
            .build()
    }
}

#[derive(Debug)]
struct Meter {
    origin: &'static str,
}

impl Injectable for Meter {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .default_constructor(|| Meter { origin: "public" })
            .non_public_constructor([param::<u8>("a"), param::<u8>("b")], |_| Ok(Meter { origin: "hidden" }))
            .build()
    }
}

#[test]
fn test_non_public_constructors_need_opt_in() {
    let container = Container::new();
    assert_eq!(
        reason(container.get_instance::<Gauge>().unwrap_err()),
        ResolutionFailure::NoEligibleConstructor
    );
    assert_eq!(container.get_instance::<Meter>().unwrap().origin, "public");

    container.set_allow_non_public_constructors(true);
    assert_eq!(container.get_instance::<Gauge>().unwrap().origin, "hidden");
    assert_eq!(container.get_instance::<Meter>().unwrap().origin, "hidden");

    container.set_allow_non_public_constructors(false);
    assert_eq!(container.get_instance::<Meter>().unwrap().origin, "public");
}

#[derive(Debug)]
struct Report {
    chosen: &'static str,
}

impl Injectable for Report {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<String>("title"), param::<u32>("pages")], |_| {
                Ok(Report { chosen: "widest" })
            })
            .preferred_constructor([param::<String>("title")], |_| Ok(Report { chosen: "preferred" }))
            .build()
    }
}

#[derive(Debug)]
struct Ledger {
    chosen: &'static str,
}

impl Injectable for Ledger {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<u32>("year")], |_| Ok(Ledger { chosen: "first" }))
            .constructor([param::<String>("owner")], |_| Ok(Ledger { chosen: "second" }))
            .build()
    }
}

#[test]
fn test_constructor_selection() {
    let container = Container::new();
    assert_eq!(container.get_instance::<Report>().unwrap().chosen, "preferred");
    assert_eq!(container.get_instance::<Ledger>().unwrap().chosen, "first");
}
