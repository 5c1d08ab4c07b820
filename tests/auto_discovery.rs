use ferrous_ioc::{
    interface, param, value_enum, Container, ContainerOptions, DiError, Injectable, Lifetime, ResolutionFailure,
    TypeDescriptor, Value, ValueType,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use url::Url;

trait Notifier: Send + Sync {
    fn notify(&self) -> &'static str;
}
interface!(dyn Notifier);

#[derive(Debug)]
struct EmailNotifier;

impl Notifier for EmailNotifier {
    fn notify(&self) -> &'static str {
        "email"
    }
}

impl Injectable for EmailNotifier {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .default_constructor(|| EmailNotifier)
            .implements::<dyn Notifier>(|this| this)
            .build()
    }
}

#[derive(Debug)]
struct Settings {
    retries: u32,
    verbose: bool,
    title: String,
    ratio: f64,
    initial: char,
    optional: Option<String>,
    tags: Vec<String>,
}

impl Injectable for Settings {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor(
                [
                    param::<u32>("retries"),
                    param::<bool>("verbose"),
                    param::<String>("title"),
                    param::<f64>("ratio"),
                    param::<char>("initial"),
                    param::<Option<String>>("optional"),
                    param::<Vec<String>>("tags"),
                ],
                |args| {
                    Ok(Settings {
                        retries: args.value(0)?,
                        verbose: args.value(1)?,
                        title: args.value(2)?,
                        ratio: args.value(3)?,
                        initial: args.value(4)?,
                        optional: args.value(5)?,
                        tags: args.value(6)?,
                    })
                },
            )
            .build()
    }
}

static REPORTER_BUILDS: AtomicUsize = AtomicUsize::new(0);

#[derive(Debug)]
struct Reporter {
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for dyn Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.notify())
    }
}

impl Injectable for Reporter {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<dyn Notifier>("notifier")], |args| {
                REPORTER_BUILDS.fetch_add(1, Ordering::SeqCst);
                Ok(Reporter {
                    notifier: args.service(0)?,
                })
            })
            .build()
    }
}

#[derive(Debug)]
struct Endpoint {
    url: Url,
}

impl Injectable for Endpoint {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<Url>("url")], |args| Ok(Endpoint { url: args.value(0)? }))
            .build()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Theme {
    Light,
    Dark,
}
value_enum!(Theme { Light, Dark });

#[derive(Debug)]
struct Appearance {
    theme: Theme,
}

impl Injectable for Appearance {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::builder::<Self>()
            .constructor([param::<Theme>("theme")], |args| Ok(Appearance { theme: args.value(0)? }))
            .build()
    }
}

fn reason(err: DiError) -> ResolutionFailure {
    match err {
        DiError::ResolutionFailed { reason, .. } => reason,
        other => panic!("expected a resolution failure, got {}", other),
    }
}

#[test]
fn test_concrete_type_is_registered_on_first_use() {
    let container = Container::new();
    assert!(!container.is_registered::<EmailNotifier>());

    let first = container.get_instance::<EmailNotifier>().unwrap();
    assert_eq!(first.notify(), "email");

    let registration = container.registration::<EmailNotifier>(None).unwrap();
    assert!(registration.is_auto_registered());
    assert_eq!(registration.lifetime(), Lifetime::Transient);

    let second = container.get_instance::<EmailNotifier>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn test_named_lookup_auto_registers_that_name() {
    let container = Container::new();
    container.get_instance_named::<EmailNotifier>("backup").unwrap();
    assert!(container.is_registered_named::<EmailNotifier>("backup"));
    assert!(!container.is_registered::<EmailNotifier>());
}

#[test]
fn test_abstract_type_is_never_auto_registered() {
    let container = Container::new();
    let err = container.get_instance::<dyn Notifier>().unwrap_err();
    assert_eq!(reason(err), ResolutionFailure::AbstractType);
    assert!(!container.is_registered::<dyn Notifier>());
}

#[test]
fn test_abstract_parameter_needs_a_registration() {
    let container = Container::new();
    let err = container.get_instance::<Reporter>().unwrap_err();
    assert_eq!(
        reason(err),
        ResolutionFailure::UnresolvableParameter {
            parameter: "notifier",
            type_name: std::any::type_name::<dyn Notifier>(),
        }
    );

    container
        .register_type::<dyn Notifier, EmailNotifier>()
        .unwrap();
    let reporter = container.get_instance::<Reporter>().unwrap();
    assert_eq!(reporter.notifier.notify(), "email");
}

#[test]
fn test_value_type_is_not_auto_registered() {
    let container = Container::new();
    let err = container.get_instance::<String>().unwrap_err();
    assert_eq!(reason(err), ResolutionFailure::NotRegistered);
}

#[test]
fn test_disabled_discovery_reports_type_and_name() {
    let container = Container::with_options(ContainerOptions::new().auto_discovery(false));

    let err = container.get_instance_named::<EmailNotifier>("primary").unwrap_err();
    assert!(err.to_string().contains("EmailNotifier"));
    assert!(err.to_string().contains("primary"));
    assert_eq!(reason(err), ResolutionFailure::NotRegistered);

    // Toggling at runtime takes effect on the next call.
    container.set_auto_discovery(true);
    assert!(container.get_instance_named::<EmailNotifier>("primary").is_ok());
}

#[test]
fn test_defaults_for_every_value_kind() {
    let container = Container::new();
    let settings = container.get_instance::<Settings>().unwrap();

    assert_eq!(settings.retries, 0);
    assert!(!settings.verbose);
    assert_eq!(settings.title, "");
    assert_eq!(settings.ratio, 0.0);
    assert_eq!(settings.initial, '\0');
    assert_eq!(settings.optional, None);
    assert!(settings.tags.is_empty());

    let registration = container.registration::<Settings>(None).unwrap();
    assert_eq!(registration.values().len(), 7);
    assert_eq!(registration.value("retries"), Some(Value::UInt(0)));
    assert_eq!(registration.value("optional"), Some(Value::Null));
}

#[test]
fn test_literals_override_defaults() {
    let container = Container::new();
    container
        .register::<Settings>()
        .unwrap()
        .with_value("retries", 3u32)
        .with_value("title", "Inbox")
        .with_value("optional", Some("set"))
        .with_value("tags", vec!["a", "b"]);

    let settings = container.get_instance::<Settings>().unwrap();
    assert_eq!(settings.retries, 3);
    assert_eq!(settings.title, "Inbox");
    assert_eq!(settings.optional.as_deref(), Some("set"));
    assert_eq!(settings.tags, vec!["a".to_string(), "b".to_string()]);
    assert!(!settings.verbose);
}

#[test]
fn test_remembered_default_is_reused_even_after_registering_a_value() {
    let container = Container::new();
    container.register::<Settings>().unwrap();
    container.get_instance::<Settings>().unwrap();

    // The remembered literal now wins over the newer registration.
    container.register_instance::<u32>(Arc::new(9)).unwrap();
    assert_eq!(container.get_instance::<Settings>().unwrap().retries, 0);
}

#[test]
fn test_missing_values_fail_without_discovery() {
    let container = Container::with_options(ContainerOptions::new().auto_discovery(false));
    container.register::<Settings>().unwrap();
    let err = container.get_instance::<Settings>().unwrap_err();
    assert_eq!(
        reason(err),
        ResolutionFailure::UnresolvableParameter {
            parameter: "retries",
            type_name: "u32",
        }
    );
    assert!(container.registration::<Settings>(None).unwrap().values().is_empty());
}

#[test]
fn test_null_default_for_required_url_is_an_invalid_argument() {
    let container = Container::new();
    let err = container.get_instance::<Endpoint>().unwrap_err();
    assert!(matches!(
        reason(err),
        ResolutionFailure::InvalidArgument { parameter: "url", .. }
    ));

    assert_eq!(
        container.registration::<Endpoint>(None).unwrap().value("url"),
        Some(Value::Null)
    );

    let container = Container::new();
    container
        .register::<Endpoint>()
        .unwrap()
        .with_value("url", Url::parse("https://example.com/api").unwrap());
    let endpoint = container.get_instance::<Endpoint>().unwrap();
    assert_eq!(endpoint.url.host_str(), Some("example.com"));
}

#[test]
fn test_enum_defaults_to_first_variant() {
    let container = Container::new();
    assert_eq!(container.get_instance::<Appearance>().unwrap().theme, Theme::Light);

    let container = Container::new();
    container.register::<Appearance>().unwrap().with_value("theme", Theme::Dark.into_value());
    assert_eq!(container.get_instance::<Appearance>().unwrap().theme, Theme::Dark);
}

#[test]
fn test_reporter_is_built_once_per_resolution() {
    let container = Container::new();
    container.register_instance::<dyn Notifier>(Arc::new(EmailNotifier)).unwrap();
    let before = REPORTER_BUILDS.load(Ordering::SeqCst);
    container.get_instance::<Reporter>().unwrap();
    container.get_instance::<Reporter>().unwrap();
    assert!(REPORTER_BUILDS.load(Ordering::SeqCst) >= before + 2);
}
