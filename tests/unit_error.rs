/// Unit tests for DiError, its failure reasons and DiResult.
use ferrous_ioc::{DiError, DiResult, Key, RegistrationFailure, ResolutionFailure};
use std::error::Error;

#[test]
fn test_error_display_duplicate() {
    let error = DiError::registration(Key::named::<u32>("port"), RegistrationFailure::Duplicate);
    assert_eq!(
        error.to_string(),
        "Registration failed for u32 [port]: key is already registered"
    );
    assert!(error.is_registration_failure());
    assert!(!error.is_resolution_failure());
}

#[test]
fn test_error_display_not_registered_uses_default_sentinel() {
    let error = DiError::resolution(Key::of::<String>(), ResolutionFailure::NotRegistered);
    assert_eq!(
        error.to_string(),
        "Resolution failed for alloc::string::String [<default>]: type is not registered"
    );
    assert!(error.is_resolution_failure());
}

#[test]
fn test_error_display_not_assignable() {
    let error = DiError::registration(
        Key::of::<u8>(),
        RegistrationFailure::NotAssignable {
            implementation: "app::Widget",
        },
    );
    assert!(error
        .to_string()
        .ends_with("app::Widget is not assignable to the requested type"));
}

#[test]
fn test_error_display_unresolvable_parameter() {
    let reason = ResolutionFailure::UnresolvableParameter {
        parameter: "repository",
        type_name: "dyn app::Repository",
    };
    assert_eq!(
        reason.to_string(),
        "cannot resolve parameter 'repository' of type dyn app::Repository"
    );
}

#[test]
fn test_error_display_invalid_argument() {
    let reason = ResolutionFailure::InvalidArgument {
        index: 2,
        parameter: "retries",
        message: "literal \"x\" cannot be read as u32".to_string(),
    };
    let display = reason.to_string();
    assert!(display.starts_with("argument 2 ('retries'): "));
    assert!(display.contains("u32"));
}

#[test]
fn test_error_display_circular() {
    let reason = ResolutionFailure::Circular(vec!["A".into(), "B".into(), "A".into()]);
    assert_eq!(reason.to_string(), "circular dependency: A -> B -> A");

    let empty = ResolutionFailure::Circular(vec![]);
    assert_eq!(empty.to_string(), "circular dependency: ");
}

#[test]
fn test_error_display_depth_exceeded() {
    assert_eq!(
        ResolutionFailure::DepthExceeded(64).to_string(),
        "max resolution depth 64 exceeded"
    );
}

#[test]
fn test_error_key_accessor() {
    let key = Key::named::<u64>("timeout");
    let error = DiError::resolution(key, ResolutionFailure::NotCached);
    assert_eq!(*error.key(), key);
    assert_eq!(error.key().name(), Some("timeout"));
}

#[test]
fn test_diresult_err() {
    let result: DiResult<String> = Err(DiError::resolution(
        Key::of::<String>(),
        ResolutionFailure::TypeMismatch {
            expected: "alloc::string::String",
        },
    ));

    match result {
        Err(DiError::ResolutionFailed {
            reason: ResolutionFailure::TypeMismatch { expected },
            ..
        }) => assert_eq!(expected, "alloc::string::String"),
        _ => panic!("Expected TypeMismatch"),
    }
}

#[test]
fn test_error_clone_and_debug() {
    let error = DiError::resolution(Key::of::<i32>(), ResolutionFailure::ContainerDropped);
    let cloned = error.clone();
    assert_eq!(error.to_string(), cloned.to_string());

    let debug = format!("{:?}", error);
    assert!(debug.contains("ResolutionFailed"));
    assert!(debug.contains("ContainerDropped"));
}

#[test]
fn test_error_as_std_error() {
    let error = DiError::resolution(Key::of::<i32>(), ResolutionFailure::AbstractType);
    let _: &dyn Error = &error;
    assert!(error.source().is_none());
}
