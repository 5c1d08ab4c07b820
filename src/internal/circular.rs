//! Circular dependency detection.
//!
//! Each thread keeps a stack of the keys currently under construction, tagged
//! with the id of the container doing the work. Re-entering a key that is
//! already on the stack for the same container is a cycle; growing past the
//! configured depth is reported as well, so unbounded auto-discovery chains
//! fail with an error instead of exhausting the call stack.

use std::cell::RefCell;

use crate::error::{DiError, DiResult, ResolutionFailure};
use crate::key::Key;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<(usize, Key)>> = const { RefCell::new(Vec::new()) };
}

/// Marks a key as under construction until dropped.
#[must_use]
pub(crate) struct StackGuard {
    container: usize,
    key: Key,
}

impl StackGuard {
    /// Pushes `key`, failing on a cycle or when `max_depth` keys of this
    /// container are already being constructed.
    pub(crate) fn enter(container: usize, key: Key, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();

            if let Some(start) = stack
                .iter()
                .position(|(owner, k)| *owner == container && *k == key)
            {
                let path = stack[start..]
                    .iter()
                    .filter(|(owner, _)| *owner == container)
                    .map(|(_, k)| k.to_string())
                    .chain(std::iter::once(key.to_string()))
                    .collect();
                return Err(DiError::resolution(key, ResolutionFailure::Circular(path)));
            }

            let depth = stack.iter().filter(|(owner, _)| *owner == container).count();
            if depth >= max_depth {
                return Err(DiError::resolution(
                    key,
                    ResolutionFailure::DepthExceeded(max_depth),
                ));
            }

            stack.push((container, key));
            Ok(Self { container, key })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(pos) = stack
                .iter()
                .rposition(|(owner, k)| *owner == self.container && *k == self.key)
            {
                stack.remove(pos);
            }
        });
    }
}

/// Number of keys currently under construction on this thread for `container`.
pub(crate) fn depth(container: usize) -> usize {
    RESOLUTION_STACK.with(|stack| {
        stack
            .borrow()
            .iter()
            .filter(|(owner, _)| *owner == container)
            .count()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    #[test]
    fn test_reentry_reports_path() {
        let _a = StackGuard::enter(1, Key::of::<A>(), 8).unwrap();
        let _b = StackGuard::enter(1, Key::of::<B>(), 8).unwrap();

        let err = match StackGuard::enter(1, Key::of::<A>(), 8) {
            Err(e) => e,
            Ok(_) => panic!("cycle not detected"),
        };
        match err {
            DiError::ResolutionFailed {
                reason: ResolutionFailure::Circular(path),
                ..
            } => {
                assert_eq!(path.len(), 3);
                assert!(path[0].contains("::A"));
                assert!(path[1].contains("::B"));
                assert!(path[2].contains("::A"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_other_container_is_independent() {
        let _outer = StackGuard::enter(10, Key::of::<A>(), 8).unwrap();
        let inner = StackGuard::enter(11, Key::of::<A>(), 8);
        assert!(inner.is_ok());
        assert_eq!(depth(10), 1);
        assert_eq!(depth(11), 1);
    }

    #[test]
    fn test_depth_limit_and_unwind() {
        {
            let _a = StackGuard::enter(20, Key::of::<A>(), 1).unwrap();
            let err = StackGuard::enter(20, Key::named::<A>("other"), 1).err().unwrap();
            assert!(matches!(
                err,
                DiError::ResolutionFailed {
                    reason: ResolutionFailure::DepthExceeded(1),
                    ..
                }
            ));
        }
        assert_eq!(depth(20), 0);
    }
}
