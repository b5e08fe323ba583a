//! Containment for user callbacks.
//!
//! Callbacks run while the registry lock is held. Panics are converted into
//! errors so the lock is never poisoned by user code, and each thread tracks
//! which handlers it is currently inside so a callback that calls back into
//! its own handler is rejected instead of deadlocking on the lock.

use std::any::Any;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

thread_local! {
    static ACTIVE_HANDLERS: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Whether the current thread is inside a callback of the given handler.
pub(crate) fn is_reentrant(owner: usize) -> bool {
    ACTIVE_HANDLERS.with(|active| active.borrow().contains(&owner))
}

struct Scope;

impl Scope {
    fn enter(owner: usize) -> Self {
        ACTIVE_HANDLERS.with(|active| active.borrow_mut().push(owner));
        Scope
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        ACTIVE_HANDLERS.with(|active| {
            active.borrow_mut().pop();
        });
    }
}

/// Run a user callback on behalf of `owner` while the registry lock is held,
/// converting panics into errors.
pub(crate) fn invoke<R>(owner: usize, f: impl FnOnce() -> anyhow::Result<R>) -> anyhow::Result<R> {
    let _scope = Scope::enter(owner);
    contain(f)
}

/// Run a user callback that holds no handler lock, converting panics into
/// errors. The callback may call back into the handler.
pub(crate) fn contain<R>(f: impl FnOnce() -> anyhow::Result<R>) -> anyhow::Result<R> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(anyhow::anyhow!(
            "callback panicked: {}",
            panic_message(payload.as_ref())
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_passes_through_results() {
        assert_eq!(invoke(1, || Ok(7)).unwrap(), 7);
        let err = invoke::<()>(1, || anyhow::bail!("nope")).unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn invoke_converts_panics() {
        let err = invoke::<()>(1, || panic!("boom")).unwrap_err();
        assert_eq!(err.to_string(), "callback panicked: boom");
        assert!(!is_reentrant(1));
    }

    #[test]
    fn contain_does_not_mark_reentrancy() {
        contain(|| {
            assert!(!is_reentrant(1));
            Ok(())
        })
        .unwrap();
        let err = contain::<()>(|| panic!("{}", String::from("owned"))).unwrap_err();
        assert_eq!(err.to_string(), "callback panicked: owned");
    }

    #[test]
    fn reentrancy_is_tracked_per_owner() {
        invoke(10, || {
            assert!(is_reentrant(10));
            assert!(!is_reentrant(11));
            invoke(11, || {
                assert!(is_reentrant(10));
                assert!(is_reentrant(11));
                Ok(())
            })
        })
        .unwrap();
        assert!(!is_reentrant(10));
        assert!(!is_reentrant(11));
    }
}
