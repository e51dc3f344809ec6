//! Serialized environment-variable mutation for tests.
//!
//! Config loading reads process-global environment variables, so tests that
//! override them must not interleave. [`env_lock`] serializes those tests and
//! [`EnvGuard`] rolls each override back on drop.

use std::sync::{Mutex, OnceLock};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Process-wide mutex serializing environment mutation across test threads.
pub fn env_lock() -> &'static Mutex<()> {
    ENV_MUTEX.get_or_init(|| Mutex::new(()))
}

/// Scoped environment override that restores the prior state on drop.
///
/// Hold the [`env_lock`] guard for as long as any [`EnvGuard`] is alive;
/// the guard itself does not lock.
pub struct EnvGuard {
    name: String,
    saved: Option<String>,
}

impl EnvGuard {
    /// Override `name` with `value` until the guard drops.
    pub fn set(name: &str, value: &str) -> Self {
        let guard = Self::capture(name);
        apply(name, Some(value));
        guard
    }

    /// Unset `name` until the guard drops.
    pub fn remove(name: &str) -> Self {
        let guard = Self::capture(name);
        apply(name, None);
        guard
    }

    fn capture(name: &str) -> Self {
        Self {
            name: name.to_string(),
            saved: std::env::var(name).ok(),
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        apply(&self.name, self.saved.as_deref());
    }
}

// std::env mutation is `unsafe` on newer toolchains; callers serialize via
// env_lock, which is the soundness condition the API asks for.
#[allow(unused_unsafe)]
fn apply(name: &str, value: Option<&str>) {
    match value {
        Some(value) => unsafe { std::env::set_var(name, value) },
        None => unsafe { std::env::remove_var(name) },
    }
}

#[cfg(test)]
mod tests {
    use super::{env_lock, EnvGuard};

    #[test]
    fn nested_overrides_unwind_in_order() {
        let _lock = env_lock().lock().expect("env lock");
        let name = "NOTEMARK_ENV_UNWIND";
        let _outer = EnvGuard::set(name, "outer");
        {
            let _inner = EnvGuard::set(name, "inner");
            assert_eq!(std::env::var(name).ok().as_deref(), Some("inner"));
        }
        assert_eq!(std::env::var(name).ok().as_deref(), Some("outer"));
    }

    #[test]
    fn removal_of_an_unset_variable_round_trips() {
        let _lock = env_lock().lock().expect("env lock");
        let name = "NOTEMARK_ENV_UNSET";
        {
            let _gone = EnvGuard::remove(name);
            assert!(std::env::var(name).is_err());
        }
        assert!(std::env::var(name).is_err());
    }

    #[test]
    fn set_guard_restores_a_previously_missing_variable() {
        let _lock = env_lock().lock().expect("env lock");
        let name = "NOTEMARK_ENV_FRESH";
        {
            let _fresh = EnvGuard::set(name, "present");
            assert_eq!(std::env::var(name).ok().as_deref(), Some("present"));
        }
        assert!(std::env::var(name).is_err());
    }
}
