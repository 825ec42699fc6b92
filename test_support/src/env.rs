//! Scoped environment overrides.
//!
//! Configuration is read from `CRUDCHECK_*` variables, which are
//! process-global. [`ScopedEnv`] holds a crate-wide lock for its whole
//! lifetime, applies any number of overrides, and puts every variable back
//! the way it found it when dropped.

use std::{
    ffi::{OsStr, OsString},
    fmt,
    sync::{Mutex, MutexGuard, PoisonError},
};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive, self-restoring view of the process environment.
///
/// # Examples
///
/// ```
/// use test_support::env::ScopedEnv;
///
/// let mut env = ScopedEnv::lock();
/// env.set("CRUDCHECK_BASE_URL", "http://127.0.0.1:9");
/// env.remove("CRUDCHECK_VERBOSE");
/// assert_eq!(
///     std::env::var("CRUDCHECK_BASE_URL").ok().as_deref(),
///     Some("http://127.0.0.1:9")
/// );
/// drop(env);
/// ```
#[must_use]
pub struct ScopedEnv {
    saved: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl fmt::Debug for ScopedEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedEnv")
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

impl ScopedEnv {
    /// Block until no other `ScopedEnv` is alive, then take ownership.
    pub fn lock() -> Self {
        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        Self {
            saved: Vec::new(),
            _guard: guard,
        }
    }

    /// Set `name` to `value` until this scope ends.
    pub fn set(&mut self, name: &str, value: impl AsRef<OsStr>) -> &mut Self {
        self.remember(name);
        // SAFETY: the held lock serialises every mutation made through this type.
        unsafe { std::env::set_var(name, value.as_ref()) };
        self
    }

    /// Unset `name` until this scope ends.
    pub fn remove(&mut self, name: &str) -> &mut Self {
        self.remember(name);
        // SAFETY: the held lock serialises every mutation made through this type.
        unsafe { std::env::remove_var(name) };
        self
    }

    fn remember(&mut self, name: &str) {
        if self.saved.iter().all(|(saved, _)| saved != name) {
            self.saved.push((name.to_owned(), std::env::var_os(name)));
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (name, previous) in self.saved.drain(..).rev() {
            // SAFETY: the lock is still held while the originals are restored.
            unsafe {
                match previous {
                    Some(value) => std::env::set_var(&name, value),
                    None => std::env::remove_var(&name),
                }
            }
        }
    }
}
