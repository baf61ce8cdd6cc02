//! Environment variables for tests.
//!
//! Tests run on parallel threads and the process environment is shared.
//! Every test in this crate that reads or writes a variable does so through
//! [`ScopedEnv`], which holds [`ENV_LOCK`] for its whole lifetime.

use std::sync::{Mutex, MutexGuard, PoisonError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive access to the environment; variables it touched are removed on
/// drop.
pub(crate) struct ScopedEnv {
    touched: Vec<&'static str>,
    _lock: MutexGuard<'static, ()>,
}

impl ScopedEnv {
    pub(crate) fn lock() -> Self {
        Self {
            touched: Vec::new(),
            _lock: ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner),
        }
    }

    pub(crate) fn set(mut self, name: &'static str, value: &str) -> Self {
        // SAFETY: ENV_LOCK is held, and no other test in this crate touches
        // the environment without it.
        unsafe { std::env::set_var(name, value) };
        self.touched.push(name);
        self
    }

    pub(crate) fn unset(mut self, name: &'static str) -> Self {
        // SAFETY: as in `set`.
        unsafe { std::env::remove_var(name) };
        self.touched.push(name);
        self
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for name in &self.touched {
            // SAFETY: as in `set`; the lock is released after this runs.
            unsafe { std::env::remove_var(name) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_env_removes_on_drop() {
        {
            let _env = ScopedEnv::lock().set("RELMARK_TEST_SCOPED_ENV", "1");
            assert_eq!(std::env::var("RELMARK_TEST_SCOPED_ENV").as_deref(), Ok("1"));
        }
        let _env = ScopedEnv::lock();
        assert!(std::env::var("RELMARK_TEST_SCOPED_ENV").is_err());
    }
}
