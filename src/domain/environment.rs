//! Environment lookups used for constraint overrides.

use std::collections::HashMap;
use std::ffi::OsString;

/// Read-only view of environment variables.
///
/// Values are returned raw; callers decide what to do with non-UTF-8 content.
pub trait Environment {
    fn var(&self, key: &str) -> Option<OsString>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<OsString> {
        std::env::var_os(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<OsString> {
        self.get(key).map(OsString::from)
    }
}

impl<F> Environment for F
where
    F: Fn(&str) -> Option<OsString>,
{
    fn var(&self, key: &str) -> Option<OsString> {
        self(key)
    }
}
