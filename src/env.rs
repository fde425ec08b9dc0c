//! Process environment access.
//!
//! Listing lower-cases variable names while single-variable reads upper-case
//! the requested name before consulting the real environment. The asymmetry
//! is deliberate: callers query with friendly lower-case keys (`"path"`) and
//! receive lower-case keys back from [`environment_variables`], while the
//! actual lookup always targets the conventional upper-case name.

use crate::error::{ProbeError, Result};
use std::env;

/// Every process environment entry as a `(name, value)` pair with the name
/// lower-cased. Each raw `NAME=value` entry is split on the first `=` only;
/// order is whatever the underlying environment listing yields.
pub fn environment_variables() -> Result<Vec<(String, String)>> {
    env::vars_os()
        .map(|(name, value)| {
            let mut raw = name.to_string_lossy().into_owned();
            raw.push('=');
            raw.push_str(&value.to_string_lossy());
            split_entry(&raw)
        })
        .collect()
}

/// Split one raw `NAME=value` environment entry on its first `=`.
///
/// `"NAME=value=with=equals"` yields `("name", "value=with=equals")`.
pub fn split_entry(raw: &str) -> Result<(String, String)> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| ProbeError::MalformedEnvironmentEntry(raw.to_string()))?;

    Ok((name.to_lowercase(), value.to_string()))
}

/// Read a single variable, upper-casing `name` before the lookup.
/// Returns `None` when unset; absence is never an error.
pub fn var(name: impl AsRef<str>) -> Option<String> {
    env::var(name.as_ref().to_uppercase()).ok()
}

/// Same lookup as [`var`], substituting `default` when the variable is unset.
pub fn var_or(name: impl AsRef<str>, default: impl Into<String>) -> String {
    var(name).unwrap_or_else(|| default.into())
}
