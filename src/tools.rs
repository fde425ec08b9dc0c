// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Executable and shared-library resolution.

use crate::error::Result;
use crate::exec::{CommandRunner, trim_command_output};
use crate::os::{Arch, OsFamily, classify_architecture};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of the Erlang escript runner this crate's host tooling launches.
pub const ESCRIPT_NAME: &str = "escript";

/// Locate an executable on the search PATH. `None` when not found.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Locate an executable searching only the given directory.
pub fn find_executable_in(name: &str, dir: &Path) -> Option<PathBuf> {
    which::which_in(name, Some(dir), dir).ok()
}

/// Decorate an executable name for the given OS family.
///
/// Windows appends `.exe` unless the name already ends in `.bat` or `.exe`;
/// every other family returns the name unchanged.
pub fn executable_name(os: OsFamily, name: &str) -> String {
    if !os.is_windows() {
        return name.to_string();
    }

    if name.ends_with(".bat") || name.ends_with(".exe") {
        name.to_string()
    } else {
        format!("{name}.exe")
    }
}

/// Result of an escript lookup, tagged with where the search was rooted.
///
/// `Explicit` results come from a caller-supplied Erlang root; `Default`
/// results come from the install-root fallback and may still be empty.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EscriptLookup {
    Explicit(PathBuf),
    Default(Option<PathBuf>),
}

/// Locate the escript executable.
///
/// With an explicit Erlang root the lookup is confined to `<root>/bin`; when
/// nothing is found there a single fallback consults the default install
/// root. Without a root the default lookup is used directly.
pub fn locate_escript(os: OsFamily, root: Option<&Path>, install_root: &Path) -> EscriptLookup {
    let name = executable_name(os, ESCRIPT_NAME);

    match root {
        Some(root) => match find_executable_in(&name, &root.join("bin")) {
            Some(path) => EscriptLookup::Explicit(path),
            None => default_escript_executable(os, install_root),
        },
        None => default_escript_executable(os, install_root),
    }
}

/// Search `<install_root>/bin` for escript, tagging the result as
/// default-sourced so callers can tell it apart from an explicit-root hit.
pub fn default_escript_executable(os: OsFamily, install_root: &Path) -> EscriptLookup {
    let name = executable_name(os, ESCRIPT_NAME);
    EscriptLookup::Default(find_executable_in(&name, &install_root.join("bin")))
}

/// A shared library found beneath a search directory.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LibraryInfo {
    /// Directory the search was rooted at.
    pub search_path: PathBuf,
    /// First matching file encountered during the walk.
    pub found_file: PathBuf,
    /// Architecture classified from `file` output for the found file.
    pub architecture: Arch,
}

/// Recursively search `search_path` for a file matching the shell-style
/// wildcard `name_pattern` (`*` and `?`).
///
/// Returns `Ok(None)` when nothing matches. The first match in traversal
/// order wins; the order is filesystem-dependent but deterministic for a
/// given snapshot. The architecture of the match is classified from the
/// output of `file <path>`.
pub fn locate_library(
    runner: &dyn CommandRunner,
    search_path: &Path,
    name_pattern: &str,
) -> Result<Option<LibraryInfo>> {
    let pattern = wildcard_pattern(name_pattern);

    for entry in WalkDir::new(search_path) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        if pattern.is_match(&entry.file_name().to_string_lossy()) {
            let found_file = entry.into_path();
            log::debug!("Found library candidate {}", found_file.display());

            let os = OsFamily::current();
            let description = trim_command_output(
                os,
                &runner.run("file", &[found_file.to_string_lossy().as_ref()])?,
            );
            let architecture = classify_architecture(&description)?;

            return Ok(Some(LibraryInfo {
                search_path: search_path.to_path_buf(),
                found_file,
                architecture,
            }));
        }
    }

    Ok(None)
}

fn wildcard_pattern(pattern: &str) -> Regex {
    let mut regex = String::with_capacity(pattern.len() + 8);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => regex.push_str(&regex::escape(&other.to_string())),
        }
    }
    regex.push('$');

    Regex::new(&regex).expect("wildcard pattern")
}

/// Name of the dynamic-library search-path variable for an OS family.
pub fn library_path_env_var(os: OsFamily) -> &'static str {
    match os {
        OsFamily::Windows => "LIB",
        OsFamily::Darwin => "DYLD_LIBRARY_PATH",
        OsFamily::OtherUnix => "LD_LIBRARY_PATH",
    }
}

/// Separator used in PATH-like variable lists for an OS family.
pub fn path_separator(os: OsFamily) -> &'static str {
    if os.is_windows() { ";" } else { ":" }
}

/// Compute the load-path variable update that puts `candidate` first.
///
/// Returns the variable name and its new value: `candidate` alone when the
/// variable is unset, otherwise `candidate` prepended to the current list.
/// The variable and separator are resolved from the compile target here,
/// independently of [`library_path_env_var`]; the two tables evolve
/// separately (note that Windows uses `PATH` here, not `LIB`).
pub fn compute_load_path(candidate: &str) -> (String, String) {
    let (name, separator) = load_path_variable();

    let value = match env::var(name) {
        Ok(existing) => format!("{candidate}{separator}{existing}"),
        Err(_) => candidate.to_string(),
    };

    (name.to_string(), value)
}

fn load_path_variable() -> (&'static str, &'static str) {
    #[cfg(windows)]
    return ("PATH", ";");
    #[cfg(target_os = "macos")]
    return ("DYLD_LIBRARY_PATH", ":");
    #[cfg(not(any(windows, target_os = "macos")))]
    return ("LD_LIBRARY_PATH", ":");
}
