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

//! Filesystem root resolution from launch metadata.
//!
//! All root derivation flows from an immutable [`LaunchContext`] established
//! once at startup, so concurrent callers cannot race on mode or directory
//! state.

use crate::error::{ProbeError, Result};
use crate::exec::{CommandRunner, trim_command_output};
use crate::os::OsFamily;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the code directory.
pub const CODE_DIR_ENV: &str = "SYSPROBE_CODE_DIR";

pub const BUILD_DIR: &str = "build";
pub const CACHE_DIR: &str = "cache";

/// How the current program was launched; affects root derivation only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Running as a packaged, self-contained executable.
    Standalone,
    /// Running as a script interpreted in place.
    Scripted,
}

/// Immutable launch metadata captured once at startup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LaunchContext {
    home: Option<PathBuf>,
    script_path: PathBuf,
    working_dir: PathBuf,
    mode: RuntimeMode,
}

impl LaunchContext {
    pub fn new(
        home: Option<PathBuf>,
        script_path: PathBuf,
        working_dir: PathBuf,
        mode: RuntimeMode,
    ) -> Self {
        Self {
            home,
            script_path,
            working_dir,
            mode,
        }
    }

    /// Capture launch metadata from the running process.
    pub fn from_process(mode: RuntimeMode) -> Result<Self> {
        Ok(Self {
            home: dirs::home_dir(),
            script_path: env::current_exe()?,
            working_dir: env::current_dir()?,
            mode,
        })
    }

    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// The invoking user's home directory. Absence is a hard failure, not a
    /// default.
    pub fn home_directory(&self) -> Result<PathBuf> {
        self.home.clone().ok_or(ProbeError::HomeDirectoryUnavailable)
    }

    /// Directory the host tool's code is installed under.
    ///
    /// An environment override wins; otherwise the directory holding the
    /// running executable is used.
    pub fn code_directory(&self) -> PathBuf {
        if let Some(dir) = crate::env::var(CODE_DIR_ENV) {
            return PathBuf::from(dir);
        }

        parent_or_self(&self.script_path)
    }

    /// Root directory of the current project tree.
    ///
    /// Scripted launches root at the parent of the executing script's path;
    /// standalone launches root at the parent of the working directory.
    pub fn root_directory(&self) -> PathBuf {
        match self.mode {
            RuntimeMode::Scripted => parent_or_self(&self.script_path),
            RuntimeMode::Standalone => parent_or_self(&self.working_dir),
        }
    }

    /// Join the root directory with `segments` and absolutize the result
    /// against the working directory.
    pub fn relative_path(&self, segments: &[&str]) -> PathBuf {
        let mut path = self.root_directory();
        for segment in segments {
            path.push(segment);
        }

        if path.is_absolute() {
            path
        } else {
            self.working_dir.join(path)
        }
    }

    /// Conventional location of a named cache file: `<root>/build/cache/<name>`.
    pub fn cached_filename(&self, name: &str) -> PathBuf {
        self.relative_path(&[BUILD_DIR, CACHE_DIR, name])
    }
}

/// Name of the invoking user, from `whoami`.
///
/// Windows reports a UPN (`user@domain`); only the part before the first `@`
/// is returned there.
pub fn username(os: OsFamily, runner: &dyn CommandRunner) -> Result<String> {
    if os.is_windows() {
        let raw = runner.run("whoami", &["/UPN"])?;
        let trimmed = trim_command_output(os, &raw);
        return Ok(match trimmed.split_once('@') {
            Some((user, _)) => user.to_string(),
            None => trimmed,
        });
    }

    let raw = runner.run("whoami", &[])?;
    Ok(trim_command_output(os, &raw))
}

fn parent_or_self(path: &Path) -> PathBuf {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::fixtures::FakeRunner;
    use serial_test::serial;

    fn context(mode: RuntimeMode) -> LaunchContext {
        LaunchContext::new(
            Some(PathBuf::from("/home/probe")),
            PathBuf::from("/opt/tool/bin/tool"),
            PathBuf::from("/work/project/src"),
            mode,
        )
    }

    #[test]
    fn home_directory_requires_launch_metadata() {
        let ctx = context(RuntimeMode::Scripted);
        assert_eq!(ctx.home_directory().unwrap(), PathBuf::from("/home/probe"));

        let bare = LaunchContext::new(
            None,
            PathBuf::from("/opt/tool/bin/tool"),
            PathBuf::from("/work"),
            RuntimeMode::Scripted,
        );
        let err = bare.home_directory().expect_err("expected hard failure");
        assert!(matches!(err, ProbeError::HomeDirectoryUnavailable));
    }

    #[test]
    fn root_directory_scripted_uses_script_parent() {
        let ctx = context(RuntimeMode::Scripted);
        assert_eq!(ctx.root_directory(), PathBuf::from("/opt/tool/bin"));
    }

    #[test]
    fn root_directory_standalone_uses_working_dir_parent() {
        let ctx = context(RuntimeMode::Standalone);
        assert_eq!(ctx.root_directory(), PathBuf::from("/work/project"));
    }

    #[test]
    fn relative_path_is_absolute_and_ends_with_segments() {
        for mode in [RuntimeMode::Scripted, RuntimeMode::Standalone] {
            let path = context(mode).relative_path(&["a", "b"]);
            assert!(path.is_absolute());
            assert!(path.ends_with("a/b"));
        }
    }

    #[test]
    fn relative_path_absolutizes_against_working_dir() {
        let ctx = LaunchContext::new(
            None,
            PathBuf::from("scripts/tool"),
            PathBuf::from("/work/project"),
            RuntimeMode::Scripted,
        );
        assert_eq!(
            ctx.relative_path(&["a"]),
            PathBuf::from("/work/project/scripts/a")
        );
    }

    #[test]
    fn cached_filename_follows_build_cache_convention() {
        let ctx = context(RuntimeMode::Scripted);
        assert_eq!(
            ctx.cached_filename("deps.cache"),
            PathBuf::from("/opt/tool/bin/build/cache/deps.cache")
        );
    }

    #[test]
    #[serial]
    fn code_directory_honors_environment_override() {
        let ctx = context(RuntimeMode::Scripted);
        unsafe {
            env::set_var(CODE_DIR_ENV, "/custom/code");
        }
        assert_eq!(ctx.code_directory(), PathBuf::from("/custom/code"));

        unsafe {
            env::remove_var(CODE_DIR_ENV);
        }
        assert_eq!(ctx.code_directory(), PathBuf::from("/opt/tool/bin"));
    }

    #[test]
    fn username_unix_is_trimmed_command_output() {
        let runner = FakeRunner::new().with("whoami", "probe\n");
        assert_eq!(username(OsFamily::OtherUnix, &runner).unwrap(), "probe");
    }

    #[test]
    fn username_windows_takes_upn_prefix() {
        let runner = FakeRunner::new().with("whoami /UPN", "probe@example.com\r\n");
        assert_eq!(username(OsFamily::Windows, &runner).unwrap(), "probe");
    }

    #[test]
    fn username_windows_without_at_sign_is_whole_output() {
        let runner = FakeRunner::new().with("whoami /UPN", "PROBE-PC\\probe\r\n");
        assert_eq!(
            username(OsFamily::Windows, &runner).unwrap(),
            "PROBE-PC\\probe"
        );
    }
}
