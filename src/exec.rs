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

//! Synchronous execution of platform-provided commands.
//!
//! Every probe that needs `uname`, `getconf`, `file` or `whoami` goes through
//! the [`CommandRunner`] trait so tests can substitute canned output instead
//! of spawning real subprocesses.

use crate::error::{ProbeError, Result};
use crate::os::OsFamily;
use std::process::Command;

/// Runs one external command to completion and captures its text output.
///
/// No timeout is imposed; a hung command hangs the caller.
pub trait CommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// [`CommandRunner`] backed by a real subprocess per call.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        log::debug!("Running command: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| ProbeError::CommandFailed {
                command: program.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() && output.stdout.is_empty() {
            return Err(ProbeError::CommandFailed {
                command: program.to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Strip the trailing newline from raw command output.
///
/// Windows command output ends in CRLF, so any trailing carriage returns are
/// removed as well there. Applied to every command's output before parsing.
pub fn trim_command_output(os: OsFamily, raw: &str) -> String {
    let trimmed = raw.strip_suffix('\n').unwrap_or(raw);

    if os.is_windows() {
        trimmed.trim_end_matches('\r').to_string()
    } else {
        trimmed.to_string()
    }
}
