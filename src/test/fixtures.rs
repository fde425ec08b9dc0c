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

/// Shared test fixtures for command-backed probes in unit tests
use crate::error::{ProbeError, Result};
use crate::exec::CommandRunner;
use std::collections::HashMap;

/// A [`CommandRunner`] returning canned output, keyed by the full command
/// line (program and arguments joined with spaces).
#[derive(Debug, Default)]
pub struct FakeRunner {
    responses: HashMap<String, String>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register canned output for a command line such as `"uname -a"`.
    pub fn with(mut self, command_line: &str, output: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), output.to_string());
        self
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let command_line = if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        };

        self.responses
            .get(&command_line)
            .cloned()
            .ok_or_else(|| ProbeError::CommandFailed {
                command: command_line,
                message: "no canned output registered".to_string(),
            })
    }
}
