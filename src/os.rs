//! Operating system and architecture detection.
//!
//! On Unix-like systems detection shells out to `uname` and `getconf` and
//! parses the trimmed output. The Windows branches return fixed placeholder
//! values instead of probing the machine; parsing and classification failures
//! propagate to the caller without fallback.

use crate::error::{ProbeError, Result};
use crate::exec::{CommandRunner, trim_command_output};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Coarse OS classification driving separator, suffix, and load-path choices.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Windows,
    Darwin,
    OtherUnix,
}

impl OsFamily {
    /// The family of the machine this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(windows) {
            OsFamily::Windows
        } else if cfg!(target_os = "macos") {
            OsFamily::Darwin
        } else {
            OsFamily::OtherUnix
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, OsFamily::Windows)
    }

    pub fn is_darwin(&self) -> bool {
        matches!(self, OsFamily::Darwin)
    }

    pub fn is_unix(&self) -> bool {
        !self.is_windows()
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OsFamily::Windows => "windows",
            OsFamily::Darwin => "darwin",
            OsFamily::OtherUnix => "unix",
        };
        write!(f, "{label}")
    }
}

/// Identity of the running kernel.
///
/// Windows carries no version information; Unix-like systems report the
/// kernel name from `uname -s` and the release parsed into integer segments.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum OsIdentity {
    Windows,
    Unix { kernel: String, release: Vec<u32> },
}

/// CPU architecture classification.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Arch {
    #[serde(rename = "x86")]
    X86,
    #[serde(rename = "x86_64")]
    X64,
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arch::X86 => write!(f, "x86"),
            Arch::X64 => write!(f, "x86_64"),
        }
    }
}

/// Inspect the running OS, using the family of the current binary.
pub fn inspect_os(runner: &dyn CommandRunner) -> Result<OsIdentity> {
    inspect_os_for(OsFamily::current(), runner)
}

/// Inspect the running OS for an explicit family.
///
/// Unix-like systems are probed with `uname -s` and `uname -r`; the release
/// string is split on `.` and every segment must be a decimal integer.
pub fn inspect_os_for(os: OsFamily, runner: &dyn CommandRunner) -> Result<OsIdentity> {
    if os.is_windows() {
        return Ok(OsIdentity::Windows);
    }

    let kernel = trim_command_output(os, &runner.run("uname", &["-s"])?);
    let release_raw = trim_command_output(os, &runner.run("uname", &["-r"])?);
    let release = parse_kernel_release(&release_raw)?;

    log::debug!("Detected kernel {kernel} release {release_raw}");

    Ok(OsIdentity::Unix { kernel, release })
}

/// Parse a kernel release string such as `"5.15.0"` into `[5, 15, 0]`.
pub fn parse_kernel_release(raw: &str) -> Result<Vec<u32>> {
    raw.split('.')
        .map(|segment| {
            segment.parse::<u32>().map_err(|_| ProbeError::VersionParse {
                segment: segment.to_string(),
            })
        })
        .collect()
}

static X64_PATTERN: OnceLock<Regex> = OnceLock::new();
static X86_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Classify an arbitrary architecture description string.
///
/// The 64-bit alternation is tried first, then the 32-bit one; both are
/// case-sensitive. Anything matching neither is an error, never a default.
pub fn classify_architecture(text: &str) -> Result<Arch> {
    let x64 = X64_PATTERN
        .get_or_init(|| Regex::new("64-bit|x86_64|ia64|amd64").expect("64-bit pattern"));
    if x64.is_match(text) {
        return Ok(Arch::X64);
    }

    let x86 = X86_PATTERN
        .get_or_init(|| Regex::new("32-bit|i386|i486|i586|i686|x86").expect("32-bit pattern"));
    if x86.is_match(text) {
        return Ok(Arch::X86);
    }

    Err(ProbeError::UnclassifiedArchitecture(text.to_string()))
}

/// Detect the CPU architecture by classifying `uname -a` output.
pub fn detect_architecture(os: OsFamily, runner: &dyn CommandRunner) -> Result<Arch> {
    if os.is_windows() {
        // TODO: query the machine instead of assuming 32-bit x86.
        return Ok(Arch::X86);
    }

    let output = trim_command_output(os, &runner.run("uname", &["-a"])?);
    classify_architecture(&output)
}

/// Detect the native word width in bits via `getconf LONG_BIT`.
pub fn detect_word_width(os: OsFamily, runner: &dyn CommandRunner) -> Result<u32> {
    if os.is_windows() {
        // TODO: detect 64-bit Windows instead of assuming 32.
        return Ok(32);
    }

    let output = trim_command_output(os, &runner.run("getconf", &["LONG_BIT"])?);
    output
        .parse::<u32>()
        .map_err(|_| ProbeError::IntegerParse { output })
}
