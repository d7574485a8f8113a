//! Compatibility check between the invoking tool and this generator.

use crate::error::GenerateError;

/// Version of this generator.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn major_of(version: &str) -> Option<u64> {
    let version = version.trim();
    let version = version.strip_prefix('v').unwrap_or(version);
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    // At least MAJOR.MINOR; MINOR may carry a pre-release tag in a three
    // part version but must start with a digit.
    let minor = parts.next()?;
    if !minor.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(major)
}

/// Fail unless `requested` is compatible with [`VERSION`].
///
/// Versions are `[v]MAJOR.MINOR[.PATCH]`; compatibility means equal majors.
pub fn check_version(requested: &str) -> Result<(), GenerateError> {
    let ours = major_of(VERSION).ok_or_else(|| {
        GenerateError::VersionMismatch(format!("generator version {VERSION:?} is malformed"))
    })?;
    let theirs = major_of(requested).ok_or_else(|| {
        GenerateError::VersionMismatch(format!(
            "version {requested:?} is not of the form <major>.<minor>[.<patch>]"
        ))
    })?;
    if ours != theirs {
        return Err(GenerateError::VersionMismatch(format!(
            "tool version {requested} cannot drive generator version {VERSION}"
        )));
    }
    Ok(())
}
