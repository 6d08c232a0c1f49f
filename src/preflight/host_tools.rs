//! Host tool availability checks.

use crate::process;

use super::types::CheckResult;

/// The container build tool must be on PATH.
pub fn check_builder(builder: &str) -> CheckResult {
    match process::which(builder) {
        Some(path) => CheckResult::pass_with(builder, &path.display().to_string()),
        None => CheckResult::fail(
            builder,
            "Not found. Install docker (with buildx) or set CTFGEN_BUILDER to a compatible tool.",
        ),
    }
}
