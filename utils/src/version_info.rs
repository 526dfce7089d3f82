//! Version information, populated at build time.

/// The build date in RFC3339 format.
pub fn build_date() -> &'static str {
    env!("BUILD_DATE")
}

/// The git commit hash (short), or "unknown" outside a checkout.
pub fn build_commit() -> &'static str {
    env!("BUILD_COMMIT")
}

/// The package version.
pub fn build_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Display string for the top bar: `v{version} ({commit})`.
pub fn format_version() -> String {
    format!("v{} ({})", build_version(), build_commit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_date_not_empty() {
        assert!(!build_date().is_empty());
    }

    #[test]
    fn build_commit_not_empty() {
        assert!(!build_commit().is_empty());
    }

    #[test]
    fn format_version_contains_the_package_version() {
        let formatted = format_version();
        assert!(formatted.starts_with('v'));
        assert!(formatted.contains(build_version()));
    }
}
