//! Shared utilities for the Walletboard workspace.

pub mod version_info;
