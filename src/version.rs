// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Sign Recognition Node

/// Full version string with feature description
pub const VERSION: &str = "v3.1.0-session-windows-2026-10-16";

/// Semantic version number
pub const VERSION_NUMBER: &str = "3.1.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-16";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "hand-roi-224",
    "stable-predictions",
    "session-windows",
    "top-3-alternatives",
    "prometheus-metrics",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Sign Recognition Node {} ({})", VERSION_NUMBER, BUILD_DATE)
}
