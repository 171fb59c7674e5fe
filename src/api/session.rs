// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Session identity for stabilizer windows

use axum::http::HeaderMap;

use crate::stabilizer::DEFAULT_SESSION;

/// Header carrying the client session id
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest accepted session id
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Trimmed session id, or `None` when blank, oversized or non-printable
pub fn parse_session_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    let valid = !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id.chars().all(|c| c.is_ascii_graphic());
    valid.then(|| id.to_string())
}

/// Normalize a client-supplied session id
///
/// Unusable ids fall back to the shared default session.
pub fn normalize_session_id(raw: Option<&str>) -> String {
    raw.and_then(parse_session_id).unwrap_or_else(|| DEFAULT_SESSION.to_string())
}

pub fn session_from_headers(headers: &HeaderMap) -> String {
    normalize_session_id(headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()))
}
