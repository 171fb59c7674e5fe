// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod predict;
pub mod session;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{ClassesResponse, HealthResponse, ResetResponse, StatusResponse};
pub use http_server::{create_router, start_server, AppState};
pub use predict::{predict_handler, BoundingBoxDto, PredictResponse};
pub use session::{normalize_session_id, parse_session_id, session_from_headers, SESSION_HEADER};
