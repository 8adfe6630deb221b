//! End-to-end integration tests for EduScan
//!
//! The tests under `tests/` assemble the full server (state file, session
//! gate, upload simulator, UI router) and drive it through HTTP requests
//! with `tower::ServiceExt::oneshot`.
