//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

/// Flavor used by fixtures that need a valid spec.
pub const DEFAULT_FLAVOR: &str = "general1-1";

/// Image used by fixtures that need a valid spec.
pub const DEFAULT_IMAGE: &str = "0f9a4ac6-2b8e-4c3f-9a84-6b21fe4e2f52";

/// Region used by fixtures and the mocked service catalog.
pub const DEFAULT_REGION: &str = "DFW";
