//! API constants

/// Versioned prefix for every resource route.
pub const API_PREFIX: &str = "/api/v0";

/// Client-chosen key scoping the duplicate-upload guard.
pub const SESSION_HEADER: &str = "X-Session-Id";

/// Allowance on top of the file limit for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;
