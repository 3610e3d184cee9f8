//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "10000";

// --- Database pool defaults ---

/// Default maximum number of pooled connections. Overridden by `DB_MAX_CONNECTIONS`.
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
/// Default pool checkout timeout in seconds. Overridden by `DB_ACQUIRE_TIMEOUT_SECS`.
pub const DEFAULT_DB_ACQUIRE_TIMEOUT_SECS: u64 = 5;

// --- Route duration estimation ---

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
/// Assumed average travel speed when converting route distance into time.
pub const AVERAGE_SPEED_KMH: f64 = 5.0;

// --- Input limits ---

/// Minimum accepted password length for new and changed passwords.
pub const MIN_PASSWORD_LENGTH: usize = 8;
/// Maximum length of a point category label added through the API.
pub const MAX_CATEGORY_LABEL_LENGTH: usize = 50;

/// Postgres stores enum labels in at most 63 bytes (NAMEDATALEN - 1)
pub const MAX_ENUM_LABEL_BYTES: usize = 63;
