//! Standard exit codes for CLI operations
//!
//! Code 2 is left to argument parsing errors reported by clap.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Configuration error - missing, unreadable or invalid module config
pub const CONFIG_ERROR: i32 = 3;

/// Fetch error - a CRD source could not be downloaded
pub const FETCH_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Conversion error - the converter failed or could not be started
pub const CONVERSION_ERROR: i32 = 6;

/// Discovery error - listing page unreachable or without embedded data
pub const DISCOVERY_ERROR: i32 = 7;
