//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - operation completed without errors
pub const SUCCESS: i32 = 0;

/// General error - a collaborator failed or something unexpected happened
pub const ERROR: i32 = 1;

/// Validation error - unresolved placeholders or a weak credential
pub const VALIDATION_ERROR: i32 = 2;

/// Configuration error - unparseable or unsupported configuration
pub const CONFIG_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Connectivity error - the cluster could not be reached
pub const CONNECTIVITY_ERROR: i32 = 6;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
