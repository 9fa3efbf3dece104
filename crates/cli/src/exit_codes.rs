//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! | Code | Description                                    |
//! |------|------------------------------------------------|
//! | 0    | Success                                        |
//! | 1    | Runtime error (analysis or network failure)    |
//! | 2    | Usage error (bad args, missing required flag)  |
//! | 3    | I/O error (cannot read or write a file)        |
//! | 4    | Parse error (file read but not usable)         |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Runtime error - the pipeline or an upstream service failed.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// I/O error - a file could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Parse error - a file was read but its content is unusable.
pub const EXIT_PARSE: u8 = 4;
