//! CLI Exit Code Registry
//!
//! Single source of truth for `quill` exit codes. Exit codes are part
//! of the shell contract; scripts rely on them.
//!
//! | Code | Description                                |
//! |------|--------------------------------------------|
//! | 0    | Success                                    |
//! | 1    | General error (unspecified)                |
//! | 2    | Usage error (bad args, missing input)      |
//! | 3    | File I/O error                             |
//! | 10   | AI exchange failed (network/parse/timeout) |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required input.
pub const EXIT_USAGE: u8 = 2;

/// File I/O error reading the selection source.
pub const EXIT_IO: u8 = 3;

/// The AI exchange failed; stderr carries the failure text.
pub const EXIT_AI: u8 = 10;
