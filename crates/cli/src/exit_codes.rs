//! CLI Exit Code Registry
//!
//! Single source of truth for `rowmatch` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Sources reconcile                                   |
//! | 1    | Discrepancies found (rows missing on either side)   |
//! | 2    | CLI usage error (bad args)                          |
//! | 3    | Invalid job config                                  |
//! | 4    | Runtime failure (I/O, decode, engine error)         |

/// Success - both sources reconcile.
pub const EXIT_SUCCESS: u8 = 0;

/// Discrepancies found. Like `diff(1)`, exit 1 means "sources differ."
pub const EXIT_RECON_MISMATCH: u8 = 1;

/// Usage error - bad arguments, missing required options.
/// Returned for clap parse failures.
pub const EXIT_USAGE: u8 = 2;

/// Job file failed to parse or validate, or a source has no header row.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 3;

/// Reading, decoding or writing failed, or the engine aborted.
pub const EXIT_RECON_RUNTIME: u8 = 4;

use rowmatch_recon::ReconError;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    if err.is_config() {
        EXIT_RECON_INVALID_CONFIG
    } else {
        EXIT_RECON_RUNTIME
    }
}
