//! Exit codes for the shelf binary.
//! These codes are part of the public contract and agree with `ListError::exit_code`.

use shelf_core::{ErrorKind, ListError};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_NOT_FOUND: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_REMOTE_ERROR: i32 = 5; // network or backend
pub const EXIT_INVALID_RESPONSE: i32 = 6;
pub const EXIT_STORAGE_ERROR: i32 = 7;

pub fn for_error(err: &ListError) -> i32 {
    match err.kind() {
        ErrorKind::NotFound => EXIT_NOT_FOUND,
        ErrorKind::Config => EXIT_CONFIG_ERROR,
        ErrorKind::Network | ErrorKind::Backend => EXIT_REMOTE_ERROR,
        ErrorKind::InvalidResponse => EXIT_INVALID_RESPONSE,
        ErrorKind::Storage => EXIT_STORAGE_ERROR,
    }
}
