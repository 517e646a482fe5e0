//! Process exit codes.

pub const SUCCESS: u8 = 0;
pub const GENERAL_ERROR: u8 = 1;
/// Bad path, scheme or argument.
pub const USAGE: u8 = 2;
pub const NOT_FOUND: u8 = 3;
pub const ALREADY_EXISTS: u8 = 4;
pub const NOT_EMPTY: u8 = 5;
/// A file where a directory was expected, or the reverse.
pub const WRONG_TYPE: u8 = 6;
pub const UNSUPPORTED: u8 = 7;
/// The store refused or failed the request.
pub const REMOTE_FAILURE: u8 = 8;
