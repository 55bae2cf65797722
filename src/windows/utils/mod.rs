//! Windows utility functions

pub mod error_codes;
pub mod string_conv;

pub use error_codes::{last_error_message, ErrorCode};
pub use string_conv::wide_to_string;
