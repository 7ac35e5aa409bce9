//! Utility functions shared by the analyzer and detector implementations.

pub mod allowance;

#[doc(inline)]
pub use allowance::{apply_allow_directives, check_allow_with_reason, AllowCheck};
