//! Account credentials
//!
//! Signup and sign-in checks. Security hardening beyond salted hashing is out of scope.

pub mod crypto;
pub mod errors;

pub use crypto::{hash_password, verify_password};
pub use errors::AccountError;
