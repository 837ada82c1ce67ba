//! Hub integration tests
//!
//! Accounts, identity sync on sign-in, and how the writer lock and the store interact.

mod accounts;
mod writes;
