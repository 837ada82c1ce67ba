//! Record store integration tests

mod file_store;
