//! Membership engine integration tests
//!
//! Scenario tests drive the engine through the hub; the invariant tests run long seeded event
//! sequences directly against the pure engine functions.
