//! DreamShepherd core domain logic.
//!
//! Pure-logic building blocks for the identity lifecycle: error taxonomy,
//! email normalization, registration validation, preference enums, reminder
//! scheduling rules, and dream slug derivation. No I/O, no database
//! dependencies -- everything here is unit-testable in isolation.

pub mod email;
pub mod error;
pub mod intro;
pub mod naming;
pub mod preferences;
pub mod registration;
pub mod types;
