//! Authentication primitives: JWT issuance/verification, password hashing,
//! opaque single-use tokens, and the refresh cookie.

pub mod cookie;
pub mod jwt;
pub mod opaque;
pub mod password;
