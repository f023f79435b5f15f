//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Methods accept any `PgExecutor` so the upgrade flow can run several
//! writes inside one transaction while ordinary callers pass `&PgPool`.

pub mod dream_repo;
pub mod dreamer_repo;
pub mod intro_dreamer_repo;

pub use dream_repo::DreamRepo;
pub use dreamer_repo::DreamerRepo;
pub use intro_dreamer_repo::IntroDreamerRepo;
