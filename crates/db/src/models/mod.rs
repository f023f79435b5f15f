pub mod dream;
pub mod dreamer;
pub mod intro_dreamer;
