pub mod discovery;
pub mod mover;
pub mod progress;
pub mod validation;
