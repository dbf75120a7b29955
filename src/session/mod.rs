//! Session module - state machine and its event loop

pub mod controller;
pub mod runner;

pub use controller::{
    SessionController, SessionPhase, SessionSnapshot, GENERATION_FAILED_MESSAGE,
    INVALID_FILE_NOTICE,
};
pub use runner::SessionHandle;
