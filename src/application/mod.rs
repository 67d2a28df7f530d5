pub mod controller;
pub mod scheduler;
pub mod sequencer;

pub use controller::*;
pub use scheduler::*;
pub use sequencer::*;
