pub mod rendering;
pub mod services;
pub mod timers;

pub use services::{ChronoTimeProvider, ConsoleLogger, MemoryLogger};
pub use timers::{BrowserScheduler, FrameLoop};
