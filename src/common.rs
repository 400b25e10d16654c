pub mod error;
pub mod identifiers;
pub mod time_window;
