/// Event handlers for the application
pub mod keyboard;
pub mod lifecycle;
pub mod mouse;
