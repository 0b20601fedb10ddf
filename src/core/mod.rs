pub mod event_loop;
pub mod models;
pub mod notifications;
pub mod sentinel;
pub mod settings;
pub mod trigger;
