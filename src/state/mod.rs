pub mod app_settings;
pub mod app_state;
pub mod messages;
pub mod network;
pub mod orchestrator;
pub mod refresher;
pub mod session;
