pub mod cooldown;
pub mod countdown;
pub mod orchestrator;
pub mod request;
