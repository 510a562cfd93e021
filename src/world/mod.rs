pub mod player;
pub mod position;
pub mod timer;
