//! Shared data models for the control service and the mirrored hardware state

mod connection;
mod gateway;
mod hardware;
mod segmentation;

pub use connection::*;
pub use gateway::*;
pub use hardware::*;
pub use segmentation::*;
