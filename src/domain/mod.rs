pub mod contract;
pub mod movement;
pub mod ports;
