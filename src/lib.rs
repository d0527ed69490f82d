pub mod config;
pub mod device;
pub mod errors;
pub mod gate;
pub mod gate_config;
pub mod init;
pub mod inventory;
pub mod launch;
pub mod store;
pub mod ui;
