pub mod api;
pub mod checkin;
pub mod discovery;
pub mod network;
pub mod scanner;
pub mod system;
