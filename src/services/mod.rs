pub mod server;
pub mod submission;
pub mod watch;
