//! Port traits between the domain facades and the outside world.

pub mod config_port;
pub mod finance_port;
pub mod journal_port;
pub mod position_port;
