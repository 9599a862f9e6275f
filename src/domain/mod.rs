//! Core domain types and facades.

pub mod error;
pub mod finance;
pub mod journal;
pub mod position;
pub mod simulation;
pub mod trade;
pub mod validate;
