//! Command implementations for the growth CLI

pub mod check;
pub mod dashboard;
pub mod serve;
