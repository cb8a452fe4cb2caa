//! keyturn - AWS IAM credential inventory and rotation
//!
//! This crate provides the `keyturn` binary and the library it is built on:
//! concurrent credential inventory, staleness classification and the
//! confirmable rotation engine.

pub mod aws;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod inventory;
pub mod output;
pub mod rotation;

#[cfg(test)]
mod testing;
