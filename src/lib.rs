//! Quarterly budget allocation across departments
//!
//! This crate provides the distribution strategies, validation rules and
//! draft editing model used to split a period's budget between departments,
//! plus the in-memory approval workflow and HTTP API that serve them.

#![warn(missing_docs)]

pub mod allocation;
pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod models;
pub mod workflow;
