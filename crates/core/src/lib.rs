//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `account` - Chart of accounts rules
//! - `ledger` - Double-entry journal entries and their lifecycle
//! - `reports` - Trial balance aggregation and balance queries

pub mod account;
pub mod ledger;
pub mod reports;
