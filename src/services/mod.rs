//! # Services Module
//!
//! On-chain plumbing for the trader: pool lookup, token account
//! provisioning, and swap execution.

pub mod pool_resolver;
pub mod swap_engine;
pub mod token_account;
