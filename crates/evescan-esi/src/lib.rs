//! # ESI Client
//!
//! Adaptive fetch client for the EVE Swagger Interface (ESI) public contract
//! endpoints.
//!
//! This crate provides a single logical request primitive with a bounded
//! retry policy driven by HTTP status and the server-reported error-limit
//! budget, exposed as one-page and one-contract fetch operations.
//!
//! ## Features
//!
//! - Bounded retry with exponential backoff for 429 and transient 5xx
//! - Pre-emptive backoff when the `X-ESI-Error-Limit-Remain` budget runs low
//! - Terminal errors surfaced immediately, without burning retry budget
//! - Total page count read from every paginated response
//!
//! ## Example
//!
//! ```ignore
//! use evescan_core::RegionId;
//! use evescan_esi::{EsiClient, EsiConfig};
//!
//! let client = EsiClient::new(EsiConfig::default())?;
//! let page = client.fetch_public_contracts(RegionId::new(10_000_002), 1).await?;
//! println!("{} contracts on page 1/{}", page.records.len(), page.total_pages);
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{ContractPage, EsiClient};
pub use config::EsiConfig;
pub use error::{FetchError, FetchResult};
