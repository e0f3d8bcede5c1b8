//! Maker/checker workflow engine for a trust and investment operation.
//!
//! A maker submits clients, investment accounts, buy/sell applications and
//! SIP/SWP plans; a checker must approve or reject each before it becomes
//! effective. The crate covers the approval-queue state machine, the
//! submission-time eligibility gates (cut-off times, risk-mismatch waivers),
//! the SIP projection calculator and the read-only query views, with
//! optional sled persistence of the whole state.

pub mod eligibility;
pub mod engine;
pub mod entities;
pub mod error;
pub mod projection;
pub mod registry;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;
pub mod views;
