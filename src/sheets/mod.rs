//! Remote spreadsheet sync.
//!
//! A thin client for the Google Sheets values API, authenticated with a
//! service-account key. The client only exists when credentials were
//! configured at startup; without it the grid runs local-only and no request
//! ever leaves the process.

mod auth;
mod client;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use client::SheetsClient;
