//! Google Calendar backend for Tabdeck.
//!
//! Token handling, the Calendar API client, the page message contract, and
//! the agenda embed URL.

pub mod auth;
pub mod client;
pub mod embed;
pub mod error;
pub mod message;
pub mod types;

pub use auth::{AccessToken, Authorizer, TokenCache, TokenFileAuthorizer};
pub use client::CalendarClient;
pub use embed::agenda_embed_url;
pub use error::CalendarError;
pub use message::{Request, Response};
pub use types::{sort_for_picker, Calendar};
