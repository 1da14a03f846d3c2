//! stayhaven-web: HTTP server for the Stayhaven marketplace.
//!   - JSON API for auth, public listings, partner properties and admin moderation
//!   - Server-rendered login, dashboard and console pages
//!   - Edge gate guarding the role-owned page prefixes

pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod router;
pub mod session;
pub mod state;
