// src/backend/mod.rs
// =============================================================================
// This module talks to the Supabase project behind the app.
//
// Two services live there:
// - GoTrue (/auth/v1): email + password sign up, sign in, token refresh,
//   sign out
// - PostgREST (/rest/v1): the `users` table of registered usernames
//
// Both speak JSON over HTTPS and authenticate with the project's anon key
// (plus the user's access token once signed in).
// =============================================================================

mod auth;
mod client;
mod users;

pub use client::Backend;
