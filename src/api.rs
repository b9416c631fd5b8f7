//! Typed endpoint surface grouped by backend route prefix.
//!
//! Each submodule extends [`ApiClient`](crate::pipeline::ApiClient) with the
//! calls under one prefix: `/auth` for identity and booking actions, `/user`
//! for the customer surface, `/provider` for the worker surface, and `/email`
//! for the unauthenticated mail triggers.

pub mod auth;
pub mod email;
pub mod provider;
pub mod user;
