//! REST API client module for the PesoPay backend.
//!
//! Provides the `ApiClient` for the auth, user, and wallet endpoint
//! surfaces. Authenticated requests carry a JWT bearer token read from the
//! active session; a 401 response is the sole server-driven signal that
//! invalidates it.

pub mod client;
pub mod error;

pub use client::{ApiClient, AuthSuccess, SignupReply};
pub use error::ApiError;
