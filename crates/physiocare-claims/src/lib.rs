//! Claim decoding for PhysioCare session tokens.
//!
//! The backend issues a signed JWT on login. Older backend revisions only
//! return the token, so the client recovers the user id, login and role from
//! the token payload. Signatures are not verified here: the backend remains
//! the authority and rejects forged tokens on every protected call.

pub mod claims;

pub use claims::*;
