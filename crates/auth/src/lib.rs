//! `billfold-auth` — authentication primitives.
//!
//! This crate is intentionally decoupled from HTTP and storage: claims and
//! their time-window rules, the HS256 session-token implementation, the
//! magic-link token lifecycle, roles, and the user record live here; cookie
//! plumbing and persistence live with their owners.

pub mod claims;
pub mod jwt;
pub mod magic;
pub mod roles;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use jwt::{Hs256Jwt, JwtError, JwtSigner, JwtValidator};
pub use magic::{MAGIC_TOKEN_TTL_MINUTES, MagicToken, generate_token, is_valid_email, normalize_email};
pub use roles::Role;
pub use user::User;
