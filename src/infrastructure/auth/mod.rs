//! Authentication infrastructure module
//!
//! Bearer token issuing and validation for the identity boundary.

mod jwt;

pub use jwt::{JwtClaims, JwtConfig, JwtGenerator, JwtService};
