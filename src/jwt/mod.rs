//! Access/refresh token issuance.
//!
//! [`TokenIssuer`] is the contract the lifecycle actions depend on.
//! [`JwtService`] implements it with HS256-signed JWTs.
//!
//! # Example
//!
//! ```rust
//! use vira_id::config::TokenConfig;
//! use vira_id::jwt::{JwtConfig, JwtService};
//! use vira_id::TokenIssuer;
//!
//! let config = JwtConfig::from_token_config(
//!     "a-very-long-signing-secret-of-32-bytes",
//!     &TokenConfig::default(),
//! )
//! .unwrap();
//! let issuer = JwtService::new(config);
//!
//! let user_id = uuid::Uuid::new_v4();
//! let pair = issuer.issue_token_pair(&user_id).unwrap();
//! let verified = issuer
//!     .verify_refresh_token(pair.refresh_token.expose_secret())
//!     .unwrap();
//! assert_eq!(verified.user_id, user_id);
//! ```

mod claims;
mod config;
mod issuer;
mod service;

pub use claims::{JwtClaims, TokenType};
pub use config::{JwtConfig, MIN_SECRET_LENGTH};
pub use issuer::{TokenIssuer, TokenPair, VerifiedToken};
pub use service::JwtService;
