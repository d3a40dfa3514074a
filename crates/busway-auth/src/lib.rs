//! # busway-auth
//!
//! Credential handling for Busway.
//!
//! - `jwt`: access and email-verification token creation and validation
//! - `password`: Argon2id password hashing and policy enforcement

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder, TokenType};
pub use password::{PasswordHasher, PasswordValidator};
