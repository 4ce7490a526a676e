//! Credential primitives library
//!
//! Provides the building blocks the credential service composes:
//! - Password hashing (Argon2id)
//! - Access token signing and validation (JWT, HS256)
//! - Opaque token generation and fingerprinting
//!
//! The service defines its own ports and adapts these implementations to them,
//! so nothing here knows about users, stores or sessions.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Access Tokens
//! ```
//! use auth::{Claims, JwtHandler};
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let claims = Claims::for_user(42, "alice", vec!["USER".to_string()], 1_700_000_000, 900);
//! let token = handler.encode(&claims).unwrap();
//! let decoded: Claims = handler.decode_ignoring_expiry(&token).unwrap();
//! assert_eq!(decoded.username, "alice");
//! ```
//!
//! ## Opaque Tokens
//! ```
//! use auth::token::{fingerprint, TokenGenerator};
//!
//! let generator = TokenGenerator::new();
//! let token = generator.generate();
//! assert_ne!(token, generator.generate());
//! assert_eq!(fingerprint(&token).len(), 64);
//! ```

pub mod jwt;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::TokenGenerator;
