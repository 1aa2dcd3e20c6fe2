//! Login credentials and password hashing

pub mod auth;

pub use auth::{AuthError, InMemoryUserRepository, PasswordHasher, UserRepository};
