pub mod auth;
pub mod client;
pub(crate) mod models;

pub use auth::{ClientCredentialsProvider, CredentialProvider, TokenCachePolicy};
pub use client::{CatalogClient, SEARCH_LIMIT};
