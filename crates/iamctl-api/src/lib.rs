// iamctl-api: Async Rust client for IBM Cloud IAM and Schematics REST APIs

pub mod auth;
pub mod client;
pub mod error;
pub mod service;
pub mod transport;

pub use auth::{Authenticator, Credentials};
pub use client::{ApiRequest, ApiResponse, ServiceClient};
pub use error::Error;
pub use service::Service;
pub use transport::{TlsMode, TransportConfig};

pub use reqwest::Method;
