//! Shared domain types for the Gitboard service and its clients.
//!
//! This crate is the wire-format contract: the normalized GitHub repository
//! record, the category key, the response envelope used by every endpoint,
//! and the request DTOs with their validators. Both the server and the CLI
//! depend on it; nothing here performs I/O.

pub mod category;
pub mod dto;
pub mod envelope;
pub mod error;
pub mod repo;

pub use category::Category;
pub use dto::{
    LoginRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest, SendCodeRequest,
    ValidationError, VerificationScene,
};
pub use envelope::ApiResponse;
pub use error::CoreError;
pub use repo::{GithubRepo, RepoOwner};
