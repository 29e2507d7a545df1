//! `hireboard-identity` — the user/identity collaborator boundary.
//!
//! The job board never stores credentials; it forwards bearer tokens to the
//! identity service and consumes two lookups from it: "who is this token"
//! and "who subscribed to this category". Both sit behind [`IdentityProvider`]
//! so services take an injected collaborator, never ambient state.

pub mod directory;
pub mod http;
pub mod provider;
pub mod user;

pub use directory::StaticDirectory;
pub use http::HttpIdentityClient;
pub use provider::{IdentityError, IdentityProvider};
pub use user::{CategorySubscriber, Role, UserProfile};
