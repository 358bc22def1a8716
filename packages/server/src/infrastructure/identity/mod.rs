//! IdentityProvider implementations

mod static_tokens;

pub use static_tokens::{StaticTokenIdentityProvider, UserRecord};
