//! User directory collaborator: account lookups the resolver verifies
//! cookie claims against.

mod directory;
mod types;

pub use directory::{MemoryUserDirectory, UserDirectory};
pub use types::UserRecord;
