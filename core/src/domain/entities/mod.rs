//! Domain entities representing principals, issued sessions and login assertions.

pub mod principal;
pub mod telegram;
pub mod token;

// Re-export commonly used types
pub use principal::{Principal, Role};
pub use telegram::TelegramAssertion;
pub use token::{Claims, SessionToken, TokenPair};
