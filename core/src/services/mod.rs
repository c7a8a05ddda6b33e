//! Services containing the session logic: token encoding, session lifecycle,
//! Telegram login verification and the expired-row sweep.

pub mod session;
pub mod telegram;
pub mod token;

// Re-export commonly used types
pub use session::{bearer_token, SessionManager};
pub use telegram::{data_check_string, TelegramAssertionVerifier};
pub use token::{
    ExpiredTokenSweeper, SigningKeyProvider, SweepReport, TokenCodec, TokenServiceConfig,
    MIN_SECRET_BYTES,
};
