//! Telegram login widget verification

mod verifier;

pub use verifier::{data_check_string, TelegramAssertionVerifier};
