//! Scoped superuser credential
//!
//! The password captured for privileged package installation lives in a
//! `SudoCredential` that is passed only to the operations that need it,
//! zeroized on drop and never printed or logged.

use std::fmt;

use zeroize::Zeroizing;

/// A captured sudo password with a zeroized backing buffer
pub struct SudoCredential {
    secret: Zeroizing<String>,
}

impl SudoCredential {
    pub fn new(password: String) -> Self {
        Self {
            secret: Zeroizing::new(password),
        }
    }

    /// The raw secret, exposed only to the process runner that feeds it to
    /// `sudo -S` over stdin.
    pub(crate) fn reveal(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for SudoCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SudoCredential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_never_reveals_secret() {
        let cred = SudoCredential::new("hunter2".to_string());
        let rendered = format!("{cred:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }

    #[test]
    fn test_reveal_returns_secret() {
        let cred = SudoCredential::new("hunter2".to_string());
        assert_eq!(cred.reveal(), "hunter2");
    }
}
