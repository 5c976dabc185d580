//! Launch-argument check for the catalog process.
//!
//! The catalog is started by the access gate as `ecu-catalog <username> <token>`.
//! Only the token's shape is checked: it must be exactly [`TOKEN_LEN`]
//! characters. Its value is never compared against the credential store.

use crate::error::SessionError;

/// Required token length, in characters.
pub const TOKEN_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    token: String,
}

impl Session {
    /// Validate the arguments after the program name.
    ///
    /// Fewer than two arguments or a token of the wrong length refuse the
    /// launch. Anything after the token is ignored.
    pub fn from_args<I>(args: I) -> Result<Self, SessionError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let (Some(username), Some(token)) = (args.next(), args.next()) else {
            return Err(SessionError::MissingArguments);
        };

        let len = token.chars().count();
        if len != TOKEN_LEN {
            return Err(SessionError::InvalidToken {
                len,
                expected: TOKEN_LEN,
            });
        }

        Ok(Self { username, token })
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}
