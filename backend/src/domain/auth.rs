//! Authentication primitives: login credentials, password policy and hashes.
//!
//! Plaintext passwords only ever live inside [`Zeroizing`] buffers and are
//! turned into argon2 PHC strings before they reach a port.

use std::fmt;

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher, PasswordVerifier, SaltString,
};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::{Email, Error};

/// Minimum accepted password length in characters.
pub const PASSWORD_MIN: usize = 8;
/// Maximum accepted password length in characters.
pub const PASSWORD_MAX: usize = 128;

/// Domain error returned when login or password payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
    /// Password is longer than [`PASSWORD_MAX`].
    PasswordTooLong { max: usize },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordTooLong { max } => {
                write!(f, "password must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` is a syntactically valid address.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use foodgram::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("cook@example.org", "s3cret!!").unwrap();
/// assert_eq!(creds.email().as_ref(), "cook@example.org");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let email = Email::new(email).map_err(|_| LoginValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used to look up the account.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Plaintext password that satisfies the account password policy.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPassword(Zeroizing<String>);

impl NewPassword {
    /// Validate a candidate password against the length policy.
    pub fn new(password: &str) -> Result<Self, LoginValidationError> {
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        let length = password.chars().count();
        if length < PASSWORD_MIN {
            return Err(LoginValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        if length > PASSWORD_MAX {
            return Err(LoginValidationError::PasswordTooLong { max: PASSWORD_MAX });
        }
        Ok(Self(Zeroizing::new(password.to_owned())))
    }

    /// Access the plaintext for hashing.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for NewPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NewPassword(***)")
    }
}

/// Argon2 PHC string stored alongside a user record.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Hash a validated password with a fresh random salt.
    pub fn hash(password: &NewPassword) -> Result<Self, Error> {
        let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
            .map_err(|err| Error::internal(format!("failed to encode password salt: {err}")))?;
        let phc = Argon2::default()
            .hash_password(password.expose().as_bytes(), &salt)
            .map_err(|err| Error::internal(format!("failed to hash password: {err}")))?;
        Ok(Self(phc.to_string()))
    }

    /// Wrap a PHC string loaded from storage.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Check a plaintext candidate against this hash.
    ///
    /// A stored value that fails to parse never verifies.
    pub fn verify(&self, candidate: &str) -> bool {
        let Ok(parsed) = PhcString::new(&self.0) else {
            tracing::warn!("stored password hash is not a valid PHC string");
            return false;
        };
        Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok()
    }

    /// PHC string for persistence.
    pub fn as_phc(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(***)")
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::InvalidEmail)]
    #[case("not-an-email", "pw", LoginValidationError::InvalidEmail)]
    #[case("cook@example.org", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn credentials_keep_password_whitespace() {
        let creds = LoginCredentials::try_from_parts(" cook@example.org ", " padded ")
            .expect("valid inputs should succeed");
        assert_eq!(creds.email().as_ref(), "cook@example.org");
        assert_eq!(creds.password(), " padded ");
    }

    #[rstest]
    #[case("short", LoginValidationError::PasswordTooShort { min: PASSWORD_MIN })]
    #[case("", LoginValidationError::EmptyPassword)]
    fn new_password_enforces_policy(#[case] raw: &str, #[case] expected: LoginValidationError) {
        assert_eq!(NewPassword::new(raw), Err(expected));
    }

    #[rstest]
    fn new_password_rejects_overlong_values() {
        let raw = "p".repeat(PASSWORD_MAX + 1);
        assert_eq!(
            NewPassword::new(&raw),
            Err(LoginValidationError::PasswordTooLong { max: PASSWORD_MAX })
        );
    }

    #[rstest]
    fn hash_verifies_only_the_original_password() {
        let password = NewPassword::new("correct horse").expect("valid password");
        let hash = PasswordHash::hash(&password).expect("hashing succeeds");

        assert!(hash.as_phc().starts_with("$argon2"));
        assert!(hash.verify("correct horse"));
        assert!(!hash.verify("battery staple"));
    }

    #[rstest]
    fn malformed_stored_hash_never_verifies() {
        let hash = PasswordHash::from_phc("plaintext-oops");
        assert!(!hash.verify("plaintext-oops"));
    }

    #[rstest]
    fn debug_output_hides_secrets() {
        let password = NewPassword::new("correct horse").expect("valid password");
        assert_eq!(format!("{password:?}"), "NewPassword(***)");
    }
}
