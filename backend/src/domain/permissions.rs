//! Author-or-read-only access rule for authored resources.

use crate::domain::{Error, UserId};

/// Kind of access requested on an authored resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Open to anyone, including anonymous viewers.
    Read,
    /// Reserved for the author.
    Write,
}

/// Apply the author-or-read-only rule.
///
/// Reads always pass. Writes need an authenticated viewer who is the author.
///
/// # Examples
/// ```
/// use foodgram::domain::{authorize, Access, ErrorCode, UserId};
///
/// let author = UserId::new(1).unwrap();
/// let other = UserId::new(2).unwrap();
/// assert!(authorize(None, author, Access::Read).is_ok());
/// let err = authorize(Some(other), author, Access::Write).unwrap_err();
/// assert_eq!(err.code(), ErrorCode::Forbidden);
/// ```
pub fn authorize(viewer: Option<UserId>, author: UserId, access: Access) -> Result<(), Error> {
    match access {
        Access::Read => Ok(()),
        Access::Write => {
            let viewer = viewer.ok_or_else(|| Error::unauthorized("login required"))?;
            if viewer == author {
                Ok(())
            } else {
                Err(Error::forbidden("only the author may change this resource"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    fn id(raw: i64) -> UserId {
        UserId::new(raw).expect("valid id")
    }

    #[rstest]
    #[case(None, Access::Read, None)]
    #[case(Some(2), Access::Read, None)]
    #[case(Some(1), Access::Write, None)]
    #[case(Some(2), Access::Write, Some(ErrorCode::Forbidden))]
    #[case(None, Access::Write, Some(ErrorCode::Unauthorized))]
    fn author_or_read_only(
        #[case] viewer: Option<i64>,
        #[case] access: Access,
        #[case] expected: Option<ErrorCode>,
    ) {
        let result = authorize(viewer.map(id), id(1), access);
        assert_eq!(result.err().map(|err| err.code()), expected);
    }
}
