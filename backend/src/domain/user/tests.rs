//! Tests for the domain user model.

use super::*;
use rstest::rstest;

#[rstest]
#[case(0)]
#[case(-4)]
fn user_id_rejects_non_positive_values(#[case] raw: i64) {
    assert_eq!(UserId::new(raw), Err(UserValidationError::NonPositiveId));
}

#[rstest]
fn user_id_serialises_as_number() {
    let id = UserId::new(42).expect("valid id");
    assert_eq!(serde_json::to_value(id).expect("serialise"), 42);
    let parsed: Result<UserId, _> = serde_json::from_value(serde_json::json!(0));
    assert!(parsed.is_err());
}

#[rstest]
#[case("  cook@example.org ", Ok("cook@example.org"))]
#[case("", Err(UserValidationError::EmptyEmail))]
#[case("no-at-sign", Err(UserValidationError::InvalidEmail))]
#[case("@example.org", Err(UserValidationError::InvalidEmail))]
#[case("a b@example.org", Err(UserValidationError::InvalidEmail))]
fn email_validation(#[case] raw: &str, #[case] expected: Result<&str, UserValidationError>) {
    let result = Email::new(raw);
    assert_eq!(result.as_ref().map(AsRef::as_ref), expected.as_ref().copied());
}

#[rstest]
fn email_rejects_overlong_addresses() {
    let raw = format!("{}@example.org", "a".repeat(EMAIL_MAX));
    assert_eq!(
        Email::new(raw),
        Err(UserValidationError::EmailTooLong { max: EMAIL_MAX })
    );
}

#[rstest]
#[case("chef.anna")]
#[case("anna+recipes@home")]
#[case("under_score-1")]
fn username_accepts_allowed_characters(#[case] raw: &str) {
    assert!(Username::new(raw).is_ok());
}

#[rstest]
#[case("", UserValidationError::EmptyUsername)]
#[case("bad$char", UserValidationError::UsernameInvalidCharacters)]
#[case("two words", UserValidationError::UsernameInvalidCharacters)]
#[case("me", UserValidationError::UsernameReserved)]
fn username_rejects_invalid_values(#[case] raw: &str, #[case] expected: UserValidationError) {
    assert_eq!(Username::new(raw), Err(expected));
}

#[rstest]
fn person_name_reports_field_label() {
    let err = PersonName::new("  ", "first_name").expect_err("blank name");
    assert_eq!(err.to_string(), "first_name must not be empty");

    let err = PersonName::new("x".repeat(PERSON_NAME_MAX + 1), "last_name").expect_err("long");
    assert_eq!(
        err,
        UserValidationError::NameTooLong {
            field: "last_name",
            max: PERSON_NAME_MAX
        }
    );
}
