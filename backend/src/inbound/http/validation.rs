//! Translation of domain validation failures into `400` responses.
//!
//! Every error carries `details: {field, code}` so clients can highlight the
//! offending input.

use serde_json::json;

use crate::domain::{
    ContentValidationError, CouponCodeError, Error, LoginValidationError, UserValidationError,
};

fn invalid_field(message: impl Into<String>, field: &str, code: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn user_code(error: &UserValidationError) -> &'static str {
    match error {
        UserValidationError::EmptyLoginId => "empty_user_id",
        UserValidationError::LoginIdTooLong { .. } | UserValidationError::TooLong { .. } => {
            "too_long"
        }
        UserValidationError::EmptyName => "empty_name",
        UserValidationError::InvalidEmail => "invalid_email",
        UserValidationError::EmptyPhone => "empty_phone",
        UserValidationError::UnknownRole(_) => "unknown_role",
    }
}

pub(crate) fn login_validation_error(error: &LoginValidationError) -> Error {
    let code = match error {
        LoginValidationError::EmptyPassword => "empty_password",
        LoginValidationError::LoginId(inner) | LoginValidationError::Contact(inner) => {
            user_code(inner)
        }
    };
    invalid_field(error.to_string(), error.field(), code)
}

pub(crate) fn login_id_error(error: &UserValidationError) -> Error {
    invalid_field(error.to_string(), "userId", user_code(error))
}

pub(crate) fn content_validation_error(error: &ContentValidationError) -> Error {
    let (field, code) = match error {
        ContentValidationError::TitleLength { .. } => ("title", "invalid_length"),
        ContentValidationError::DescriptionTooShort { .. } => ("description", "too_short"),
        ContentValidationError::EmptyAnswer => ("content", "empty_content"),
        ContentValidationError::EmptyPatch => ("body", "empty_patch"),
    };
    invalid_field(error.to_string(), field, code)
}

pub(crate) fn coupon_code_error(error: &CouponCodeError) -> Error {
    let code = match error {
        CouponCodeError::Empty => "empty_coupon_code",
        CouponCodeError::TooLong { .. } => "too_long",
    };
    invalid_field(error.to_string(), "couponCode", code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(LoginValidationError::EmptyPassword, "password", "empty_password")]
    #[case(
        LoginValidationError::LoginId(UserValidationError::EmptyLoginId),
        "userId",
        "empty_user_id"
    )]
    #[case(
        LoginValidationError::Contact(UserValidationError::InvalidEmail),
        "email",
        "invalid_email"
    )]
    fn login_errors_name_the_field(
        #[case] error: LoginValidationError,
        #[case] field: &str,
        #[case] code: &str,
    ) {
        let mapped = login_validation_error(&error);
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(mapped.details(), Some(&json!({"field": field, "code": code})));
    }

    #[rstest]
    fn title_errors_point_at_title() {
        let mapped = content_validation_error(&ContentValidationError::TitleLength {
            min: 10,
            max: 500,
        });
        assert_eq!(mapped.message(), "title must be between 10 and 500 characters");
        assert_eq!(
            mapped.details(),
            Some(&json!({"field": "title", "code": "invalid_length"}))
        );
    }
}
