//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them into
//! domain types before returning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::migrations::MigrationRecord;
use crate::domain::{
    Answer, AnswerId, AuthorProfile, AuthorSummary, Coupon, CouponCode, LoginId, NewUser,
    Question, QuestionId, Role, User, UserId, UserSummary, UserValidationError,
};

use super::schema::{answers, coupons, migrations_history, questions, users};

/// Stored value that no longer satisfies domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid stored {entity}: {message}")]
pub(crate) struct CorruptRow {
    entity: &'static str,
    message: String,
}

impl CorruptRow {
    fn user(error: &UserValidationError) -> Self {
        Self {
            entity: "user",
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = migrations_history)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MigrationRow {
    pub name: String,
    pub timestamp: i64,
}

impl From<MigrationRow> for MigrationRecord {
    fn from(row: MigrationRow) -> Self {
        Self {
            name: row.name,
            timestamp: row.timestamp,
        }
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub mbr_id: i32,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub image: Option<String>,
    pub reputation: i32,
    pub point: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CorruptRow;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let login_id = LoginId::new(&row.user_id).map_err(|err| CorruptRow::user(&err))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|err| CorruptRow::user(&err))?;
        Ok(Self {
            id: UserId::new(row.mbr_id),
            login_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            role,
            reputation: row.reputation,
            points: row.point,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub user_id: &'a str,
    pub password: &'a str,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            user_id: user.login_id.as_ref(),
            password: user.password_hash.as_str(),
            name: user.contact.name(),
            email: user.contact.email(),
            phone: user.contact.phone(),
            role: user.role.as_str(),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserSummaryRow {
    pub user_id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserSummaryRow> for UserSummary {
    type Error = CorruptRow;

    fn try_from(row: UserSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: LoginId::new(&row.user_id).map_err(|err| CorruptRow::user(&err))?,
            name: row.name,
            created_at: row.created_at,
        })
    }
}

/// `(users.name, users.image, users.reputation)` from a left join.
pub(crate) type AuthorColumns = Option<(String, Option<String>, i32)>;

pub(crate) fn author_profile(columns: AuthorColumns) -> AuthorProfile {
    match columns {
        Some((name, image, reputation)) => {
            AuthorProfile::from_parts(Some(name), image, Some(reputation))
        }
        None => AuthorProfile::from_parts(None, None, None),
    }
}

/// `(users.name, users.user_id)` from a left join.
pub(crate) fn author_summary(
    columns: Option<(String, String)>,
) -> Result<Option<AuthorSummary>, CorruptRow> {
    columns
        .map(|(name, user_id)| {
            LoginId::new(&user_id)
                .map(|user_id| AuthorSummary { name, user_id })
                .map_err(|err| CorruptRow::user(&err))
        })
        .transpose()
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = questions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct QuestionRow {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub votes: i32,
    pub answers: i32,
    pub views: i32,
    pub tags: Vec<String>,
    pub mbr_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Self {
            id: QuestionId::new(row.id),
            title: row.title,
            description: row.description,
            votes: row.votes,
            answers: row.answers,
            views: row.views,
            tags: row.tags,
            author_id: UserId::new(row.mbr_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = questions)]
pub(crate) struct NewQuestionRow<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub tags: &'a [String],
    pub views: i32,
    pub mbr_id: i32,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = questions)]
pub(crate) struct QuestionChangeset<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub tags: Option<&'a [String]>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = answers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AnswerRow {
    pub id: i32,
    pub content: String,
    pub votes: i32,
    pub accepted: bool,
    pub question_id: i32,
    pub mbr_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AnswerRow> for Answer {
    fn from(row: AnswerRow) -> Self {
        Self {
            id: AnswerId::new(row.id),
            content: row.content,
            votes: row.votes,
            accepted: row.accepted,
            question_id: QuestionId::new(row.question_id),
            author_id: UserId::new(row.mbr_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = answers)]
pub(crate) struct NewAnswerRow<'a> {
    pub content: &'a str,
    pub votes: i32,
    pub accepted: bool,
    pub question_id: i32,
    pub mbr_id: i32,
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coupons)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CouponRow {
    pub id: i32,
    pub coupon_code: String,
    pub points: i32,
    pub is_used: bool,
    pub used_by_mbr_id: Option<i32>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = CorruptRow;

    fn try_from(row: CouponRow) -> Result<Self, Self::Error> {
        let coupon_code = CouponCode::new(&row.coupon_code).map_err(|err| CorruptRow {
            entity: "coupon",
            message: err.to_string(),
        })?;
        Ok(Self {
            id: row.id,
            coupon_code,
            points: row.points,
            is_used: row.is_used,
            used_by: row.used_by_mbr_id.map(UserId::new),
            used_at: row.used_at,
            created_at: row.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PLACEHOLDER_IMAGE, UNKNOWN_AUTHOR};
    use rstest::rstest;

    #[rstest]
    fn missing_author_gets_placeholders() {
        let profile = author_profile(None);
        assert_eq!(profile.name, UNKNOWN_AUTHOR);
        assert_eq!(profile.image, PLACEHOLDER_IMAGE);
        assert_eq!(profile.reputation, 0);
    }

    #[rstest]
    fn author_without_image_gets_placeholder_image() {
        let profile = author_profile(Some(("Kim".to_owned(), None, 7)));
        assert_eq!(profile.name, "Kim");
        assert_eq!(profile.image, PLACEHOLDER_IMAGE);
        assert_eq!(profile.reputation, 7);
    }

    #[rstest]
    fn summary_rejects_blank_login_ids() {
        assert!(author_summary(Some(("Kim".to_owned(), "  ".to_owned()))).is_err());
        assert_eq!(author_summary(None), Ok(None));
    }

    #[rstest]
    fn unknown_roles_are_corrupt() {
        let now = chrono::Utc::now();
        let row = UserRow {
            mbr_id: 1,
            user_id: "kim".to_owned(),
            name: "Kim".to_owned(),
            email: "kim@example.com".to_owned(),
            phone: "010-0000-0000".to_owned(),
            role: "SUPERUSER".to_owned(),
            image: None,
            reputation: 0,
            point: 0,
            created_at: now,
            updated_at: now,
        };
        assert!(User::try_from(row).is_err());
    }
}
