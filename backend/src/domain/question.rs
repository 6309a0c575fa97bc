//! Questions, answers and the values exchanged about them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::user::{LoginId, UserId};

/// Minimum title length in characters.
pub const TITLE_MIN: usize = 10;
/// Maximum title length in characters, matching `questions.title`.
pub const TITLE_MAX: usize = 500;
/// Minimum description length in characters.
pub const DESCRIPTION_MIN: usize = 20;

/// Avatar shown when an author has not uploaded one.
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-user.jpg";
/// Name shown when an author record is missing.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

const FILTERED_HANDLERS: [&str; 4] = ["onerror", "onload", "onclick", "onmouseover"];
const FILTERED_REPLACEMENT: &str = "on_filtered";

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(raw: i32) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

numeric_id!(
    /// Question identifier (`questions.id`).
    QuestionId
);
numeric_id!(
    /// Answer identifier (`answers.id`).
    AnswerId
);

/// Validation errors for question and answer content.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentValidationError {
    #[error("title must be between {min} and {max} characters")]
    TitleLength { min: usize, max: usize },
    #[error("description must be at least {min} characters")]
    DescriptionTooShort { min: usize },
    #[error("answer content must not be empty")]
    EmptyAnswer,
    #[error("update must change at least one field")]
    EmptyPatch,
}

/// Direction of a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed change applied to the vote counter.
    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Neutralise inline event-handler attributes in user-supplied markup.
///
/// Matching is ASCII case-insensitive; the rest of the text is untouched.
///
/// # Examples
/// ```
/// use qna_backend::domain::sanitize_markup;
///
/// assert_eq!(
///     sanitize_markup(r#"<img src=x OnError="alert(1)">"#),
///     r#"<img src=x on_filtered="alert(1)">"#
/// );
/// ```
#[must_use]
pub fn sanitize_markup(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut copied = 0;
    let mut index = 0;

    while index < bytes.len() {
        let rest = &bytes[index..];
        let hit = FILTERED_HANDLERS.iter().find(|handler| {
            rest.len() >= handler.len() && rest[..handler.len()].eq_ignore_ascii_case(handler.as_bytes())
        });
        match hit {
            Some(handler) => {
                // Handlers are ASCII, so `index` is always a char boundary here.
                out.push_str(&input[copied..index]);
                out.push_str(FILTERED_REPLACEMENT);
                index += handler.len();
                copied = index;
            }
            None => index += 1,
        }
    }
    out.push_str(&input[copied..]);
    out
}

fn check_title(title: &str) -> Result<(), ContentValidationError> {
    let len = title.chars().count();
    if (TITLE_MIN..=TITLE_MAX).contains(&len) {
        Ok(())
    } else {
        Err(ContentValidationError::TitleLength {
            min: TITLE_MIN,
            max: TITLE_MAX,
        })
    }
}

fn check_description(description: &str) -> Result<(), ContentValidationError> {
    if description.chars().count() < DESCRIPTION_MIN {
        return Err(ContentValidationError::DescriptionTooShort {
            min: DESCRIPTION_MIN,
        });
    }
    Ok(())
}

/// Validated content for a new question. The description is sanitised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    title: String,
    description: String,
    tags: Vec<String>,
}

impl QuestionDraft {
    pub fn new(
        title: &str,
        description: &str,
        tags: Vec<String>,
    ) -> Result<Self, ContentValidationError> {
        let title = title.trim();
        check_title(title)?;
        check_description(description.trim())?;
        Ok(Self {
            title: title.to_owned(),
            description: sanitize_markup(description.trim()),
            tags: normalise_tags(tags),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Validated partial update of a question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl QuestionPatch {
    pub fn new(
        title: Option<&str>,
        description: Option<&str>,
        tags: Option<Vec<String>>,
    ) -> Result<Self, ContentValidationError> {
        if title.is_none() && description.is_none() && tags.is_none() {
            return Err(ContentValidationError::EmptyPatch);
        }
        let title = title
            .map(|raw| {
                let trimmed = raw.trim();
                check_title(trimmed).map(|()| trimmed.to_owned())
            })
            .transpose()?;
        let description = description
            .map(|raw| {
                let trimmed = raw.trim();
                check_description(trimmed).map(|()| sanitize_markup(trimmed))
            })
            .transpose()?;
        Ok(Self {
            title,
            description,
            tags: tags.map(normalise_tags),
        })
    }
}

fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_owned();
        if !tag.is_empty() && !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

/// Validated answer body. The text is sanitised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerContent(String);

impl AnswerContent {
    pub fn new(raw: &str) -> Result<Self, ContentValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ContentValidationError::EmptyAnswer);
        }
        Ok(Self(sanitize_markup(trimmed)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stored question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[schema(value_type = i32)]
    pub id: QuestionId,
    pub title: String,
    pub description: String,
    pub votes: i32,
    pub answers: i32,
    pub views: i32,
    pub tags: Vec<String>,
    #[schema(value_type = i32)]
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Author fields shown in question listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorSummary {
    pub name: String,
    #[schema(value_type = String)]
    pub user_id: LoginId,
}

/// Question listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionListing {
    #[serde(flatten)]
    pub question: Question,
    pub author: Option<AuthorSummary>,
}

/// Author fields shown next to question and answer bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorProfile {
    pub name: String,
    pub image: String,
    pub reputation: i32,
}

impl AuthorProfile {
    /// Build a profile, filling in defaults for a missing author.
    #[must_use]
    pub fn from_parts(name: Option<String>, image: Option<String>, reputation: Option<i32>) -> Self {
        Self {
            name: name.unwrap_or_else(|| UNKNOWN_AUTHOR.to_owned()),
            image: image
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_owned()),
            reputation: reputation.unwrap_or(0),
        }
    }
}

/// Stored answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    #[schema(value_type = i32)]
    pub id: AnswerId,
    pub content: String,
    pub votes: i32,
    pub accepted: bool,
    #[schema(value_type = i32)]
    pub question_id: QuestionId,
    #[schema(value_type = i32)]
    pub author_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Answer together with its author's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AnswerView {
    #[serde(flatten)]
    pub answer: Answer,
    pub author: AuthorProfile,
}

/// Question page: the question, its author and its answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: Question,
    pub author: AuthorProfile,
    pub answers: Vec<AnswerView>,
}
