//! Form decoding and validation.
//!
//! [`PostForm`] decodes a urlencoded body; anything that doesn't decode is
//! a 400. The decoded value is then checked with `validator`, and
//! [`FormState`] carries the values back to the template together with
//! one message per failing field.

use crate::error::AppError;
use axum::extract::{Form, FromRequest, Request};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

/// Lifetimes a snippet may be created with, in days
pub const PERMITTED_EXPIRIES: [i64; 3] = [1, 7, 365];

/// Urlencoded request body, rejected with 400 when it can't be decoded.
pub struct PostForm<T>(pub T);

impl<S, T> FromRequest<S> for PostForm<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(PostForm(value))
    }
}

/// A form as shown back to the user.
#[derive(Debug, Default, Serialize)]
pub struct FormState<T> {
    #[serde(flatten)]
    pub values: T,
    pub field_errors: HashMap<String, String>,
    pub non_field_errors: Vec<String>,
}

impl<T: Validate> FormState<T> {
    /// Validate `values`, collecting the first message for each field.
    pub fn check(values: T) -> Self {
        let field_errors = match values.validate() {
            Ok(()) => HashMap::new(),
            Err(errors) => messages(&errors),
        };
        FormState {
            values,
            field_errors,
            non_field_errors: Vec::new(),
        }
    }
}

impl<T> FormState<T> {
    pub fn is_valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    pub fn add_field_error(&mut self, field: &str, message: &str) {
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }
}

fn messages(errors: &ValidationErrors) -> HashMap<String, String> {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let message = errors
                .iter()
                .find_map(|e| e.message.as_ref())
                .map(|m| m.to_string())
                .unwrap_or_else(|| "This field is invalid".to_string());
            (field.to_string(), message)
        })
        .collect()
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank")
            .with_message(Cow::Borrowed("This field cannot be blank")));
    }
    Ok(())
}

fn permitted_expiry(days: i64) -> Result<(), ValidationError> {
    if !PERMITTED_EXPIRIES.contains(&days) {
        return Err(ValidationError::new("expires")
            .with_message(Cow::Borrowed("This field must equal 1, 7 or 365")));
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SnippetCreateForm {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "This field cannot be more than 100 characters long")
    )]
    pub title: String,
    #[validate(custom(function = "not_blank"))]
    pub content: String,
    #[validate(custom(function = "permitted_expiry"))]
    pub expires: i64,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        SnippetCreateForm {
            title: String::new(),
            content: String::new(),
            expires: 365,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct SignupForm {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[validate(email(message = "This field must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "This field must be at least 8 characters long"))]
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank"))]
    pub email: String,
    #[validate(custom(function = "not_blank"))]
    #[serde(skip_serializing)]
    pub password: String,
}
