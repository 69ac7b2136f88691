use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{email, max_length, min_length, Validate};
use crate::error::AppError;
use crate::model::{User, UserProfile};

const MIN_PASSWORD_LEN: usize = 3;

#[derive(Clone, Debug, Deserialize)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
}

impl Validate for RegisterUser {
    fn validate(&self) -> Result<(), AppError> {
        email("email", &self.email)?;
        min_length("password", &self.password, MIN_PASSWORD_LEN)?;
        if let Some(u) = &self.username {
            max_length("username", u, 150)?;
        }
        Ok(())
    }
}

/// Login form (`application/x-www-form-urlencoded`); `username` carries the email.
#[derive(Clone, Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct BearerToken {
    pub access_token: String,
    pub token_type: &'static str,
}

/// `PATCH /users/me`: every field optional.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), AppError> {
        if let Some(e) = &self.email {
            email("email", e)?;
        }
        if let Some(u) = &self.username {
            max_length("username", u, 150)?;
        }
        if let Some(p) = &self.password {
            min_length("password", p, MIN_PASSWORD_LEN)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ProfileWrite {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl Validate for ProfileWrite {
    fn validate(&self) -> Result<(), AppError> {
        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if let Some(v) = value {
                max_length(field, v, 100)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UserEmail {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
}

impl From<User> for UserEmail {
    fn from(u: User) -> Self {
        UserEmail { id: u.id, email: u.email, username: u.username }
    }
}

#[derive(Debug, Serialize)]
pub struct UserWithProfile {
    #[serde(flatten)]
    pub user: User,
    pub user_profile: Option<UserProfile>,
}
