use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{table_columns, ColumnDef, ColumnType, Entity, TableDef};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub is_superuser: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for User {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "user",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("email", ColumnType::Text),
            ColumnDef::new("username", ColumnType::Text),
            ColumnDef::new("hashed_password", ColumnType::Text),
            ColumnDef::new("is_active", ColumnType::Bool),
            ColumnDef::new("is_superuser", ColumnType::Bool),
            ColumnDef::new("is_verified", ColumnType::Bool),
        ],
        timestamps: true,
        natural_sort: false,
    };
}

/// Bearer token row (database token strategy).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Entity for AccessToken {
    type Id = String;

    const TABLE: &'static TableDef = &TableDef {
        name: "access_token",
        pk: "token",
        columns: &[
            ColumnDef::new("token", ColumnType::Text),
            ColumnDef::new("user_id", ColumnType::Uuid),
            ColumnDef::read_only("created_at", ColumnType::Timestamptz),
        ],
        timestamps: false,
        natural_sort: false,
    };
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for UserProfile {
    type Id = Uuid;

    const TABLE: &'static TableDef = &TableDef {
        name: "user_profile",
        pk: "id",
        columns: table_columns![
            ColumnDef::new("user_id", ColumnType::Uuid),
            ColumnDef::new("first_name", ColumnType::Text),
            ColumnDef::new("last_name", ColumnType::Text),
            ColumnDef::new("avatar_url", ColumnType::Text),
            ColumnDef::new("bio", ColumnType::Text),
        ],
        timestamps: true,
        natural_sort: false,
    };
}
