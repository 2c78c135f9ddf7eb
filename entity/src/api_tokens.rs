use crate::Id;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A bearer token obtained from a third-party API, cached per (user, domain).
///
/// `domain` is the normalized API base URL the token was issued for. Several rows may
/// exist for the same pair; readers treat any one of them as canonical.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(schema_name = "api_platform", table_name = "api_tokens")]
pub struct Model {
    #[serde(skip_deserializing)]
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Id,
    pub user: String,
    pub domain: String,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub token: String,
    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
