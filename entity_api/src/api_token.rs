use super::error::{EntityApiErrorKind, Error};
use entity::api_tokens::{ActiveModel, Column, Entity, Model};
use entity::Id;
use log::debug;
use sea_orm::{entity::prelude::*, sea_query::Expr, ActiveValue::Set, DatabaseConnection};

/// Inserts a new token row. The id is always freshly generated; `created_at` and
/// `updated_at` are taken from `model` so callers control the token's age.
pub async fn create(db: &DatabaseConnection, model: Model) -> Result<Model, Error> {
    if model.token.is_empty() {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::InvalidQueryTerm,
        });
    }

    debug!(
        "Creating API token for user: {}, domain: {}",
        model.user, model.domain
    );

    let active_model = ActiveModel {
        id: Set(Id::new_v4()),
        user: Set(model.user),
        domain: Set(model.domain),
        token: Set(model.token),
        created_at: Set(model.created_at),
        updated_at: Set(model.updated_at),
    };

    Ok(active_model.insert(db).await?)
}

/// Finds a token for the (user, domain) pair. Any matching row is returned.
pub async fn find_by_user_and_domain(
    db: &DatabaseConnection,
    user: &str,
    domain: &str,
) -> Result<Option<Model>, Error> {
    Ok(Entity::find()
        .filter(Column::User.eq(user))
        .filter(Column::Domain.eq(domain))
        .one(db)
        .await?)
}

/// Refreshes `updated_at` on every row for the (user, domain) pair.
/// Returns the number of rows touched.
pub async fn touch(db: &DatabaseConnection, user: &str, domain: &str) -> Result<u64, Error> {
    let now: DateTimeWithTimeZone = chrono::Utc::now().into();

    let result = Entity::update_many()
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::User.eq(user))
        .filter(Column::Domain.eq(domain))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Deletes every token stored for the (user, domain) pair.
pub async fn delete_by_user_and_domain(
    db: &DatabaseConnection,
    user: &str,
    domain: &str,
) -> Result<u64, Error> {
    debug!("Deleting API tokens for user: {user}, domain: {domain}");

    let result = Entity::delete_many()
        .filter(Column::User.eq(user))
        .filter(Column::Domain.eq(domain))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Deletes every token, for any user and domain, created before `threshold`.
pub async fn delete_created_before(
    db: &DatabaseConnection,
    threshold: DateTimeUtc,
) -> Result<u64, Error> {
    let result = Entity::delete_many()
        .filter(Column::CreatedAt.lt(threshold))
        .exec(db)
        .await?;

    debug!(
        "Deleted {} API tokens created before {threshold}",
        result.rows_affected
    );

    Ok(result.rows_affected)
}

/// Deletes every token older than `age`, measured from now.
pub async fn delete_older_than(
    db: &DatabaseConnection,
    age: chrono::Duration,
) -> Result<u64, Error> {
    delete_created_before(db, chrono::Utc::now() - age).await
}
