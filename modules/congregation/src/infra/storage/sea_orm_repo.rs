//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both structs are generic over `C: ConnectionTrait`, so they can be built
//! with a `DatabaseConnection` or a transaction. Each call borrows a pooled
//! connection for its own duration only.

use anyhow::Context;
use sea_orm::sea_query::{Expr, Func, LikeExpr};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};

use crate::contract::model::{Event, User, UserFilter};
use crate::domain::repo::{EventDraft, EventsRepository, RepoError, UserDraft, UsersRepository};
use crate::infra::storage::entity::events::{
    ActiveModel as EventAM, Column as EventColumn, Entity as EventEntity,
};
use crate::infra::storage::entity::users::{
    ActiveModel as UserAM, Column, Entity as UserEntity, Role,
};

/// SeaORM repository for users.
/// Holds a connection object; its lifetime/ownership is up to the caller.
pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

/// Escape LIKE wildcards so the needle matches literally.
///
/// The needle is folded with ASCII rules, the same way SQLite's `lower()`
/// folds the column, so a value always matches itself.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .to_ascii_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn contains_ci(column: Column, needle: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(like_pattern(needle)).escape('\\'))
}

fn filter_condition(filter: &UserFilter) -> Condition {
    let mut cond = Condition::all();
    if let Some(role) = filter.role {
        cond = cond.add(Column::Role.eq(Role::from(role)));
    }
    if let Some(is_active) = filter.is_active {
        cond = cond.add(Column::IsActive.eq(is_active));
    }
    if let Some(city) = filter.city.as_deref() {
        cond = cond.add(contains_ci(Column::City, city));
    }
    if let Some(state) = filter.state.as_deref() {
        cond = cond.add(contains_ci(Column::State, state));
    }
    cond
}

fn write_error(e: DbErr, what: &'static str) -> RepoError {
    if matches!(e, DbErr::RecordNotUpdated) {
        return RepoError::NotFound;
    }
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => RepoError::UniqueViolation(msg),
        _ => RepoError::Other(anyhow::Error::new(e).context(what)),
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("find_by_email failed")?;
        Ok(found.map(Into::into))
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(Column::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn list(&self, filter: &UserFilter, skip: u64, limit: u64) -> anyhow::Result<Vec<User>> {
        let rows = UserEntity::find()
            .filter(filter_condition(filter))
            .order_by_asc(Column::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list users failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, d: UserDraft) -> Result<User, RepoError> {
        let m = UserAM {
            id: NotSet,
            email: Set(d.email),
            hashed_password: Set(d.password),
            first_name: Set(d.first_name),
            last_name: Set(d.last_name),
            phone_number: Set(d.phone_number),
            address: Set(d.address),
            address2: Set(d.address2),
            city: Set(d.city),
            state: Set(d.state),
            role: Set(d.role.into()),
            is_active: Set(d.is_active),
            date_of_birth: Set(d.date_of_birth),
            join_date: Set(d.join_date),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        };
        let saved = m
            .insert(&self.conn)
            .await
            .map_err(|e| write_error(e, "insert user failed"))?;
        Ok(saved.into())
    }

    async fn update(&self, u: User) -> Result<User, RepoError> {
        let m = UserAM {
            id: Set(u.id),
            email: Set(u.email),
            hashed_password: NotSet,
            first_name: Set(u.first_name),
            last_name: Set(u.last_name),
            phone_number: Set(u.phone_number),
            address: Set(u.address),
            address2: Set(u.address2),
            city: Set(u.city),
            state: Set(u.state),
            role: Set(u.role.into()),
            is_active: Set(u.is_active),
            date_of_birth: Set(u.date_of_birth),
            join_date: Set(u.join_date),
            created_at: Set(u.created_at),
            updated_at: Set(u.updated_at),
        };
        let saved = m
            .update(&self.conn)
            .await
            .map_err(|e| write_error(e, "update user failed"))?;
        Ok(saved.into())
    }

    async fn delete(&self, id: i32) -> anyhow::Result<bool> {
        let res = UserEntity::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("delete user failed")?;
        Ok(res.rows_affected > 0)
    }
}

/// SeaORM repository for events.
pub struct SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> EventsRepository for SeaOrmEventsRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Event>> {
        let found = EventEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find event failed")?;
        Ok(found.map(Into::into))
    }

    async fn list(&self, skip: u64, limit: u64) -> anyhow::Result<Vec<Event>> {
        let rows = EventEntity::find()
            .order_by_asc(EventColumn::Id)
            .offset(skip)
            .limit(limit)
            .all(&self.conn)
            .await
            .context("list events failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, d: EventDraft) -> anyhow::Result<Event> {
        let m = EventAM {
            id: NotSet,
            title: Set(d.title),
            description: Set(d.description),
            event_date: Set(d.event_date),
            location: Set(d.location),
            created_at: Set(d.created_at),
            updated_at: Set(d.updated_at),
        };
        let saved = m.insert(&self.conn).await.context("insert event failed")?;
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::{like_pattern, write_error};
    use crate::domain::repo::RepoError;
    use sea_orm::DbErr;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("York"), "%york%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn like_pattern_folds_ascii_only() {
        assert_eq!(like_pattern("MÜNCHEN"), "%mÜnchen%");
        assert_eq!(like_pattern("Ångström"), "%Ångström%");
    }

    #[test]
    fn vanished_row_on_update_is_not_found() {
        assert!(matches!(
            write_error(DbErr::RecordNotUpdated, "update user failed"),
            RepoError::NotFound
        ));
        assert!(matches!(
            write_error(DbErr::Custom("boom".into()), "update user failed"),
            RepoError::Other(_)
        ));
    }
}
