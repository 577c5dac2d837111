use super::{Page, User, UserChanges, UserError, UserQuery, UserRepository, UserResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DbBackend, DbErr, FromQueryResult, SqlErr, Statement};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

/// PostgreSQL implementation of UserRepository using SeaORM
#[derive(Clone)]
pub struct PostgresUserRepository {
    db: sea_orm::DatabaseConnection,
}

impl PostgresUserRepository {
    pub fn new(db: sea_orm::DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

#[derive(Debug, FromQueryResult)]
struct ExistsRow {
    taken: bool,
}

/// Unique violations on `users` can only come from the email index.
fn write_error(e: DbErr, email: Option<&str>) -> UserError {
    match (e.sql_err(), email) {
        (Some(SqlErr::UniqueConstraintViolation(_)), Some(email)) => {
            UserError::DuplicateEmail(email.to_string())
        }
        _ => UserError::Database(e),
    }
}

/// Escape `%`, `_` and `\` so user input matches literally inside ILIKE.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                user.id.into(),
                user.name.clone().into(),
                user.email.clone().into(),
                user.password_hash.clone().into(),
                user.created_at.into(),
                user.updated_at.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| write_error(e, Some(&user.email)))?
            .ok_or_else(|| UserError::Internal("Insert returned no row".to_string()))?;

        tracing::info!(user_id = %row.id, "Created user");
        Ok(row.into())
    }

    async fn find(&self, id: Uuid) -> UserResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        row.map(User::from).ok_or(UserError::NotFound(id))
    }

    async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)");
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [email.into()]);

        let row = UserRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(User::from))
    }

    async fn search(&self, query: &UserQuery) -> UserResult<Page<User>> {
        let pattern: Option<String> = query.search.as_deref().map(like_pattern);
        let filter = "($1::text IS NULL OR name ILIKE $1 OR email ILIKE $1)";

        let count = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!("SELECT COUNT(*) AS total FROM users WHERE {filter}"),
            [pattern.clone().into()],
        );
        let total = CountRow::find_by_statement(count)
            .one(&self.db)
            .await?
            .map_or(0, |row| row.total.max(0) as u64);

        let select = Statement::from_sql_and_values(
            DbBackend::Postgres,
            format!(
                "SELECT {USER_COLUMNS} FROM users WHERE {filter} \
                 ORDER BY created_at ASC, id ASC LIMIT $2 OFFSET $3"
            ),
            [
                pattern.into(),
                i64::try_from(query.page.per_page).unwrap_or(i64::MAX).into(),
                i64::try_from(query.page.offset()).unwrap_or(i64::MAX).into(),
            ],
        );
        let rows = UserRow::find_by_statement(select).all(&self.db).await?;

        Ok(Page {
            items: rows.into_iter().map(User::from).collect(),
            total,
            request: query.page,
        })
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> UserResult<User> {
        let sql = format!(
            "UPDATE users \
             SET name = COALESCE($2, name), \
                 email = COALESCE($3, email), \
                 password_hash = COALESCE($4, password_hash), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        );

        let email = changes.email.clone();
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                id.into(),
                changes.name.into(),
                changes.email.into(),
                changes.password_hash.into(),
            ],
        );

        let row = UserRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(|e| write_error(e, email.as_deref()))?;

        let user = row.map(User::from).ok_or(UserError::NotFound(id))?;
        tracing::info!(user_id = %id, "Updated user");
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<()> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id));
        }

        tracing::info!(user_id = %id, "Deleted user");
        Ok(())
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> UserResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(\
                SELECT 1 FROM users \
                WHERE LOWER(email) = LOWER($1) AND ($2::uuid IS NULL OR id <> $2)\
             ) AS taken",
            [email.into(), except.into()],
        );

        let row = ExistsRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.is_some_and(|row| row.taken))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageRequest;
    use sea_orm::{DatabaseConnection, MockDatabase, MockExecResult, Value};
    use std::collections::BTreeMap;

    fn user_row(user: &User) -> BTreeMap<&'static str, Value> {
        [
            ("id", user.id.into()),
            ("name", user.name.clone().into()),
            ("email", user.email.clone().into()),
            ("password_hash", user.password_hash.clone().into()),
            ("created_at", user.created_at.into()),
            ("updated_at", user.updated_at.into()),
        ]
        .into_iter()
        .collect()
    }

    fn repo(db: DatabaseConnection) -> PostgresUserRepository {
        PostgresUserRepository::new(db)
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ali"), "%ali%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[tokio::test]
    async fn find_maps_row_to_user() {
        let user = User::new("Alice".into(), "alice@x.com".into(), "hash".into());
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![user_row(&user)]])
            .into_connection();

        let found = repo(db).find(user.id).await.unwrap();
        assert_eq!(found.email, "alice@x.com");
        assert_eq!(found.id, user.id);
    }

    #[tokio::test]
    async fn find_missing_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();

        let id = Uuid::now_v7();
        let err = repo(db).find(id).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn search_combines_count_and_rows() {
        let users: Vec<User> = (0..5)
            .map(|i| User::new(format!("User {i}"), format!("u{i}@x.com"), "hash".into()))
            .collect();
        let count: BTreeMap<&str, Value> = [("total", Value::BigInt(Some(20)))].into_iter().collect();

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![count]])
            .append_query_results([users.iter().map(user_row).collect::<Vec<_>>()])
            .into_connection();

        let page = repo(db)
            .search(&UserQuery::new(None, PageRequest::new(2, 15)))
            .await
            .unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.request.page, 2);
    }

    #[tokio::test]
    async fn delete_without_affected_rows_is_not_found() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = repo(db).delete(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, UserError::NotFound(_)));
    }

    #[tokio::test]
    async fn email_exists_reads_flag() {
        let row: BTreeMap<&str, Value> = [("taken", true.into())].into_iter().collect();
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![row]])
            .into_connection();

        assert!(repo(db).email_exists("alice@x.com", None).await.unwrap());
    }

    #[tokio::test]
    async fn storage_failure_is_a_database_error() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".into())])
            .into_connection();

        let err = repo(db).find(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, UserError::Database(_)));
    }
}
