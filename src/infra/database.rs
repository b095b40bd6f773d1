pub mod connection {
    use std::time::Duration;

    use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

    use crate::{config::DatabaseConfig, error::persistence::PersistenceError};

    pub async fn create_pool(config: &DatabaseConfig) -> Result<SqlitePool, PersistenceError> {
        let options = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(config.max_connections.max(1))
            .acquire_timeout(Duration::from_millis(1000));

        // an in-memory database lives as long as its connection
        let options = if config.is_in_memory() {
            options.idle_timeout(None).max_lifetime(None)
        } else {
            options
                .idle_timeout(Duration::from_millis(1000 * 30))
                .max_lifetime(Duration::from_millis(1000 * 60 * 30))
        };

        let pool = options.connect(&config.url).await?;
        tracing::info!("Connected to database {}", config.url);
        Ok(pool)
    }
}

pub mod schema {
    use sqlx::SqlitePool;

    use crate::error::persistence::PersistenceError;

    pub const SEED_USERS: [(&str, &str); 8] = [
        ("Frodo", "28-01-1981"),
        ("Aragorn", "20-10-1958"),
        ("Legolas", "13-01-1977"),
        ("Gandalf", "25-05-1939"),
        ("Samsagaz", "10-02-1971"),
        ("Meriadoc", "08-12-1976"),
        ("Peregrin", "28-08-1968"),
        ("Gimli", "05-05-1944"),
    ];

    /// Recreates the `users` table and loads the seed users.
    pub async fn bootstrap(pool: &SqlitePool) -> Result<(), PersistenceError> {
        tracing::info!("Creating database");

        let mut trx = pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS users")
            .execute(&mut trx)
            .await?;
        sqlx::query(concat!(
            "CREATE TABLE users (id INTEGER PRIMARY KEY ASC NOT NULL, ",
            "name TEXT NOT NULL, birthdate TEXT NOT NULL)",
        ))
        .execute(&mut trx)
        .await?;

        for (name, birthdate) in SEED_USERS {
            sqlx::query("INSERT INTO users (name, birthdate) VALUES (?, ?)")
                .bind(name)
                .bind(birthdate)
                .execute(&mut trx)
                .await?;
        }
        trx.commit().await?;

        tracing::info!("Database created with {} users", SEED_USERS.len());
        Ok(())
    }
}

pub mod repository {
    use async_trait::async_trait;
    use futures::TryStreamExt;
    use sqlx::SqlitePool;

    use crate::{
        domain::{entity::StoredUser, repository::UserRepository},
        error::persistence::PersistenceError,
    };

    #[derive(Debug, Clone)]
    pub struct SqliteUserRepository {
        pool: SqlitePool,
    }

    impl SqliteUserRepository {
        pub fn new(pool: SqlitePool) -> Self {
            Self { pool }
        }
    }

    #[async_trait]
    impl UserRepository for SqliteUserRepository {
        async fn find_all(&self) -> Result<Vec<StoredUser>, PersistenceError> {
            let mut rows = sqlx::query("SELECT id, name, birthdate FROM users ORDER BY id")
                .fetch(&self.pool);

            let mut users = Vec::new();
            while let Some(row) = rows.try_next().await? {
                users.push(StoredUser::try_from(&row)?);
            }

            tracing::info!("Returning {} users", users.len());
            Ok(users)
        }

        async fn find(&self, id: i64) -> Result<Option<StoredUser>, PersistenceError> {
            let row = sqlx::query("SELECT id, name, birthdate FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

            let user = row.as_ref().map(StoredUser::try_from).transpose()?;

            tracing::info!("Returning {} users", usize::from(user.is_some()));
            Ok(user)
        }

        async fn insert(&self, user: &StoredUser) -> Result<Option<StoredUser>, PersistenceError> {
            let result = sqlx::query("INSERT INTO users (name, birthdate) VALUES (?, ?)")
                .bind(user.name.clone())
                .bind(user.birthdate.clone())
                .execute(&self.pool)
                .await?;

            let id = result.last_insert_rowid();
            tracing::info!("Created user with id {id}");

            self.find(id).await
        }

        async fn update(&self, user: &StoredUser) -> Result<Option<StoredUser>, PersistenceError> {
            let result = sqlx::query("UPDATE users SET name = ?, birthdate = ? WHERE id = ?")
                .bind(user.name.clone())
                .bind(user.birthdate.clone())
                .bind(user.id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                tracing::warn!("User with id {} not found", user.id);
                return Ok(None);
            }

            tracing::info!("Updated user with id {}", user.id);
            self.find(user.id).await
        }

        async fn delete(&self, id: i64) -> Result<bool, PersistenceError> {
            let result = sqlx::query("DELETE FROM users WHERE id = ?")
                .bind(id)
                .execute(&self.pool)
                .await?;

            let deleted = result.rows_affected() > 0;
            if deleted {
                tracing::info!("Removed user with id {id}");
            } else {
                tracing::warn!("User with id {id} not found");
            }

            Ok(deleted)
        }
    }

}
