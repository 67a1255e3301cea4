use sqlx::{postgres::PgPoolOptions, types::Json, PgPool};

use crate::{
    domain::list::TravelList,
    domain::review::{average_rating, Review},
    domain::user::User,
    repository::errors::RepositoryError,
    usecase::contracts::{ListRepository, UserRepository},
};

const LIST_COLUMNS: &str = "name, description, creator_email, creator_nickname, is_visible, destinations, reviews, average_rating, created_at, updated_at";

fn database_error(e: sqlx::Error) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::DatabaseError(e.to_string()),
    }
}

pub struct PostgresListRepository {
    pool: PgPool,
}

impl PostgresListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Row-locked read-modify-write of the member array. `apply` reports whether it changed
    /// anything; unchanged sets are not written back.
    async fn modify_destinations<F>(&self, name: &str, apply: F) -> Result<Vec<u32>, RepositoryError>
    where
        F: FnOnce(&mut TravelList) -> bool,
    {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let locked = sqlx::query_as::<_, TravelList>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE name = $1 FOR UPDATE"
        ))
        .bind(name)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some(mut list) = locked else {
            tx.rollback().await.map_err(database_error)?;
            return Err(RepositoryError::NotFound);
        };

        if apply(&mut list) {
            sqlx::query("UPDATE lists SET destinations = $2 WHERE name = $1")
                .bind(name)
                .bind(Json(&list.destinations))
                .execute(&mut *tx)
                .await
                .map_err(database_error)?;
        }

        tx.commit().await.map_err(database_error)?;

        tracing::debug!(name, count = list.destinations.len(), "list destinations stored");
        Ok(list.destinations)
    }
}

impl ListRepository for PostgresListRepository {
    #[tracing::instrument(skip(self, list), fields(list_name = %list.name, creator = %list.creator_email))]
    async fn create(&self, list: &TravelList) -> Result<(), RepositoryError> {
        tracing::debug!("creating list");

        sqlx::query(
            r#"
            INSERT INTO lists (name, description, creator_email, creator_nickname, is_visible,
                               destinations, reviews, average_rating, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&list.name)
        .bind(&list.description)
        .bind(&list.creator_email)
        .bind(&list.creator_nickname)
        .bind(list.is_visible)
        .bind(Json(&list.destinations))
        .bind(Json(&list.reviews))
        .bind(list.average_rating)
        .bind(list.created_at)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!(list_name = %list.name, "list created successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_name(&self, name: &str) -> Result<Option<TravelList>, RepositoryError> {
        tracing::debug!("finding list by name");

        let list = sqlx::query_as::<_, TravelList>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(list)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<TravelList>, RepositoryError> {
        tracing::debug!("finding all lists");

        let lists = sqlx::query_as::<_, TravelList>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists ORDER BY updated_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!(count = lists.len(), "found lists");
        Ok(lists)
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_creator(&self, email: &str) -> Result<Vec<TravelList>, RepositoryError> {
        tracing::debug!("finding lists by creator");

        let lists = sqlx::query_as::<_, TravelList>(&format!(
            "SELECT {LIST_COLUMNS} FROM lists WHERE creator_email = $1 ORDER BY updated_at DESC"
        ))
        .bind(email)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!(count = lists.len(), "found lists");
        Ok(lists)
    }

    #[tracing::instrument(skip(self, list), fields(list_name = %list.name))]
    async fn update(&self, list: &TravelList) -> Result<(), RepositoryError> {
        tracing::debug!("updating list");

        let result = sqlx::query(
            r#"
            UPDATE lists
            SET description = $2, is_visible = $3, updated_at = $4
            WHERE name = $1
            "#,
        )
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.is_visible)
        .bind(list.updated_at)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(list_name = %list.name, "list updated successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self, list), fields(new_name = %list.name))]
    async fn rename(&self, old_name: &str, list: &TravelList) -> Result<TravelList, RepositoryError> {
        tracing::debug!("renaming list");

        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // Holds off review and membership writes on the old key until the move commits.
        let locked: Option<(String,)> =
            sqlx::query_as("SELECT name FROM lists WHERE name = $1 FOR UPDATE")
                .bind(old_name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(database_error)?;

        if locked.is_none() {
            tx.rollback().await.map_err(database_error)?;
            return Err(RepositoryError::NotFound);
        }

        let renamed = sqlx::query_as::<_, TravelList>(&format!(
            r#"
            INSERT INTO lists (name, description, creator_email, creator_nickname, is_visible,
                               destinations, reviews, average_rating, created_at, updated_at)
            SELECT $2, $3, creator_email, creator_nickname, $4,
                   destinations, reviews, average_rating, created_at, $5
            FROM lists
            WHERE name = $1
            ON CONFLICT (name) DO NOTHING
            RETURNING {LIST_COLUMNS}
            "#
        ))
        .bind(old_name)
        .bind(&list.name)
        .bind(&list.description)
        .bind(list.is_visible)
        .bind(list.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?;

        let Some(renamed) = renamed else {
            tx.rollback().await.map_err(database_error)?;
            return Err(RepositoryError::Conflict);
        };

        sqlx::query("DELETE FROM lists WHERE name = $1")
            .bind(old_name)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        tracing::debug!(old_name, new_name = %renamed.name, "list renamed successfully");
        Ok(renamed)
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, name: &str) -> Result<(), RepositoryError> {
        tracing::debug!("deleting list");

        let result = sqlx::query("DELETE FROM lists WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(name, "list deleted successfully");
        Ok(())
    }

    #[tracing::instrument(skip(self, review), fields(review_id = %review.id))]
    async fn append_review(&self, name: &str, review: &Review) -> Result<f64, RepositoryError> {
        tracing::debug!("appending review");

        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let row: Option<(Json<Vec<Review>>,)> =
            sqlx::query_as("SELECT reviews FROM lists WHERE name = $1 FOR UPDATE")
                .bind(name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(database_error)?;

        let Some((Json(mut reviews),)) = row else {
            tx.rollback().await.map_err(database_error)?;
            return Err(RepositoryError::NotFound);
        };

        reviews.push(review.clone());
        let average = average_rating(&reviews);

        sqlx::query("UPDATE lists SET reviews = $2, average_rating = $3 WHERE name = $1")
            .bind(name)
            .bind(Json(&reviews))
            .bind(average)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;

        tracing::debug!(name, average, count = reviews.len(), "review appended");
        Ok(average)
    }

    #[tracing::instrument(skip(self))]
    async fn set_review_visibility(
        &self,
        name: &str,
        index: usize,
        visible: bool,
    ) -> Result<(), RepositoryError> {
        tracing::debug!("setting review visibility");

        let index = i32::try_from(index).map_err(|_| RepositoryError::NotFound)?;

        let result = sqlx::query(
            r#"
            UPDATE lists
            SET reviews = jsonb_set(reviews, ARRAY[($2::int)::text, 'is_visible'], to_jsonb($3::boolean))
            WHERE name = $1 AND jsonb_array_length(reviews) > $2::int
            "#,
        )
        .bind(name)
        .bind(index)
        .bind(visible)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::debug!(name, index, visible, "review visibility set");
        Ok(())
    }

    #[tracing::instrument(skip(self, ids), fields(batch = ids.len()))]
    async fn add_destinations(&self, name: &str, ids: &[u32]) -> Result<Vec<u32>, RepositoryError> {
        tracing::debug!("adding list destinations");

        self.modify_destinations(name, |list| list.merge_destinations(ids) > 0)
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn remove_destination(&self, name: &str, id: u32) -> Result<Vec<u32>, RepositoryError> {
        tracing::debug!("removing list destination");

        self.modify_destinations(name, |list| {
            if !list.has_destination(id) {
                return false;
            }
            list.remove_destination(id);
            true
        })
        .await
    }
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        tracing::debug!("finding user by email");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT email, nickname, is_admin, is_deactivated, is_verified, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    async fn find_all(&self) -> Result<Vec<User>, RepositoryError> {
        tracing::debug!("finding all users");

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT email, nickname, is_admin, is_deactivated, is_verified, created_at
            FROM users
            ORDER BY email
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        tracing::debug!(count = users.len(), "found users");
        Ok(users)
    }

    #[tracing::instrument(skip(self))]
    async fn set_deactivated(&self, email: &str, deactivated: bool) -> Result<(), RepositoryError> {
        tracing::debug!("setting user deactivated flag");

        let result = sqlx::query("UPDATE users SET is_deactivated = $2 WHERE email = $1")
            .bind(email)
            .bind(deactivated)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_admin(&self, email: &str, is_admin: bool) -> Result<(), RepositoryError> {
        tracing::debug!("setting user admin flag");

        let result = sqlx::query("UPDATE users SET is_admin = $2 WHERE email = $1")
            .bind(email)
            .bind(is_admin)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}
