use skymap_core::{AppError, NewSkyImage, SkyImage};
use sqlx::{PgPool, Postgres};

const INSERT_SQL: &str = r#"
    INSERT INTO images (image_url, latitude, longitude)
    VALUES ($1, $2, $3)
    RETURNING id, image_url, latitude, longitude
"#;

const SELECT_ALL_SQL: &str =
    "SELECT id, image_url, latitude, longitude FROM images ORDER BY id ASC";

const SELECT_ONE_SQL: &str = "SELECT id, image_url, latitude, longitude FROM images WHERE id = $1";

/// Trait for image record operations
/// This abstracts the database implementation (PostgreSQL)
#[async_trait::async_trait]
pub trait SkyImageStore: Send + Sync {
    /// Insert one record and return it with its generated id.
    async fn insert(&self, image: NewSkyImage) -> Result<SkyImage, AppError>;

    /// Every stored image, oldest first.
    async fn list_all(&self) -> Result<Vec<SkyImage>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<SkyImage>, AppError>;

    /// Connectivity probe for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Repository for the `images` table
#[derive(Clone)]
pub struct SkyImageRepository {
    pool: PgPool,
}

impl SkyImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SkyImageStore for SkyImageRepository {
    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "insert"))]
    async fn insert(&self, image: NewSkyImage) -> Result<SkyImage, AppError> {
        let record = sqlx::query_as::<Postgres, SkyImage>(INSERT_SQL)
        .bind(&image.image_url)
        .bind(image.coordinate.latitude)
        .bind(image.coordinate.longitude)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select"))]
    async fn list_all(&self) -> Result<Vec<SkyImage>, AppError> {
        let images = sqlx::query_as::<Postgres, SkyImage>(SELECT_ALL_SQL)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: i64) -> Result<Option<SkyImage>, AppError> {
        let image = sqlx::query_as::<Postgres, SkyImage>(SELECT_ONE_SQL)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query_scalar::<Postgres, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}

// SQL, row type and migration kept in step; no database needed.
#[cfg(test)]
mod tests {
    use super::*;

    /// Columns read back into `SkyImage`, in field order.
    const COLUMNS: [&str; 4] = ["id", "image_url", "latitude", "longitude"];

    const MIGRATION: &str =
        include_str!("../../../../migrations/20240101000000_create_images.sql");

    fn column_list() -> String {
        COLUMNS.join(", ")
    }

    #[test]
    fn test_queries_read_every_column_in_field_order() {
        let expected = column_list();
        assert!(INSERT_SQL.contains(&format!("RETURNING {}", expected)));
        assert!(SELECT_ALL_SQL.starts_with(&format!("SELECT {} FROM images", expected)));
        assert!(SELECT_ONE_SQL.starts_with(&format!("SELECT {} FROM images", expected)));
    }

    #[test]
    fn test_columns_match_row_fields() {
        let row = SkyImage {
            id: 1,
            image_url: "https://cdn.test/sky-images/1-a.jpg".to_string(),
            latitude: 28.6,
            longitude: 77.2,
        };
        let value = serde_json::to_value(&row).unwrap();
        let fields = value.as_object().unwrap();

        assert_eq!(fields.len(), COLUMNS.len());
        for column in COLUMNS {
            assert!(fields.contains_key(column), "missing field {}", column);
        }
    }

    #[test]
    fn test_migration_declares_every_column_not_null() {
        assert!(MIGRATION.contains("CREATE TABLE IF NOT EXISTS images"));
        for column in COLUMNS.iter().skip(1) {
            let declaration = MIGRATION
                .lines()
                .find(|line| line.trim_start().starts_with(column))
                .unwrap_or_else(|| panic!("column {} not in migration", column));
            assert!(declaration.contains("NOT NULL"), "{} is nullable", column);
        }
        assert!(MIGRATION.contains("id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY"));
    }

    #[test]
    fn test_list_is_oldest_first() {
        assert!(SELECT_ALL_SQL.ends_with("ORDER BY id ASC"));
    }
}
