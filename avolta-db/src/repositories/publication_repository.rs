// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use avolta_core::clock;
use avolta_core::models::{Comment, Publication, PublicationImage, PublicationStatus};
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use std::collections::HashMap;

use crate::timestamps::{from_db, from_db_opt, to_db, to_db_opt};

type PublicationRow = (
    i64,
    String,
    String,
    Option<String>,
    String,
    String,
    String,
    String,
    String,
    i64,
    String,
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
);

const PUBLICATION_COLUMNS: &str = "id, title, content, image_url, category, valid_from, valid_to, \
     created_at, updated_at, likes, status, author_id, author_name, author_email, \
     rejection_reason, rejected_at";

type ImageRow = (i64, i64, String, i32, Option<String>);

const IMAGE_COLUMNS: &str = "id, publication_id, image_url, display_order, caption";

pub struct PublicationRepository {
    pool: SqlitePool,
}

impl PublicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a publication with its gallery. Comments on the value are
    /// ignored; they are appended with [`PublicationRepository::add_comment`].
    pub async fn create(&self, publication: &Publication) -> Result<i64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let result = sqlx::query(
            r#"
            INSERT INTO publications (
                title, content, image_url, category, valid_from, valid_to,
                created_at, updated_at, likes, status, author_id, author_name,
                author_email, rejection_reason, rejected_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&publication.title)
        .bind(&publication.content)
        .bind(&publication.image_url)
        .bind(&publication.category)
        .bind(to_db(&publication.valid_from))
        .bind(to_db(&publication.valid_to))
        .bind(to_db(&publication.created_at))
        .bind(to_db(&publication.updated_at))
        .bind(publication.likes)
        .bind(publication.status.as_str())
        .bind(publication.author_id)
        .bind(&publication.author_name)
        .bind(&publication.author_email)
        .bind(&publication.rejection_reason)
        .bind(to_db_opt(&publication.rejected_at))
        .execute(&mut *tx)
        .await
        .context("Failed to create publication")?;

        let id = result.last_insert_rowid();
        insert_images(&mut tx, id, &publication.images).await?;

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(id)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Publication>> {
        let row = sqlx::query_as::<_, PublicationRow>(&format!(
            "SELECT {} FROM publications WHERE id = ?",
            PUBLICATION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find publication by id")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut publication = row_to_publication(row)?;
        publication.comments = self.list_comments(id).await?;
        publication.images = self.list_images(id).await?;
        Ok(Some(publication))
    }

    /// Every publication regardless of status, newest first
    pub async fn list_all(&self) -> Result<Vec<Publication>> {
        let rows = sqlx::query_as::<_, PublicationRow>(&format!(
            "SELECT {} FROM publications ORDER BY created_at DESC, id DESC",
            PUBLICATION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list publications")?;

        self.hydrate(rows).await
    }

    pub async fn list_by_status(&self, status: PublicationStatus) -> Result<Vec<Publication>> {
        let rows = sqlx::query_as::<_, PublicationRow>(&format!(
            "SELECT {} FROM publications WHERE status = ? ORDER BY created_at DESC, id DESC",
            PUBLICATION_COLUMNS
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list publications by status")?;

        self.hydrate(rows).await
    }

    /// Published publications whose window contains `now`, newest first.
    ///
    /// Both bounds are inclusive. The category filter ignores ASCII case.
    pub async fn list_visible_at(
        &self,
        now: DateTime<Utc>,
        category: Option<&str>,
    ) -> Result<Vec<Publication>> {
        let now = to_db(&now);
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM publications WHERE status = 'published' AND valid_from <= ",
            PUBLICATION_COLUMNS
        ));
        query.push_bind(now.clone());
        query.push(" AND valid_to >= ");
        query.push_bind(now);

        if let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) {
            query.push(" AND category = ");
            query.push_bind(category.to_string());
            query.push(" COLLATE NOCASE");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query
            .build_query_as::<PublicationRow>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to list visible publications")?;

        self.hydrate(rows).await
    }

    /// Persist editable fields and replace the gallery. Status, likes and
    /// author are left alone.
    pub async fn update(&self, publication: &Publication) -> Result<()> {
        let id = publication
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update publication without ID"))?;

        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin transaction")?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE publications
            SET title = ?, content = ?, image_url = ?, category = ?,
                valid_from = ?, valid_to = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&publication.title)
        .bind(&publication.content)
        .bind(&publication.image_url)
        .bind(&publication.category)
        .bind(to_db(&publication.valid_from))
        .bind(to_db(&publication.valid_to))
        .bind(to_db(&publication.updated_at))
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to update publication")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Publication not found"));
        }

        sqlx::query("DELETE FROM publication_images WHERE publication_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to clear publication images")?;
        insert_images(&mut tx, id, &publication.images).await?;

        tx.commit().await.context("Failed to commit transaction")?;

        Ok(())
    }

    /// Move a pending publication to published.
    ///
    /// Returns false when the row is missing or no longer pending, so two
    /// concurrent moderators cannot both succeed.
    pub async fn approve(&self, id: i64) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE publications
            SET status = 'published', updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(to_db(&clock::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to approve publication")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Move a pending publication to rejected, keeping the record.
    pub async fn reject(&self, id: i64, reason: Option<&str>) -> Result<bool> {
        let now = to_db(&clock::now());
        let rows_affected = sqlx::query(
            r#"
            UPDATE publications
            SET status = 'rejected', rejection_reason = ?, rejected_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(reason)
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to reject publication")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM publications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete publication")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Publication not found"));
        }

        Ok(())
    }

    /// Add one like and return the new count, or None if the row is gone
    pub async fn increment_likes(&self, id: i64) -> Result<Option<i64>> {
        let likes: Option<(i64,)> =
            sqlx::query_as("UPDATE publications SET likes = likes + 1 WHERE id = ? RETURNING likes")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .context("Failed to like publication")?;

        Ok(likes.map(|(count,)| count))
    }

    pub async fn add_comment(&self, comment: &Comment) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (publication_id, content, author, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(comment.publication_id)
        .bind(&comment.content)
        .bind(&comment.author)
        .bind(to_db(&comment.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to add comment")?;

        Ok(result.last_insert_rowid())
    }

    /// Comments in the order they were posted
    pub async fn list_comments(&self, publication_id: i64) -> Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, (i64, i64, String, String, String)>(
            r#"
            SELECT id, publication_id, content, author, created_at
            FROM comments
            WHERE publication_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list comments")?;

        rows.into_iter().map(row_to_comment).collect()
    }

    /// Gallery in display order
    pub async fn list_images(&self, publication_id: i64) -> Result<Vec<PublicationImage>> {
        let rows = sqlx::query_as::<_, ImageRow>(&format!(
            "SELECT {} FROM publication_images WHERE publication_id = ? \
             ORDER BY display_order ASC, id ASC",
            IMAGE_COLUMNS
        ))
        .bind(publication_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list publication images")?;

        Ok(rows.into_iter().map(|row| row_to_image(row).1).collect())
    }

    /// Attach comments and galleries to a page of publications, one query each
    async fn hydrate(&self, rows: Vec<PublicationRow>) -> Result<Vec<Publication>> {
        let mut publications = rows
            .into_iter()
            .map(row_to_publication)
            .collect::<Result<Vec<_>>>()?;

        if publications.is_empty() {
            return Ok(publications);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, publication_id, content, author, created_at FROM comments WHERE publication_id IN (",
        );
        let mut ids = query.separated(", ");
        for id in publications.iter().filter_map(|p| p.id) {
            ids.push_bind(id);
        }
        query.push(") ORDER BY created_at ASC, id ASC");

        let rows = query
            .build_query_as::<(i64, i64, String, String, String)>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to load comments")?;

        let mut by_publication: HashMap<i64, Vec<Comment>> = HashMap::new();
        for row in rows {
            let comment = row_to_comment(row)?;
            by_publication
                .entry(comment.publication_id)
                .or_default()
                .push(comment);
        }

        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM publication_images WHERE publication_id IN (",
            IMAGE_COLUMNS
        ));
        let mut ids = query.separated(", ");
        for id in publications.iter().filter_map(|p| p.id) {
            ids.push_bind(id);
        }
        query.push(") ORDER BY display_order ASC, id ASC");

        let rows = query
            .build_query_as::<ImageRow>()
            .fetch_all(&self.pool)
            .await
            .context("Failed to load publication images")?;

        let mut images: HashMap<i64, Vec<PublicationImage>> = HashMap::new();
        for row in rows {
            let (publication_id, image) = row_to_image(row);
            images.entry(publication_id).or_default().push(image);
        }

        for publication in &mut publications {
            let Some(id) = publication.id else {
                continue;
            };
            if let Some(comments) = by_publication.remove(&id) {
                publication.comments = comments;
            }
            if let Some(gallery) = images.remove(&id) {
                publication.images = gallery;
            }
        }

        Ok(publications)
    }
}

async fn insert_images(
    tx: &mut Transaction<'_, Sqlite>,
    publication_id: i64,
    images: &[PublicationImage],
) -> Result<()> {
    let created_at = to_db(&clock::now());
    for image in images {
        sqlx::query(
            r#"
            INSERT INTO publication_images (publication_id, image_url, display_order, caption, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(publication_id)
        .bind(&image.image_url)
        .bind(image.display_order)
        .bind(&image.caption)
        .bind(&created_at)
        .execute(&mut **tx)
        .await
        .context("Failed to add publication image")?;
    }
    Ok(())
}

fn row_to_publication(row: PublicationRow) -> Result<Publication> {
    let (
        id,
        title,
        content,
        image_url,
        category,
        valid_from,
        valid_to,
        created_at,
        updated_at,
        likes,
        status,
        author_id,
        author_name,
        author_email,
        rejection_reason,
        rejected_at,
    ) = row;

    Ok(Publication {
        id: Some(id),
        title,
        content,
        image_url,
        category,
        valid_from: from_db(&valid_from, "valid_from")?,
        valid_to: from_db(&valid_to, "valid_to")?,
        created_at: from_db(&created_at, "created_at")?,
        updated_at: from_db(&updated_at, "updated_at")?,
        likes,
        comments: Vec::new(),
        images: Vec::new(),
        status: status
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid status in database: {}", e))?,
        author_id,
        author_name,
        author_email,
        rejection_reason,
        rejected_at: from_db_opt(rejected_at, "rejected_at")?,
    })
}

fn row_to_image(row: ImageRow) -> (i64, PublicationImage) {
    let (id, publication_id, image_url, display_order, caption) = row;
    (
        publication_id,
        PublicationImage {
            id: Some(id),
            image_url,
            display_order,
            caption,
        },
    )
}

fn row_to_comment(row: (i64, i64, String, String, String)) -> Result<Comment> {
    let (id, publication_id, content, author, created_at) = row;
    Ok(Comment {
        id: Some(id),
        publication_id,
        content,
        author,
        created_at: from_db(&created_at, "created_at")?,
    })
}
