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

use std::sync::Arc;

use avolta_core::models::{
    Comment, NewPublication, Publication, PublicationPatch, PublicationStatus, Role,
};
use avolta_core::{DomainError, Principal};
use avolta_db::repositories::PublicationRepository;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::{NewsletterService, NotificationSender, ServiceResult};

/// Publication lifecycle: authoring, moderation and public interaction.
pub struct PublicationService {
    publications: PublicationRepository,
    newsletter: NewsletterService,
}

impl PublicationService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            publications: PublicationRepository::new(pool.clone()),
            newsletter: NewsletterService::new(pool, notifier),
        }
    }

    pub async fn create(&self, input: NewPublication, author: &Principal) -> ServiceResult<Publication> {
        author.require(Role::Admin)?;

        let send_newsletter = input.send_newsletter;
        let id = self
            .publications
            .create(&Publication::create(input, author)?)
            .await?;
        let publication = self.load(id).await?;

        tracing::info!(
            publication_id = id,
            author = %author.email,
            status = %publication.status,
            "Publication created"
        );

        if send_newsletter && publication.status == PublicationStatus::Published {
            self.dispatch_newsletter(&publication).await;
        }

        Ok(publication)
    }

    /// Edit content fields. The status is never touched.
    pub async fn update(
        &self,
        id: i64,
        patch: PublicationPatch,
        actor: &Principal,
    ) -> ServiceResult<Publication> {
        let mut publication = self.load(id).await?;

        if !publication.can_be_modified_by(actor) {
            return Err(
                DomainError::forbidden("Only the author or a superadmin may edit this publication")
                    .into(),
            );
        }

        publication.apply_patch(patch)?;
        self.publications.update(&publication).await?;

        tracing::info!(publication_id = id, actor = %actor.email, "Publication updated");
        self.load(id).await
    }

    /// Publish a pending publication. The role is checked before anything else.
    pub async fn approve(
        &self,
        id: i64,
        actor: &Principal,
        send_newsletter: bool,
    ) -> ServiceResult<Publication> {
        actor.require(Role::SuperAdmin)?;

        let publication = self.load(id).await?;
        publication.ensure_pending()?;

        if !self.publications.approve(id).await? {
            return Err(self.transition_conflict(id).await);
        }

        let publication = self.load(id).await?;
        tracing::info!(publication_id = id, actor = %actor.email, "Publication approved");

        if send_newsletter {
            self.dispatch_newsletter(&publication).await;
        }

        Ok(publication)
    }

    /// Reject a pending publication. The record is kept with status `rejected`.
    pub async fn reject(
        &self,
        id: i64,
        actor: &Principal,
        reason: Option<&str>,
    ) -> ServiceResult<Publication> {
        actor.require(Role::SuperAdmin)?;

        let publication = self.load(id).await?;
        publication.ensure_pending()?;

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        if !self.publications.reject(id, reason).await? {
            return Err(self.transition_conflict(id).await);
        }

        tracing::info!(publication_id = id, actor = %actor.email, "Publication rejected");
        self.load(id).await
    }

    pub async fn delete(&self, id: i64, actor: &Principal) -> ServiceResult<()> {
        let publication = self.load(id).await?;

        if !publication.can_be_modified_by(actor) {
            return Err(
                DomainError::forbidden(
                    "Only the author or a superadmin may delete this publication",
                )
                .into(),
            );
        }

        self.publications.delete(id).await?;
        tracing::info!(publication_id = id, actor = %actor.email, "Publication deleted");
        Ok(())
    }

    /// Add one like. Repeated likes from the same visitor all count.
    pub async fn like(&self, id: i64) -> ServiceResult<Publication> {
        self.get_visible(id).await?;

        if self.publications.increment_likes(id).await?.is_none() {
            return Err(not_found());
        }
        self.load(id).await
    }

    pub async fn add_comment(
        &self,
        id: i64,
        content: &str,
        author: Option<&str>,
    ) -> ServiceResult<Comment> {
        self.get_visible(id).await?;

        let mut comment = Comment::new(id, content, author)?;
        comment.id = Some(self.publications.add_comment(&comment).await?);

        tracing::debug!(publication_id = id, "Comment added");
        Ok(comment)
    }

    /// A single publication as the public sees it; hidden ones do not exist.
    pub async fn get_visible(&self, id: i64) -> ServiceResult<Publication> {
        match self.publications.find_by_id(id).await? {
            Some(publication) if publication.is_visible() => Ok(publication),
            _ => Err(not_found()),
        }
    }

    pub async fn list_visible(&self, category: Option<&str>) -> ServiceResult<Vec<Publication>> {
        self.list_visible_at(Utc::now(), category).await
    }

    pub async fn list_visible_at(
        &self,
        now: DateTime<Utc>,
        category: Option<&str>,
    ) -> ServiceResult<Vec<Publication>> {
        Ok(self.publications.list_visible_at(now, category).await?)
    }

    /// Every publication whatever its status, for the admin area
    pub async fn list_all(&self, actor: &Principal) -> ServiceResult<Vec<Publication>> {
        actor.require(Role::Admin)?;
        Ok(self.publications.list_all().await?)
    }

    pub async fn list_pending(&self, actor: &Principal) -> ServiceResult<Vec<Publication>> {
        actor.require(Role::SuperAdmin)?;
        Ok(self
            .publications
            .list_by_status(PublicationStatus::Pending)
            .await?)
    }

    async fn load(&self, id: i64) -> ServiceResult<Publication> {
        self.publications
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)
    }

    // Another moderator won the race between our read and the conditional update
    async fn transition_conflict(&self, id: i64) -> super::ServiceError {
        match self.load(id).await {
            Ok(current) => match current.ensure_pending() {
                Err(conflict) => conflict.into(),
                Ok(()) => DomainError::conflict("Publication changed concurrently").into(),
            },
            Err(err) => err,
        }
    }

    async fn dispatch_newsletter(&self, publication: &Publication) {
        match self.newsletter.send_publication(publication).await {
            Ok(count) => {
                tracing::info!(publication_id = ?publication.id, recipients = count, "Newsletter sent")
            }
            Err(e) => {
                tracing::warn!(publication_id = ?publication.id, error = %e, "Newsletter dispatch failed")
            }
        }
    }
}

fn not_found() -> super::ServiceError {
    DomainError::not_found("Publication not found").into()
}
