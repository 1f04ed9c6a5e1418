use crate::{config::Config, services::NotificationSender, uploads::LocalBlobStore, AppState};
use async_trait::async_trait;
use avolta_core::models::{
    NewsletterSubscriber, Publication, PublicationStatus, Role, Session, User,
};
use avolta_db::{
    connect_in_memory,
    repositories::{SessionRepository, UserRepository},
};
use chrono::{Duration, Utc};
use sqlx::SqlitePool;
use std::sync::{Arc, Mutex};

pub const TEST_PASSWORD: &str = "password123";

/// Notification sender that remembers what it was asked to send
#[derive(Debug, Default)]
pub struct RecordingNotificationSender {
    deliveries: Mutex<Vec<(String, Vec<String>)>>,
    tests: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotificationSender {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    /// (publication title, recipient emails) per call
    pub fn deliveries(&self) -> Vec<(String, Vec<String>)> {
        self.deliveries.lock().unwrap().clone()
    }

    pub fn tests(&self) -> Vec<String> {
        self.tests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for RecordingNotificationSender {
    async fn send_publication(
        &self,
        publication: &Publication,
        recipients: &[NewsletterSubscriber],
    ) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mail relay unavailable");
        }
        self.deliveries.lock().unwrap().push((
            publication.title.clone(),
            recipients.iter().map(|r| r.email.clone()).collect(),
        ));
        Ok(())
    }

    async fn send_test(&self, email: &str) -> anyhow::Result<()> {
        if self.fail {
            anyhow::bail!("mail relay unavailable");
        }
        self.tests.lock().unwrap().push(email.to_string());
        Ok(())
    }
}

pub fn sample_publication() -> Publication {
    let now = Utc::now();
    Publication {
        id: Some(1),
        title: "Summer sale".to_string(),
        content: "Up to 30% off fragrances.".to_string(),
        image_url: None,
        category: "news".to_string(),
        valid_from: now - Duration::days(1),
        valid_to: now + Duration::days(30),
        created_at: now,
        updated_at: now,
        likes: 0,
        comments: Vec::new(),
        images: Vec::new(),
        status: PublicationStatus::Published,
        author_id: 1,
        author_name: "superadmin".to_string(),
        author_email: "superadmin@avolta.be".to_string(),
        rejection_reason: None,
        rejected_at: None,
    }
}

/// State over a fresh in-memory database, with a recording notifier
pub async fn create_test_app_state(
) -> Result<(AppState, Arc<RecordingNotificationSender>), anyhow::Error> {
    let pool = connect_in_memory().await?;
    let notifier = Arc::new(RecordingNotificationSender::default());

    let uploads_dir = std::env::temp_dir().join(format!("avolta-uploads-{}", uuid::Uuid::new_v4()));
    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        uploads_dir: uploads_dir.to_string_lossy().to_string(),
        ..Config::default()
    };
    let blobs = LocalBlobStore::new(&uploads_dir, &config.uploads_url);

    let state = AppState::new(pool, config, notifier.clone(), Arc::new(blobs));
    Ok((state, notifier))
}

pub async fn create_test_user(
    pool: &SqlitePool,
    email: &str,
    role: Role,
) -> Result<User, anyhow::Error> {
    let mut user = User::new(email.to_string(), TEST_PASSWORD, role)?;
    user.id = Some(UserRepository::new(pool.clone()).create(&user).await?);
    Ok(user)
}

pub async fn create_test_session(pool: &SqlitePool, user_id: i64) -> Result<Session, anyhow::Error> {
    let session = Session::new(user_id);
    SessionRepository::new(pool.clone()).create(&session).await?;
    Ok(session)
}
