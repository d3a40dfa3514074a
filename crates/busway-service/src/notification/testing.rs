//! In-memory stand-ins for the dispatcher's storage and transports.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use busway_core::error::AppError;
use busway_core::result::AppResult;
use busway_core::types::pagination::{PageRequest, PageResponse};
use busway_entity::notification::{DeliveryChannel, Notification, NotificationPreference};

use super::channel::{DeliveryReport, DeliveryTransport};
use super::dispatcher::{NotificationDispatcher, RetryPolicy};
use super::store::{
    NotificationInbox, NotificationStore, PreferenceStore, Recipient, RecipientDirectory,
};

#[derive(Default)]
pub struct MemoryNotifications {
    rows: Mutex<HashMap<Uuid, Notification>>,
}

impl MemoryNotifications {
    pub fn get(&self, id: Uuid) -> Option<Notification> {
        self.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Store a record as-is, bypassing dispatch.
    pub fn seed(&self, notification: Notification) {
        self.rows
            .lock()
            .unwrap()
            .insert(notification.id, notification);
    }
}

#[async_trait]
impl NotificationStore for MemoryNotifications {
    async fn insert(&self, notification: &Notification) -> AppResult<Notification> {
        self.rows
            .lock()
            .unwrap()
            .insert(notification.id, notification.clone());
        Ok(notification.clone())
    }

    async fn update_delivery(&self, notification: &Notification) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&notification.id) {
            Some(row) => {
                *row = notification.clone();
                Ok(())
            }
            None => Err(AppError::not_found("Notification not found")),
        }
    }

    async fn claim_due_retries(
        &self,
        now: DateTime<Utc>,
        lease_until: DateTime<Utc>,
        limit: i64,
    ) -> AppResult<Vec<Notification>> {
        let mut rows = self.rows.lock().unwrap();
        let mut due: Vec<&mut Notification> =
            rows.values_mut().filter(|n| n.is_retry_due(now)).collect();
        due.sort_by_key(|n| n.next_attempt_at);
        Ok(due
            .into_iter()
            .take(limit as usize)
            .map(|n| {
                n.claim_retry(now, lease_until);
                n.clone()
            })
            .collect())
    }
}

#[async_trait]
impl NotificationInbox for MemoryNotifications {
    async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let mut items: Vec<Notification> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = items.len() as i64;
        let limit = page.limit_or(20);
        let items = items
            .into_iter()
            .skip(page.offset_for(20) as usize)
            .take(limit as usize)
            .collect();
        Ok(PageResponse::new(items, page.page(), limit, total))
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<i64> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> AppResult<Option<Notification>> {
        Ok(self.get(id).filter(|n| n.user_id == user_id))
    }

    async fn save_read(&self, notification: &Notification) -> AppResult<Notification> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(&notification.id)
            .filter(|n| n.user_id == notification.user_id)
            .ok_or_else(|| AppError::not_found("Notification not found"))?;
        if !row.is_read {
            row.is_read = notification.is_read;
            row.read_at = notification.read_at;
            row.updated_at = notification.updated_at;
        }
        Ok(row.clone())
    }

    async fn mark_all_read(&self, user_id: Uuid, now: DateTime<Utc>) -> AppResult<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0;
        for n in rows.values_mut().filter(|n| n.user_id == user_id) {
            if n.mark_read(now) {
                updated += 1;
            }
        }
        Ok(updated)
    }
}

#[derive(Default)]
pub struct MemoryPreferences {
    rows: Mutex<HashMap<Uuid, NotificationPreference>>,
}

impl MemoryPreferences {
    pub fn put(&self, prefs: NotificationPreference) {
        self.rows.lock().unwrap().insert(prefs.user_id, prefs);
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn find(&self, user_id: Uuid) -> AppResult<Option<NotificationPreference>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert(&self, prefs: &NotificationPreference) -> AppResult<NotificationPreference> {
        self.put(prefs.clone());
        Ok(prefs.clone())
    }
}

#[derive(Default)]
pub struct MemoryDirectory {
    rows: Mutex<HashMap<Uuid, Recipient>>,
}

impl MemoryDirectory {
    pub fn add(&self, recipient: Recipient) {
        self.rows.lock().unwrap().insert(recipient.user_id, recipient);
    }

    pub fn remove(&self, user_id: Uuid) {
        self.rows.lock().unwrap().remove(&user_id);
    }
}

#[async_trait]
impl RecipientDirectory for MemoryDirectory {
    async fn find_recipient(&self, user_id: Uuid) -> AppResult<Option<Recipient>> {
        Ok(self.rows.lock().unwrap().get(&user_id).cloned())
    }
}

/// Transport that replays scripted outcomes and records every call.
pub struct ScriptedTransport {
    channel: DeliveryChannel,
    script: Mutex<VecDeque<DeliveryReport>>,
    fallback: Mutex<DeliveryReport>,
    calls: Mutex<Vec<(String, String, String)>>,
}

impl ScriptedTransport {
    pub fn new(channel: DeliveryChannel) -> Self {
        Self {
            channel,
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(DeliveryReport::delivered()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Outcome returned once the script is exhausted.
    pub fn always(&self, report: DeliveryReport) {
        *self.fallback.lock().unwrap() = report;
    }

    /// Queue outcomes for the next calls.
    pub fn then(&self, report: DeliveryReport) {
        self.script.lock().unwrap().push_back(report);
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryTransport for ScriptedTransport {
    fn channel(&self) -> DeliveryChannel {
        self.channel
    }

    async fn send(&self, to: &str, title: &str, body: &str) -> DeliveryReport {
        self.calls
            .lock()
            .unwrap()
            .push((to.to_string(), title.to_string(), body.to_string()));
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| self.fallback.lock().unwrap().clone())
    }
}

/// A dispatcher wired to in-memory fakes, with handles to each of them.
pub struct Harness {
    pub dispatcher: Arc<NotificationDispatcher>,
    pub notifications: Arc<MemoryNotifications>,
    pub preferences: Arc<MemoryPreferences>,
    pub directory: Arc<MemoryDirectory>,
    pub email: Arc<ScriptedTransport>,
    pub push: Arc<ScriptedTransport>,
}

impl Harness {
    pub fn new(policy: RetryPolicy) -> Self {
        let notifications = Arc::new(MemoryNotifications::default());
        let preferences = Arc::new(MemoryPreferences::default());
        let directory = Arc::new(MemoryDirectory::default());
        let email = Arc::new(ScriptedTransport::new(DeliveryChannel::Email));
        let push = Arc::new(ScriptedTransport::new(DeliveryChannel::Push));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            notifications.clone(),
            preferences.clone(),
            directory.clone(),
            email.clone(),
            push.clone(),
            policy,
        ));
        Self {
            dispatcher,
            notifications,
            preferences,
            directory,
            email,
            push,
        }
    }

    /// Register a user reachable on both channels.
    pub fn user(&self) -> Uuid {
        let user_id = Uuid::new_v4();
        self.directory.add(Recipient {
            user_id,
            email: format!("{user_id}@example.com"),
            push_token: Some(format!("device-{user_id}")),
            language: "en".to_string(),
        });
        user_id
    }
}
