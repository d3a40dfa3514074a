//! Repository tests against a real PostgreSQL.
//!
//! Run with `DATABASE_URL` set and `cargo test -p busway-database -- --ignored`;
//! each test gets a fresh migrated database.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use busway_database::repositories::{NotificationRepository, PostRepository, ReviewRepository};
use busway_entity::notification::{
    DeliveryChannel, NewNotification, Notification, NotificationStatus, NotificationType,
};
use busway_entity::post::ReportReason;

async fn user(pool: &PgPool) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES ($1, 'Rider', $2, 'x')")
        .bind(id)
        .bind(format!("{id}@example.com"))
        .execute(pool)
        .await
        .unwrap();
    id
}

async fn post(pool: &PgPool, author: Uuid) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO posts (id, author_id, title, content, category) \
         VALUES ($1, $2, 'Night line tips', 'Sit upstairs', 'travel-tips')",
    )
    .bind(id)
    .bind(author)
    .execute(pool)
    .await
    .unwrap();
    id
}

async fn review(pool: &PgPool, author: Uuid) -> Uuid {
    let route = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO bus_routes (id, route_number, name, start_location, end_location) \
         VALUES ($1, $2, 'Harbour loop', '{}'::jsonb, '{}'::jsonb)",
    )
    .bind(route)
    .bind(route.simple().to_string()[..12].to_string())
    .execute(pool)
    .await
    .unwrap();

    let journey = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO journeys (id, user_id, route_id, booking_id, scheduled_date, status) \
         VALUES ($1, $2, $3, 'BK-1', NOW(), 'completed')",
    )
    .bind(journey)
    .bind(author)
    .bind(route)
    .execute(pool)
    .await
    .unwrap();

    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO reviews (id, user_id, route_id, journey_id, rating, content, editable_until) \
         VALUES ($1, $2, $3, $4, 4, $5, NOW() + INTERVAL '1 day')",
    )
    .bind(id)
    .bind(author)
    .bind(route)
    .bind(journey)
    .bind("Clean bus, punctual departure and a friendly driver all the way.")
    .execute(pool)
    .await
    .unwrap();
    id
}

fn failed_notification(user_id: Uuid) -> Notification {
    let now = Utc::now();
    let mut n = Notification::from_new(
        NewNotification {
            user_id,
            notification_type: NotificationType::Cancellation,
            title: "Trip cancelled".into(),
            message: "Your 08:15 departure was cancelled".into(),
            channels: vec![DeliveryChannel::Email],
            related_id: None,
            related_type: None,
            translations: None,
        },
        vec![DeliveryChannel::Email],
        now,
    );
    n.record_delivery(DeliveryChannel::Email, Some("smtp down".into()));
    n.schedule_retry(now, Duration::seconds(60), 3);
    n
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "needs DATABASE_URL"]
async fn like_counts_come_from_the_write(pool: PgPool) {
    let repo = PostRepository::new(pool.clone());
    let author = user(&pool).await;
    let first = user(&pool).await;
    let second = user(&pool).await;
    let post_id = post(&pool, author).await;

    assert_eq!(repo.like(post_id, first, author).await.unwrap(), Some(1));
    assert_eq!(repo.like(post_id, second, author).await.unwrap(), Some(2));
    assert_eq!(repo.like(post_id, first, author).await.unwrap(), None);
    assert_eq!(repo.unlike(post_id, first, author).await.unwrap(), 1);
    assert_eq!(repo.unlike(post_id, first, author).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "needs DATABASE_URL"]
async fn third_report_hides_a_review(pool: PgPool) {
    let repo = ReviewRepository::new(pool.clone());
    let author = user(&pool).await;
    let review_id = review(&pool, author).await;

    let mut last = None;
    for expected_hidden in [false, false, true] {
        let reporter = user(&pool).await;
        let r = repo
            .report(review_id, reporter, ReportReason::Spam, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(r.is_hidden, expected_hidden, "after {} reports", r.reports_count);
        last = Some(reporter);
    }

    let again = repo
        .report(review_id, last.unwrap(), ReportReason::Spam, None)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "needs DATABASE_URL"]
async fn tenth_upvote_marks_trusted_reviewer(pool: PgPool) {
    let repo = ReviewRepository::new(pool.clone());
    let author = user(&pool).await;
    let review_id = review(&pool, author).await;

    for n in 1..=10 {
        let voter = user(&pool).await;
        let r = repo.upvote(review_id, voter).await.unwrap().unwrap();
        assert_eq!(r.upvotes, n);
        assert_eq!(r.is_trusted_reviewer, n >= 10);
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "needs DATABASE_URL"]
async fn claimed_retry_is_leased_and_reclaimed(pool: PgPool) {
    let repo = NotificationRepository::new(pool.clone());
    let user_id = user(&pool).await;
    let n = repo.insert(&failed_notification(user_id)).await.unwrap();
    let due = n.next_attempt_at.unwrap();
    let lease_until = due + Duration::minutes(5);

    let claimed = repo.claim_due_retries(due, lease_until, 10).await.unwrap();
    assert_eq!(claimed.len(), 1);
    assert_eq!(claimed[0].status, NotificationStatus::Retrying);
    assert_eq!(claimed[0].retry_count, 1);
    assert!(claimed[0].next_attempt_at.is_some());
    drop(claimed);

    let early = repo
        .claim_due_retries(due + Duration::minutes(1), lease_until, 10)
        .await
        .unwrap();
    assert!(early.is_empty());

    let later = lease_until + Duration::seconds(1);
    let reclaimed = repo
        .claim_due_retries(later, later + Duration::minutes(5), 10)
        .await
        .unwrap();
    assert_eq!(reclaimed.len(), 1);
    assert_eq!(reclaimed[0].retry_count, 1);
    assert_eq!(reclaimed[0].status, NotificationStatus::Retrying);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "needs DATABASE_URL"]
async fn read_state_keeps_first_timestamp_and_owner_scope(pool: PgPool) {
    let repo = NotificationRepository::new(pool.clone());
    let owner = user(&pool).await;
    let stranger = user(&pool).await;
    let n = repo.insert(&failed_notification(owner)).await.unwrap();

    assert!(repo.find_owned(n.id, stranger).await.unwrap().is_none());

    let mut first = repo.find_owned(n.id, owner).await.unwrap().unwrap();
    assert!(first.mark_read(Utc::now()));
    let saved = repo.save_read(&first).await.unwrap();

    let mut late = n.clone();
    late.mark_read(Utc::now() + Duration::hours(1));
    let resaved = repo.save_read(&late).await.unwrap();

    assert!(resaved.is_read);
    assert_eq!(resaved.read_at, saved.read_at);
    assert_eq!(repo.count_unread(owner).await.unwrap(), 0);
    assert_eq!(repo.mark_all_read(owner, Utc::now()).await.unwrap(), 0);
}
