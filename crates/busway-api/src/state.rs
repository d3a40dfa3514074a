//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use sqlx::PgPool;

use busway_auth::{JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator};
use busway_core::config::AppConfig;
use busway_core::error::AppError;
use busway_database::repositories::{
    BusRouteRepository, JourneyRepository, NotificationRepository, PostRepository,
    PreferenceRepository, ReviewRepository, SavedRouteRepository, UserRepository,
};
use busway_service::notification::channel::build_transports;
use busway_service::planning::GoogleDirections;
use busway_service::{
    AdminUserService, AuthService, JourneyService, NotificationDispatcher, NotificationService,
    PostService, RetryPolicy, ReviewService, RoutePlanningService, UserService,
};
use busway_worker::{NotificationRetrySweep, ReviewLockSweep, SweepExecutor};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// PostgreSQL connection pool
    pub db_pool: PgPool,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// User repository, used to reload the caller on every request
    pub user_repo: Arc<UserRepository>,

    // ── Services ─────────────────────────────────────────────
    /// Notification dispatcher
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Registration and login
    pub auth_service: Arc<AuthService>,
    /// Profile self-service
    pub user_service: Arc<UserService>,
    /// Account administration
    pub admin_user_service: Arc<AdminUserService>,
    /// Community posts
    pub post_service: Arc<PostService>,
    /// Route reviews
    pub review_service: Arc<ReviewService>,
    /// Notification inbox and preferences
    pub notification_service: Arc<NotificationService>,
    /// Bus routes and journeys
    pub journey_service: Arc<JourneyService>,
    /// Trip planning
    pub planning_service: Arc<RoutePlanningService>,
}

impl AppState {
    /// Wires repositories, transports and services over `db_pool`.
    ///
    /// Nothing here touches the database, so a lazily connected pool is fine.
    pub fn build(config: AppConfig, db_pool: PgPool) -> Result<Self, AppError> {
        // ── Repositories ─────────────────────────────────────────────
        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));
        let preference_repo = Arc::new(PreferenceRepository::new(db_pool.clone()));
        let post_repo = Arc::new(PostRepository::new(db_pool.clone()));
        let review_repo = Arc::new(ReviewRepository::new(db_pool.clone()));
        let route_repo = Arc::new(BusRouteRepository::new(db_pool.clone()));
        let journey_repo = Arc::new(JourneyRepository::new(db_pool.clone()));
        let saved_route_repo = Arc::new(SavedRouteRepository::new(db_pool.clone()));

        // ── Delivery ─────────────────────────────────────────────────
        let (email, push) = build_transports(&config.notification)?;
        let dispatcher = Arc::new(NotificationDispatcher::new(
            Arc::clone(&notification_repo) as _,
            Arc::clone(&preference_repo) as _,
            Arc::clone(&user_repo) as _,
            Arc::clone(&email),
            push,
            RetryPolicy::from_config(&config.notification),
        ));

        // ── Auth ─────────────────────────────────────────────────────
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repo),
            Arc::new(PasswordHasher::new()),
            Arc::new(PasswordValidator::new(&config.auth)),
            jwt_encoder,
            Arc::clone(&jwt_decoder),
            email,
        ));

        // ── Services ─────────────────────────────────────────────────
        let directions = Arc::new(GoogleDirections::new(&config.maps)?);

        Ok(Self {
            user_service: Arc::new(UserService::new(Arc::clone(&user_repo))),
            admin_user_service: Arc::new(AdminUserService::new(Arc::clone(&user_repo))),
            post_service: Arc::new(PostService::new(post_repo, Arc::clone(&dispatcher))),
            review_service: Arc::new(ReviewService::new(
                review_repo,
                Arc::clone(&journey_repo),
                Arc::clone(&route_repo),
            )),
            notification_service: Arc::new(NotificationService::new(
                notification_repo,
                preference_repo,
            )),
            journey_service: Arc::new(JourneyService::new(
                Arc::clone(&route_repo),
                journey_repo,
                Arc::clone(&dispatcher),
            )),
            planning_service: Arc::new(RoutePlanningService::new(
                directions,
                route_repo,
                saved_route_repo,
            )),
            auth_service,
            dispatcher,
            jwt_decoder,
            user_repo,
            db_pool,
            config: Arc::new(config),
        })
    }

    /// The periodic sweeps run by the background worker and `busway-cli worker sweep`.
    pub fn sweep_executor(&self) -> SweepExecutor {
        let batch_size = self.config.worker.batch_size;
        let mut executor = SweepExecutor::new();
        executor.register(Arc::new(NotificationRetrySweep::new(
            Arc::clone(&self.dispatcher),
            batch_size,
        )));
        executor.register(Arc::new(ReviewLockSweep::new(
            Arc::clone(&self.review_service),
            batch_size,
        )));
        executor
    }
}
