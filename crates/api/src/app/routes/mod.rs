use axum::{
    Router,
    routing::{delete, get, post, put},
};

pub mod auth;
pub mod posts;
pub mod realtime;
pub mod system;
pub mod users;

/// Endpoints reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/auth/login", post(auth::login))
        .route("/users", post(users::create_account))
        .route("/posts", get(posts::list_posts))
        .route("/posts/:id", get(posts::get_post))
        .route("/ws", get(realtime::ws_handler))
}

/// Endpoints behind `authenticate`; ownership is checked per handler.
pub fn protected_router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/users", get(users::list_accounts))
        .route("/users/:id", get(users::get_account).put(users::update_account))
        .route("/posts", post(posts::create_post))
        .route("/posts/:id", put(posts::update_post).delete(posts::delete_post))
}

/// Endpoints behind `authorize([ADMIN])`.
pub fn admin_router() -> Router {
    Router::new().route("/users/:id", delete(users::delete_account))
}
