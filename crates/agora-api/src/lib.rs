pub mod access;
pub mod auth;
pub mod categories;
pub mod channels;
pub mod comments;
pub mod error;
pub mod extract;
pub mod images;
pub mod likes;
pub mod loaders;
pub mod mailer;
pub mod messages;
pub mod middleware;
pub mod posts;
pub mod state;
pub mod subscriptions;
pub mod users;
pub mod views;

pub use error::{ApiError, ApiResult};
pub use state::{AppState, AppStateInner};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::middleware::require_auth;

/// Every route of the API. Layers such as CORS and tracing are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/confirm", post(auth::resend_confirmation))
        .route(
            "/confirm/{key}",
            get(auth::confirm_email).post(auth::confirm_email),
        )
        .route("/change-password", post(auth::forgot_password))
        .route("/change-password/{key}", post(auth::change_password));

    // Path segments shared by several routes carry one parameter name: `{id}`.
    let protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        // Users
        .route("/user", put(users::update_me))
        .route("/user/all", get(users::list_users))
        .route("/user/{id}", get(users::get_user))
        .route(
            "/image",
            post(images::upload_image)
                .layer(DefaultBodyLimit::max(images::MAX_IMAGE_SIZE + 64 * 1024)),
        )
        // Channels
        .route("/channel", post(channels::create_channel))
        .route("/channel/my", get(channels::my_channels))
        .route(
            "/channel/{id}",
            get(channels::get_channel).delete(channels::delete_channel),
        )
        .route("/channel/{id}/members", get(channels::list_members))
        .route("/channel/{id}/leave", post(channels::leave))
        .route("/channel/{id}/addMember/{user_id}", post(channels::add_member))
        .route("/channel/{id}/kickOut/{user_id}", post(channels::kick_out))
        // Messages
        .route("/message", delete(messages::delete_messages))
        .route("/message/all/{id}", get(messages::list_messages))
        .route(
            "/message/{id}",
            post(messages::send_message)
                .put(messages::update_message)
                .delete(messages::delete_message),
        )
        // Posts
        .route("/post", post(posts::create_post))
        .route("/post/all", get(posts::list_posts))
        .route(
            "/post/{id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        // Comments
        .route(
            "/comment/{id}",
            post(comments::create_comment)
                .put(comments::update_comment)
                .delete(comments::delete_comment),
        )
        // Likes
        .route("/like/{id}", post(likes::like_post))
        .route("/unlike/{id}", post(likes::unlike_post))
        // Follow graph
        .route("/subscribe/{id}", post(subscriptions::subscribe))
        .route("/unsubscribe/{id}", post(subscriptions::unsubscribe))
        .route("/followers/{id}", get(subscriptions::followers))
        .route("/followers/{id}/count", get(subscriptions::followers_count))
        .route("/following/{id}", get(subscriptions::following))
        .route("/following/{id}/count", get(subscriptions::following_count))
        // Categories
        .route("/category", post(categories::create_category))
        .route("/category/all", get(categories::list_categories))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    let uploads = ServeDir::new(&state.uploads_dir);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service("/uploads", uploads)
        .with_state(state)
}
