//! HTTP routing layer
//!
//! Every route lives under `/api`. Literal segments such as `/profiles/email/:email`
//! or `/buddies/pending/:user_id` sit beside the `/:id` routes of the same resource;
//! the router's matching tree always prefers a static segment over a parameter, so
//! `email`, `username`, `user` and `pending` are never captured as an id whatever
//! the registration order. A trailing slash is trimmed before routing, so
//! `/api/profiles/` reaches the same handler as `/api/profiles`.

mod handlers;
mod payload;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{MethodRouter, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    trace::TraceLayer,
};

use crate::model::{
    Achievements, Buddies, Challenges, Goals, Listable, Profiles, Resource, UserScoped, Workouts,
};
use crate::store::Store;

use handlers::*;

/// Prefix shared by all routes
pub const API_PREFIX: &str = "/api";

/// Build the application router around `store`
pub fn router(store: Arc<Store>) -> NormalizePath<Router> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api = Router::new()
        .route("/health", get(health).fallback(endpoint_not_found))
        .merge(
            resource::<Profiles>(listable::<Profiles>())
                .route(
                    "/profiles/email/:email",
                    get(profile_by_email).fallback(endpoint_not_found),
                )
                .route(
                    "/profiles/username/:username",
                    get(profile_by_username).fallback(endpoint_not_found),
                ),
        )
        .merge(resource::<Workouts>(creatable::<Workouts>()).merge(per_user::<Workouts>()))
        .merge(
            resource::<Buddies>(creatable::<Buddies>())
                .merge(per_user::<Buddies>())
                .route(
                    "/buddies/pending/:user_id",
                    get(pending_buddies).fallback(endpoint_not_found),
                ),
        )
        .merge(resource::<Goals>(creatable::<Goals>()).merge(per_user::<Goals>()))
        .merge(
            resource::<Achievements>(creatable::<Achievements>())
                .merge(per_user::<Achievements>()),
        )
        .merge(resource::<Challenges>(listable::<Challenges>()).merge(per_user::<Challenges>()));

    let app = Router::new()
        .nest(API_PREFIX, api)
        .fallback(endpoint_not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(store);

    // Runs outside the router so the trimmed path is what gets matched
    NormalizePath::trim_trailing_slash(app)
}

/// `/{kind}` with the given collection methods plus `/{kind}/:id`
fn resource<R: Resource>(collection: MethodRouter<Arc<Store>>) -> Router<Arc<Store>> {
    let path = R::KIND.path();
    Router::new()
        .route(
            &format!("/{path}"),
            collection.fallback(endpoint_not_found),
        )
        .route(
            &format!("/{path}/:id"),
            get(show::<R>)
                .put(update::<R>)
                .delete(destroy::<R>)
                .fallback(endpoint_not_found),
        )
}

fn creatable<R: Resource>() -> MethodRouter<Arc<Store>> {
    post(create::<R>)
}

fn listable<R: Listable>() -> MethodRouter<Arc<Store>> {
    post(create::<R>).get(list::<R>)
}

fn per_user<R: UserScoped>() -> Router<Arc<Store>> {
    Router::new().route(
        &format!("/{}/user/:user_id", R::KIND.path()),
        get(list_for_user::<R>).fallback(endpoint_not_found),
    )
}
