//! Route definitions for the GreenFund API

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Largest accepted soil image upload
const MAX_IMAGE_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/farms", farm_routes())
        .nest("/activities", activity_routes())
        .nest("/soil", soil_routes())
        .nest("/climate", climate_routes())
        .nest("/climate-actions", climate_action_routes())
        .nest("/badges", badge_routes())
        .nest("/notifications", notification_routes())
        .route("/forum/threads", post(handlers::create_thread))
        .route("/forum/posts", post(handlers::create_post))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        // Public routes
        .nest("/auth", auth_routes())
        .route("/badges", get(handlers::list_badges))
        .route("/forum/threads", get(handlers::list_threads))
        .route("/forum/threads/:thread_id", get(handlers::get_thread))
        .route("/chatbot/ask", post(handlers::ask))
        .merge(protected)
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/token", post(handlers::login))
}

fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::get_me).put(handlers::update_me))
        .route("/me/change-password", post(handlers::change_password))
}

fn farm_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_farms).post(handlers::create_farm))
        .route(
            "/:farm_id",
            get(handlers::get_farm)
                .patch(handlers::update_farm)
                .delete(handlers::delete_farm),
        )
}

fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_activity))
        .route("/farm/:farm_id", get(handlers::list_farm_activities))
        .route("/farm/:farm_id/carbon_summary", get(handlers::carbon_summary))
        .route("/me/recent", get(handlers::recent_activities))
        .route("/emissions/weekly", get(handlers::weekly_emissions))
        .route("/:activity_id", axum::routing::delete(handlers::delete_activity))
}

fn soil_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", post(handlers::create_report))
        .route(
            "/reports/image",
            post(handlers::create_image_report).layer(DefaultBodyLimit::max(MAX_IMAGE_UPLOAD_BYTES)),
        )
        .route("/farm/:farm_id", get(handlers::list_farm_reports))
        .route("/suggestions/summary", get(handlers::suggestion_summary))
}

fn climate_routes() -> Router<AppState> {
    Router::new().route("/:farm_id/forecast", get(handlers::get_forecast))
}

fn climate_action_routes() -> Router<AppState> {
    Router::new()
        .route("/alerts/:farm_id", get(handlers::get_pest_alerts))
        .route("/carbon-guidance/:farm_id", get(handlers::get_carbon_guidance))
        .route("/water-management/:farm_id", get(handlers::get_water_advice))
}

fn badge_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(handlers::my_badges))
        .route("/me/count", get(handlers::my_badge_count))
        .route("/me/award_test/:badge_name", post(handlers::award_test))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/unread-count", get(handlers::get_unread_count))
        .route("/mark-all-read", post(handlers::mark_all_as_read))
        .route("/:notification_id/mark-read", post(handlers::mark_as_read))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use crate::config::test_config;
    use crate::external::{GeocodingClient, LlmClient, WeatherClient};

    fn test_app() -> Router {
        let config = test_config();
        let db = PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .unwrap();
        let state = AppState {
            db,
            weather: WeatherClient::new(&config.weather),
            geocoder: GeocodingClient::new(&config.geocoding),
            llm: LlmClient::new(&config.openai),
            config: Arc::new(config),
        };

        Router::new()
            .nest("/api", api_routes(state.clone()))
            .with_state(state)
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let request = Request::get("/api/farms").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_bad_token() {
        let request = Request::get("/api/badges/me")
            .header(AUTHORIZATION, "Bearer not-a-token")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_creating_thread_requires_token() {
        let request = Request::post("/api/forum/threads")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"title":"Maize rust","content":"Orange spots everywhere"}"#))
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let request = Request::get("/api/does-not-exist").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::NOT_FOUND);
    }
}
