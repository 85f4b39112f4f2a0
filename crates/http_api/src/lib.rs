mod errors;
mod handlers;
mod requests;
mod state;

use axum::{Router, routing::post};

pub use errors::HttpError;
pub use requests::{
    EmptyRequest, NodeRequest, PlantRequest, RecentParametersRequest, WindowRequest,
};
pub use state::HttpState;

pub fn router(state: HttpState) -> Router<()> {
    let api = Router::new()
        .route("/checkpoint_latest", post(handlers::checkpoint_latest))
        .route(
            "/checkpoint_previous_change",
            post(handlers::checkpoint_previous_change),
        )
        .route("/last_reading", post(handlers::last_reading))
        .route("/aggregates", post(handlers::aggregates))
        .route("/node_status", post(handlers::node_status))
        .route("/parameters_latest", post(handlers::parameters_latest))
        .route("/parameters_recent", post(handlers::parameters_recent))
        .route("/market_online", post(handlers::market_online))
        .route("/tick", post(handlers::tick));

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
}

#[cfg(test)]
mod tests;
