//! # REST API HTTP Routes
//!
//! Axum routes for the resource endpoints under `/api/v1`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde_json::Value;

use super::advanced::ResultEnvelope;
use super::errors::RestError;
use super::handler::RestHandler;
use super::resource::Resource;
use super::response::{ListResponse, SingleResponse};

/// Prefix every resource is mounted under
pub const API_PREFIX: &str = "/api/v1";

/// REST API server state
pub struct RestServer<H: RestHandler> {
    handler: Arc<H>,
}

impl<H: RestHandler + 'static> RestServer<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }

    /// Build the Axum router
    pub fn router(self) -> Router {
        let state = Arc::new(self);

        let bootcamps = resource_routes::<H>(Resource::Bootcamps)
            .merge(child_routes::<H>(Resource::Courses))
            .merge(child_routes::<H>(Resource::Reviews));

        let mut router = Router::new().nest(
            &format!("{}/{}", API_PREFIX, Resource::Bootcamps.collection()),
            bootcamps,
        );
        for resource in [Resource::Courses, Resource::Reviews, Resource::Users] {
            router = router.nest(
                &format!("{}/{}", API_PREFIX, resource.collection()),
                resource_routes::<H>(resource),
            );
        }

        router.with_state(state)
    }
}

/// Shared state type
type ServerState<H> = Arc<RestServer<H>>;

/// `/` and `/:id` routes for one resource
fn resource_routes<H: RestHandler + 'static>(resource: Resource) -> Router<ServerState<H>> {
    Router::new()
        .route("/", get(list_handler::<H>).post(create_handler::<H>))
        .route(
            "/:id",
            get(get_handler::<H>)
                .put(update_handler::<H>)
                .delete(delete_handler::<H>),
        )
        .layer(Extension(resource))
}

/// `/:id/<children>` routes hanging off a bootcamp
fn child_routes<H: RestHandler + 'static>(resource: Resource) -> Router<ServerState<H>> {
    Router::new()
        .route(
            &format!("/:id/{}", resource.collection()),
            get(list_children_handler::<H>).post(create_child_handler::<H>),
        )
        .layer(Extension(resource))
}

/// Map axum's body rejection into the API error shape
fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, RestError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RestError::InvalidBody(rejection.body_text()))
}

/// List records handler
async fn list_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<ResultEnvelope>, RestError> {
    let result = server.handler.list(resource, &query)?;
    Ok(Json(result))
}

/// Get single record handler
async fn get_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
) -> Result<Json<SingleResponse<Value>>, RestError> {
    let result = server.handler.get(resource, &id)?;
    Ok(Json(result))
}

/// Create record handler
async fn create_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleResponse<Value>>), RestError> {
    let result = server.handler.create(resource, json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Update record handler
async fn update_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SingleResponse<Value>>, RestError> {
    let result = server.handler.update(resource, &id, json_body(body)?)?;
    Ok(Json(result))
}

/// Delete record handler
async fn delete_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Path(id): Path<String>,
) -> Result<Json<SingleResponse<Value>>, RestError> {
    let result = server.handler.delete(resource, &id)?;
    Ok(Json(result))
}

/// List a bootcamp's courses or reviews
async fn list_children_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Path(bootcamp_id): Path<String>,
) -> Result<Json<ListResponse<Value>>, RestError> {
    let result = server.handler.list_for_bootcamp(resource, &bootcamp_id)?;
    Ok(Json(result))
}

/// Add a course or review to a bootcamp
async fn create_child_handler<H: RestHandler + 'static>(
    State(server): State<ServerState<H>>,
    Extension(resource): Extension<Resource>,
    Path(bootcamp_id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SingleResponse<Value>>), RestError> {
    let result = server
        .handler
        .create_for_bootcamp(resource, &bootcamp_id, json_body(body)?)?;
    Ok((StatusCode::CREATED, Json(result)))
}
