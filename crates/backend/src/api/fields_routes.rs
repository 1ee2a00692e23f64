use std::collections::HashMap;

use axum::{
    Json,
    routing::{self, MethodRouter},
};
use serde_json::Value;

use libs::fields::{self, Field};

use crate::common::{AppState, Resource};

/// `POST` a `[{id, value}, ...]` list, get back `{id: value, ...}`.
pub struct FieldsResource;

impl Resource<AppState> for FieldsResource {
    fn routes() -> MethodRouter<AppState> {
        routing::post(shape_fields)
    }
}

async fn shape_fields(Json(list): Json<Vec<Field>>) -> Json<HashMap<String, Value>> {
    Json(fields::fields_to_map(list))
}
