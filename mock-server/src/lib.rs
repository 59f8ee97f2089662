use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub type Record = Map<String, Value>;

/// Collections by name, records in insertion order.
pub type Db = Arc<RwLock<BTreeMap<String, Vec<Record>>>>;

type TextError = (StatusCode, String);

#[derive(Deserialize)]
pub struct CollectionParams {
    pub collection: String,
}

#[derive(Deserialize)]
pub struct QueryParams {
    pub collection: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Deserialize)]
pub struct FindParams {
    pub collection: String,
    pub id: String,
}

#[derive(Deserialize)]
pub struct WhereParams {
    pub collection: String,
    pub field: String,
    pub value: String,
}

#[derive(Deserialize)]
pub struct FieldParams {
    pub collection: String,
    pub field: String,
    pub value: String,
    pub id: String,
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(BTreeMap::new()));
    Router::new()
        .route("/collection", get(list_collections).post(create_collection))
        .route("/records", get(query_records).post(add_record))
        .route("/findone", get(find_one))
        .route("/where", get(where_equals))
        .route("/update", put(update_field))
        .route("/addField", put(add_field))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// `null` rather than `[]` when nothing exists yet.
async fn list_collections(State(db): State<Db>) -> Json<Option<Vec<String>>> {
    let db = db.read().await;
    if db.is_empty() {
        return Json(None);
    }
    Json(Some(db.keys().cloned().collect()))
}

async fn create_collection(
    State(db): State<Db>,
    Query(params): Query<CollectionParams>,
) -> Result<String, TextError> {
    if params.collection.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "collection name is empty".to_string()));
    }
    debug!(collection = %params.collection, "create collection");
    db.write()
        .await
        .entry(params.collection.clone())
        .or_default();
    Ok(format!("Collection {} created", params.collection))
}

async fn add_record(
    State(db): State<Db>,
    Query(params): Query<CollectionParams>,
    Json(mut record): Json<Record>,
) -> Result<String, TextError> {
    let mut db = db.write().await;
    let records = collection_mut(&mut db, &params.collection)?;
    let id = match record.get("id") {
        Some(id) => value_text(id),
        None => {
            let id = Uuid::new_v4().to_string();
            record.insert("id".to_string(), Value::String(id.clone()));
            id
        }
    };
    debug!(collection = %params.collection, %id, "add record");
    records.push(record);
    Ok(format!("Record {id} added to {}", params.collection))
}

async fn query_records(
    State(db): State<Db>,
    Query(params): Query<QueryParams>,
) -> Result<Json<Vec<Record>>, TextError> {
    let db = db.read().await;
    let records = db.get(&params.collection).ok_or_else(|| missing(&params.collection))?;
    Ok(Json(records.iter().take(params.limit).cloned().collect()))
}

async fn find_one(
    State(db): State<Db>,
    Query(params): Query<FindParams>,
) -> Result<Json<Record>, TextError> {
    let db = db.read().await;
    let records = db.get(&params.collection).ok_or_else(|| missing(&params.collection))?;
    records
        .iter()
        .find(|r| has_id(r, &params.id))
        .cloned()
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, "record not found".to_string()))
}

async fn where_equals(
    State(db): State<Db>,
    Query(params): Query<WhereParams>,
) -> Result<Json<Vec<Record>>, TextError> {
    let db = db.read().await;
    let records = db.get(&params.collection).ok_or_else(|| missing(&params.collection))?;
    Ok(Json(
        records
            .iter()
            .filter(|r| r.get(&params.field).is_some_and(|v| value_text(v) == params.value))
            .cloned()
            .collect(),
    ))
}

async fn update_field(
    State(db): State<Db>,
    Query(params): Query<FieldParams>,
) -> Result<Json<Record>, TextError> {
    write_field(db, params, true).await
}

async fn add_field(
    State(db): State<Db>,
    Query(params): Query<FieldParams>,
) -> Result<Json<Record>, TextError> {
    write_field(db, params, false).await
}

/// `must_exist` selects update semantics; otherwise the field must be new.
async fn write_field(
    db: Db,
    params: FieldParams,
    must_exist: bool,
) -> Result<Json<Record>, TextError> {
    let mut db = db.write().await;
    let records = collection_mut(&mut db, &params.collection)?;
    let record = records
        .iter_mut()
        .find(|r| has_id(r, &params.id))
        .ok_or_else(|| (StatusCode::NOT_FOUND, "record not found".to_string()))?;

    let exists = record.contains_key(&params.field);
    if must_exist && !exists {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("field {} does not exist", params.field),
        ));
    }
    if !must_exist && exists {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("field {} already exists", params.field),
        ));
    }

    debug!(collection = %params.collection, id = %params.id, field = %params.field, "write field");
    record.insert(params.field, parse_value(&params.value));
    Ok(Json(record.clone()))
}

fn collection_mut<'a>(
    db: &'a mut BTreeMap<String, Vec<Record>>,
    name: &str,
) -> Result<&'a mut Vec<Record>, TextError> {
    db.get_mut(name).ok_or_else(|| missing(name))
}

fn missing(collection: &str) -> TextError {
    (
        StatusCode::NOT_FOUND,
        format!("collection {collection} not found"),
    )
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get("id").is_some_and(|v| value_text(v) == id)
}

/// Strings compare by content, everything else by its JSON text.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numbers and booleans arrive as query text; keep them typed.
fn parse_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(raw.to_string()),
    }
}
