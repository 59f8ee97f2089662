//! Async client for the ToyDB HTTP API.
//!
//! # Design
//! `DbClient` holds only a validated `Endpoint` and a `Transport`, and
//! carries no mutable state between calls. Every operation is split into a
//! `build_*` method that validates input and produces an `HttpRequest`, and a
//! `parse_*` method that interprets the `HttpResponse`. The async method of
//! the same name runs build, one `Transport::execute`, then parse. Callers
//! with their own HTTP stack can use the build/parse halves directly.
//!
//! Validation lives in `build_*`, so an invalid call fails before the
//! transport is touched.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{ClientError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Collections, FieldUpdate, FieldValue, QueryOptions};

/// Client for one ToyDB server.
#[derive(Debug, Clone)]
pub struct DbClient<T = ReqwestTransport> {
    endpoint: Endpoint,
    transport: T,
}

impl DbClient<ReqwestTransport> {
    /// Client using the default reqwest transport.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_transport(base_url, ReqwestTransport::new())
    }
}

impl<T> DbClient<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::parse(base_url)?,
            transport,
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn build_list_collections(&self) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.endpoint.url("collection", &[]))
    }

    pub fn build_create_collection(&self, collection: &str) -> Result<HttpRequest> {
        require(&[("collection", collection)])?;
        Ok(HttpRequest::new(
            HttpMethod::Post,
            self.endpoint.url("collection", &[("collection", collection)]),
        ))
    }

    pub fn build_add_record<R>(&self, collection: &str, record: &R) -> Result<HttpRequest>
    where
        R: Serialize + ?Sized,
    {
        require(&[("collection", collection)])?;
        let body = serde_json::to_string(record)
            .map_err(|e| ClientError::Serialization(e.to_string()))?;
        Ok(HttpRequest::new(
            HttpMethod::Post,
            self.endpoint.url("records", &[("collection", collection)]),
        )
        .with_json_body(body))
    }

    pub fn build_query(&self, options: &QueryOptions) -> Result<HttpRequest> {
        require(&[("collection", options.collection.as_str())])?;
        let limit = options.effective_limit().to_string();
        Ok(HttpRequest::new(
            HttpMethod::Get,
            self.endpoint.url(
                "records",
                &[
                    ("collection", options.collection.as_str()),
                    ("limit", limit.as_str()),
                ],
            ),
        ))
    }

    pub fn build_find_by_id(&self, collection: &str, id: &str) -> Result<HttpRequest> {
        require(&[("collection", collection), ("id", id)])?;
        Ok(HttpRequest::new(
            HttpMethod::Get,
            self.endpoint
                .url("findone", &[("collection", collection), ("id", id)]),
        ))
    }

    pub fn build_where_equals(
        &self,
        collection: &str,
        field: &str,
        value: &FieldValue,
    ) -> Result<HttpRequest> {
        let value = value_text(value);
        let params = [
            ("collection", collection),
            ("field", field),
            ("value", value.as_str()),
        ];
        require(&params)?;
        Ok(HttpRequest::new(
            HttpMethod::Get,
            self.endpoint.url("where", &params),
        ))
    }

    pub fn build_update_field(&self, update: &FieldUpdate) -> Result<HttpRequest> {
        self.build_field_write("update", update)
    }

    pub fn build_add_new_field(&self, update: &FieldUpdate) -> Result<HttpRequest> {
        self.build_field_write("addField", update)
    }

    fn build_field_write(&self, path: &str, update: &FieldUpdate) -> Result<HttpRequest> {
        let value = value_text(&update.value);
        let params = [
            ("collection", update.collection.as_str()),
            ("field", update.field.as_str()),
            ("value", value.as_str()),
            ("id", update.id.as_str()),
        ];
        require(&params)?;
        Ok(HttpRequest::new(HttpMethod::Put, self.endpoint.url(path, &params)))
    }

    /// A JSON `null` (or empty) body means no collection exists yet.
    pub fn parse_list_collections(&self, response: HttpResponse) -> Result<Collections> {
        if response.body.trim().is_empty() {
            return Ok(Collections::Empty);
        }
        let names: Option<Vec<String>> = parse_json(&response)?;
        Ok(names.map_or(Collections::Empty, Collections::Names))
    }

    pub fn parse_create_collection(&self, response: HttpResponse) -> String {
        response.body
    }

    pub fn parse_add_record(&self, response: HttpResponse) -> String {
        response.body
    }

    pub fn parse_query(&self, response: HttpResponse) -> Result<Value> {
        parse_json(&response)
    }

    pub fn parse_find_by_id(&self, response: HttpResponse) -> Result<Value> {
        check_status(response).and_then(|r| parse_json(&r))
    }

    pub fn parse_where_equals(&self, response: HttpResponse) -> Result<Value> {
        check_status(response).and_then(|r| parse_json(&r))
    }

    pub fn parse_update_field(&self, response: HttpResponse) -> Result<Value> {
        check_status(response).and_then(|r| parse_json(&r))
    }

    pub fn parse_add_new_field(&self, response: HttpResponse) -> Result<Value> {
        check_status(response).and_then(|r| parse_json(&r))
    }
}

impl<T: Transport> DbClient<T> {
    /// `GET /collection`
    pub async fn list_collections(&self) -> Result<Collections> {
        let response = self.send(self.build_list_collections()).await?;
        self.parse_list_collections(response)
    }

    /// `POST /collection`; resolves with the server's reply text.
    pub async fn create_collection(&self, collection: &str) -> Result<String> {
        let response = self.send(self.build_create_collection(collection)?).await?;
        Ok(self.parse_create_collection(response))
    }

    /// `POST /records` with `record` as the JSON body.
    pub async fn add_record<R>(&self, collection: &str, record: &R) -> Result<String>
    where
        R: Serialize + ?Sized + Sync,
    {
        let response = self.send(self.build_add_record(collection, record)?).await?;
        Ok(self.parse_add_record(response))
    }

    /// `GET /records`, at most `limit` records (default 10).
    pub async fn query(&self, options: &QueryOptions) -> Result<Value> {
        let response = self.send(self.build_query(options)?).await?;
        self.parse_query(response)
    }

    /// `GET /findone`
    pub async fn find_by_id(&self, collection: &str, id: &str) -> Result<Value> {
        let response = self.send(self.build_find_by_id(collection, id)?).await?;
        self.parse_find_by_id(response)
    }

    /// `GET /where`: records whose `field` equals `value`.
    pub async fn where_equals(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> Result<Value> {
        let request = self.build_where_equals(collection, field, &value.into())?;
        let response = self.send(request).await?;
        self.parse_where_equals(response)
    }

    /// `PUT /update`: overwrite an existing field.
    pub async fn update_field(&self, update: &FieldUpdate) -> Result<Value> {
        let response = self.send(self.build_update_field(update)?).await?;
        self.parse_update_field(response)
    }

    /// `PUT /addField`: add a field the record does not have yet.
    pub async fn add_new_field(&self, update: &FieldUpdate) -> Result<Value> {
        let response = self.send(self.build_add_new_field(update)?).await?;
        self.parse_add_new_field(response)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "toydb request");
        self.transport.execute(request).await
    }
}

/// Fail with every missing name at once.
fn require(params: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = params
        .iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(ClientError::Validation(format!(
        "missing required parameter: {}",
        missing.join(", ")
    )))
}

/// Empty text stays empty so `require` catches it; `0` and `false` render.
fn value_text(value: &FieldValue) -> String {
    if value.is_missing() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Anything but 200 is a server error carrying the body text.
fn check_status(response: HttpResponse) -> Result<HttpResponse> {
    if response.status == 200 {
        return Ok(response);
    }
    Err(ClientError::Server {
        status: response.status,
        body: response.body,
    })
}

fn parse_json<V: serde::de::DeserializeOwned>(response: &HttpResponse) -> Result<V> {
    serde_json::from_str(&response.body).map_err(|e| ClientError::Parse(e.to_string()))
}
