//! # REST API Handler
//!
//! Resource operations behind the HTTP routes. List endpoints go through the
//! query translator and result assembler; the rest are thin wrappers over
//! the document store.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::observability::{Event, Logger};

use super::advanced::{ResultAssembler, ResultEnvelope};
use super::collection::{Collection, DocumentStore, ID_FIELD};
use super::errors::{RestError, RestResult};
use super::filter::{Filter, Predicate};
use super::parser::QueryTranslator;
use super::resource::Resource;
use super::response::{ListResponse, SingleResponse};

/// Field on courses and reviews referencing their bootcamp
pub const BOOTCAMP_REF_FIELD: &str = "bootcamp";

/// REST handler trait for resource operations
pub trait RestHandler: Send + Sync {
    /// Filtered, sorted, paginated list
    fn list(
        &self,
        resource: Resource,
        params: &HashMap<String, String>,
    ) -> RestResult<ResultEnvelope>;

    /// Get a single record by id
    fn get(&self, resource: Resource, id: &str) -> RestResult<SingleResponse<Value>>;

    /// Create a record
    fn create(&self, resource: Resource, body: Value) -> RestResult<SingleResponse<Value>>;

    /// Shallow-merge update of a record
    fn update(&self, resource: Resource, id: &str, body: Value)
        -> RestResult<SingleResponse<Value>>;

    /// Delete a record
    fn delete(&self, resource: Resource, id: &str) -> RestResult<SingleResponse<Value>>;

    /// Every child record (course or review) of one bootcamp
    fn list_for_bootcamp(
        &self,
        resource: Resource,
        bootcamp_id: &str,
    ) -> RestResult<ListResponse<Value>>;

    /// Create a child record attached to an existing bootcamp
    fn create_for_bootcamp(
        &self,
        resource: Resource,
        bootcamp_id: &str,
        body: Value,
    ) -> RestResult<SingleResponse<Value>>;
}

/// Handler backed by a shared [`DocumentStore`]
pub struct DirectoryHandler {
    store: Arc<DocumentStore>,
}

impl DirectoryHandler {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Reject values already held by another record in a unique field
    fn check_unique(
        &self,
        resource: Resource,
        fields: &Map<String, Value>,
        own_id: Option<&str>,
    ) -> RestResult<()> {
        for field in resource.unique_fields() {
            let value = match fields.get(*field) {
                Some(value) if !value.is_null() => value,
                _ => continue,
            };

            let filter = Filter::new().and(*field, Predicate::Equals(value.clone()));
            let clash = self
                .store
                .find_all(resource.collection(), &filter)?
                .iter()
                .any(|doc| doc.get(ID_FIELD).and_then(Value::as_str) != own_id);

            if clash {
                return Err(RestError::Duplicate {
                    field: field.to_string(),
                    value: match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }

    fn require_bootcamp(&self, bootcamp_id: &str) -> RestResult<()> {
        match self.store.get(Resource::Bootcamps.collection(), bootcamp_id)? {
            Some(_) => Ok(()),
            None => Err(RestError::not_found(
                Resource::Bootcamps.collection(),
                bootcamp_id,
            )),
        }
    }
}

fn ensure_bootcamp_child(resource: Resource) -> RestResult<()> {
    if resource.is_bootcamp_child() {
        Ok(())
    } else {
        Err(RestError::Internal(format!(
            "{} are not attached to bootcamps",
            resource
        )))
    }
}

fn into_object(body: Value) -> RestResult<Map<String, Value>> {
    match body {
        Value::Object(fields) => Ok(fields),
        _ => Err(RestError::InvalidBody(
            "request body must be a JSON object".to_string(),
        )),
    }
}

impl RestHandler for DirectoryHandler {
    fn list(
        &self,
        resource: Resource,
        params: &HashMap<String, String>,
    ) -> RestResult<ResultEnvelope> {
        let plan = QueryTranslator::translate(params)?;
        let collection = self.store.collection(resource.collection());

        let fields = plan
            .filter
            .fields()
            .map(|(field, _)| field)
            .collect::<Vec<_>>()
            .join(",");
        let page = plan.page.to_string();
        let limit = plan.limit.to_string();
        Logger::trace(
            Event::QueryTranslated.as_str(),
            &[
                ("collection", collection.name()),
                ("fields", fields.as_str()),
                ("page", page.as_str()),
                ("limit", limit.as_str()),
            ],
        );

        let expansions = resource.expansions();
        ResultAssembler::assemble(&collection, &plan, Some(expansions.as_slice()))
    }

    fn get(&self, resource: Resource, id: &str) -> RestResult<SingleResponse<Value>> {
        self.store
            .get_expanded(resource.collection(), id, &resource.expansions())?
            .map(SingleResponse::new)
            .ok_or_else(|| RestError::not_found(resource.collection(), id))
    }

    fn create(&self, resource: Resource, body: Value) -> RestResult<SingleResponse<Value>> {
        let fields = into_object(body)?;
        self.check_unique(resource, &fields, None)?;

        let doc = self
            .store
            .insert(resource.collection(), Value::Object(fields))?;
        Ok(SingleResponse::new(doc))
    }

    fn update(
        &self,
        resource: Resource,
        id: &str,
        body: Value,
    ) -> RestResult<SingleResponse<Value>> {
        let fields = into_object(body)?;
        self.check_unique(resource, &fields, Some(id))?;

        self.store
            .update(resource.collection(), id, fields)?
            .map(SingleResponse::new)
            .ok_or_else(|| RestError::not_found(resource.collection(), id))
    }

    fn delete(&self, resource: Resource, id: &str) -> RestResult<SingleResponse<Value>> {
        if self.store.remove(resource.collection(), id)? {
            Ok(SingleResponse::deleted())
        } else {
            Err(RestError::not_found(resource.collection(), id))
        }
    }

    fn list_for_bootcamp(
        &self,
        resource: Resource,
        bootcamp_id: &str,
    ) -> RestResult<ListResponse<Value>> {
        ensure_bootcamp_child(resource)?;

        let filter = Filter::new().and(BOOTCAMP_REF_FIELD, Predicate::Equals(bootcamp_id.into()));
        let docs = self.store.find_all(resource.collection(), &filter)?;
        Ok(ListResponse::new(docs))
    }

    fn create_for_bootcamp(
        &self,
        resource: Resource,
        bootcamp_id: &str,
        body: Value,
    ) -> RestResult<SingleResponse<Value>> {
        ensure_bootcamp_child(resource)?;
        self.require_bootcamp(bootcamp_id)?;

        let mut fields = into_object(body)?;
        fields.insert(
            BOOTCAMP_REF_FIELD.to_string(),
            Value::String(bootcamp_id.to_string()),
        );
        self.create(resource, Value::Object(fields))
    }
}
