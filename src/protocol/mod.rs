//! Request/response mapping over the catalog components.
//!
//! The transport hands over a [`Request`] together with the [`Operation`] it
//! resolved from the path. [`Protocol::handle`] checks the method, decodes
//! the payload, calls the catalog and renders either the success envelope or
//! the uniform error envelope:
//!
//! ```text
//! { "error": { "url": <request path>, "method": <http method>, "message": <string> } }
//! ```
//!
//! Every failure leaves here as a [`RequestFailure`] with the request path and
//! method attached; nothing escapes as an unstructured fault.

pub mod payload;

use crate::catalog::{Catalog, ElementId, ElementView, NewElement, ResourceId, ResourceView};
use crate::error::{CatalogError, CatalogResult, ErrorKind};
use payload::{ElementPayload, ResourcePayload, SpecificationPayload, parse_payload, require_text};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;

pub const CONTENT_TYPE: &str = "application/json";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Other(value) => value.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Vec<u8>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: Vec::new(),
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: body.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// Parse the body back into JSON; bodies are always produced from JSON.
    pub fn json(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

/// What a request asks the catalog to do, with its path parameters.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Operation {
    Index,
    CreateSpecification,
    ListResources { name: String, version: String },
    CreateResource,
    GetResource { id: ResourceId },
    ListElements { resource: ResourceId },
    CreateElement,
    GetElement { id: ElementId },
}

impl Operation {
    pub fn method(&self) -> Method {
        match self {
            Operation::CreateSpecification
            | Operation::CreateResource
            | Operation::CreateElement => Method::Post,
            Operation::Index
            | Operation::ListResources { .. }
            | Operation::GetResource { .. }
            | Operation::ListElements { .. }
            | Operation::GetElement { .. } => Method::Get,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operation::Index => "index",
            Operation::CreateSpecification => "create_specification",
            Operation::ListResources { .. } => "list_resources",
            Operation::CreateResource => "create_resource",
            Operation::GetResource { .. } => "get_resource",
            Operation::ListElements { .. } => "list_elements",
            Operation::CreateElement => "create_element",
            Operation::GetElement { .. } => "get_element",
        }
    }
}

/// A failure bound to the request that caused it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RequestFailure {
    pub url: String,
    pub method: String,
    pub kind: ErrorKind,
    pub message: String,
}

impl RequestFailure {
    pub fn new(request: &Request, error: &CatalogError) -> Self {
        Self::with_kind(request, error.kind(), error.to_string())
    }

    pub fn with_kind(request: &Request, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            url: request.path.clone(),
            method: request.method.to_string(),
            kind,
            message: message.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn envelope(&self) -> Value {
        json!({
            "error": {
                "url": self.url,
                "method": self.method,
                "message": self.message,
            }
        })
    }

    pub fn into_response(self) -> Response {
        Response {
            status: self.status(),
            body: self.envelope().to_string(),
        }
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}: {}",
            self.method,
            self.url,
            self.status(),
            self.message
        )
    }
}

#[derive(Clone)]
pub struct Protocol {
    catalog: Catalog,
}

impl Protocol {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run `operation` for `request` and render the response.
    pub fn handle(&self, operation: &Operation, request: &Request) -> Response {
        match self.dispatch(operation, request) {
            Ok(body) => Response { status: 200, body },
            Err(failure) => failure.into_response(),
        }
    }

    /// Like [`Protocol::handle`] but keeps the typed failure.
    pub fn dispatch(
        &self,
        operation: &Operation,
        request: &Request,
    ) -> Result<String, RequestFailure> {
        let expected = operation.method();
        if request.method != expected {
            return Err(RequestFailure::with_kind(
                request,
                ErrorKind::Validation,
                format!("Only {expected} is supported."),
            ));
        }

        let value = self
            .run(operation, request)
            .map_err(|err| RequestFailure::new(request, &err))?;
        Ok(value.to_string())
    }

    fn run(&self, operation: &Operation, request: &Request) -> CatalogResult<Value> {
        match operation {
            Operation::Index => to_json(&self.catalog.specifications().list_grouped_by_name()?),
            Operation::CreateSpecification => self.create_specification(&request.body),
            Operation::ListResources { name, version } => self.list_resources(name, version),
            Operation::CreateResource => self.create_resource(&request.body),
            Operation::GetResource { id } => {
                let resources = self.catalog.resources();
                to_json(&resources.view(&resources.find(id)?)?)
            }
            Operation::ListElements { resource } => {
                to_json(&self.catalog.elements().list_by_resource(resource)?)
            }
            Operation::CreateElement => self.create_element(&request.body),
            Operation::GetElement { id } => {
                to_json(&ElementView::from(&self.catalog.elements().find(id)?))
            }
        }
    }

    fn create_specification(&self, body: &[u8]) -> CatalogResult<Value> {
        let payload: SpecificationPayload = parse_payload(body)?;
        let specification = self.catalog.specifications().register(
            payload.name.as_deref().unwrap_or_default(),
            payload.version.as_deref().unwrap_or_default(),
        )?;
        to_json(&specification)
    }

    fn list_resources(&self, name: &str, version: &str) -> CatalogResult<Value> {
        let specification = self.catalog.specifications().find(name, version)?;
        let views: Vec<ResourceView> = self
            .catalog
            .resources()
            .list_by_specification(&specification)?
            .iter()
            .map(|resource| ResourceView::new(resource, &specification))
            .collect();
        to_json(&views)
    }

    fn create_resource(&self, body: &[u8]) -> CatalogResult<Value> {
        let payload: ResourcePayload = parse_payload(body)?;
        let name = require_text(payload.spec_name, "specName")?;
        let version = require_text(payload.spec_version, "specVersion")?;
        let specification = self.catalog.specifications().find(&name, &version)?;
        let resource = self
            .catalog
            .resources()
            .register(payload.url.as_deref().unwrap_or_default(), &specification)?;
        to_json(&ResourceView::new(&resource, &specification))
    }

    fn create_element(&self, body: &[u8]) -> CatalogResult<Value> {
        let payload: ElementPayload = parse_payload(body)?;
        let resource = ResourceId(require_text(payload.resource_id, "resource_id")?);
        let mut new = NewElement::new(require_text(payload.element_type, "type")?)
            .required(payload.required)
            .with_static(payload.is_static);
        new.name = payload.name;
        if let Some(parent) = payload.parent_id {
            new = new.child_of(ElementId(require_text(parent, "parent_id")?));
        }
        let element = self.catalog.elements().register(&resource, new)?;
        to_json(&ElementView::from(&element))
    }
}

fn to_json<T: Serialize>(value: &T) -> CatalogResult<Value> {
    Ok(serde_json::to_value(value)?)
}
