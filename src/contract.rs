//! JSON Schema checks for every envelope the service emits.
//!
//! Schemas live under `schema/` and are compiled into the binary. The serve
//! binary runs them over outgoing bodies when `--validate-responses` is set;
//! integration tests run them over every response they inspect.

use crate::protocol::{Operation, Response};
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;

const SPECIFICATION: &str = include_str!("../schema/specification.schema.json");
const INDEX: &str = include_str!("../schema/index.schema.json");
const RESOURCE: &str = include_str!("../schema/resource.schema.json");
const RESOURCE_LIST: &str = include_str!("../schema/resource_list.schema.json");
const ELEMENT: &str = include_str!("../schema/element.schema.json");
const ELEMENT_LISTING: &str = include_str!("../schema/element_listing.schema.json");
const ERROR: &str = include_str!("../schema/error.schema.json");

/// Which wire shape a response body is expected to have.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Envelope {
    Specification,
    Index,
    Resource,
    ResourceList,
    Element,
    ElementListing,
    Error,
}

impl Envelope {
    /// Expected envelope for a response; non-200 statuses always carry the
    /// error envelope, as do responses for unrouted paths.
    pub fn for_response(operation: Option<&Operation>, status: u16) -> Self {
        match operation {
            Some(operation) if status == 200 => Self::for_success(operation),
            _ => Envelope::Error,
        }
    }

    pub fn for_success(operation: &Operation) -> Self {
        match operation {
            Operation::Index => Envelope::Index,
            Operation::CreateSpecification => Envelope::Specification,
            Operation::ListResources { .. } => Envelope::ResourceList,
            Operation::CreateResource | Operation::GetResource { .. } => Envelope::Resource,
            Operation::ListElements { .. } => Envelope::ElementListing,
            Operation::CreateElement | Operation::GetElement { .. } => Envelope::Element,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Envelope::Specification => "specification",
            Envelope::Index => "index",
            Envelope::Resource => "resource",
            Envelope::ResourceList => "resource_list",
            Envelope::Element => "element",
            Envelope::ElementListing => "element_listing",
            Envelope::Error => "error",
        }
    }
}

pub struct ContractSchemas {
    specification: JSONSchema,
    index: JSONSchema,
    resource: JSONSchema,
    resource_list: JSONSchema,
    element: JSONSchema,
    element_listing: JSONSchema,
    error: JSONSchema,
}

impl ContractSchemas {
    pub fn load() -> Result<Self> {
        Ok(Self {
            specification: compile("specification", SPECIFICATION)?,
            index: compile("index", INDEX)?,
            resource: compile("resource", RESOURCE)?,
            resource_list: compile("resource_list", RESOURCE_LIST)?,
            element: compile("element", ELEMENT)?,
            element_listing: compile("element_listing", ELEMENT_LISTING)?,
            error: compile("error", ERROR)?,
        })
    }

    fn schema(&self, envelope: Envelope) -> &JSONSchema {
        match envelope {
            Envelope::Specification => &self.specification,
            Envelope::Index => &self.index,
            Envelope::Resource => &self.resource,
            Envelope::ResourceList => &self.resource_list,
            Envelope::Element => &self.element,
            Envelope::ElementListing => &self.element_listing,
            Envelope::Error => &self.error,
        }
    }

    /// Validate `value` against one envelope, joining every violation into
    /// the error message.
    pub fn validate(&self, envelope: Envelope, value: &Value) -> Result<()> {
        if let Err(errors) = self.schema(envelope).validate(value) {
            let details = errors
                .map(|err| format!("{}: {}", err.instance_path, err))
                .collect::<Vec<_>>()
                .join("\n");
            bail!("{} envelope failed validation:\n{}", envelope.name(), details);
        }
        Ok(())
    }

    /// Parse a rendered response and check it against the envelope its
    /// operation and status call for.
    pub fn check_response(&self, operation: Option<&Operation>, response: &Response) -> Result<()> {
        let envelope = Envelope::for_response(operation, response.status);
        let value = response
            .json()
            .with_context(|| format!("{} body is not JSON", envelope.name()))?;
        self.validate(envelope, &value)
    }
}

fn compile(name: &str, source: &str) -> Result<JSONSchema> {
    let schema: Value =
        serde_json::from_str(source).with_context(|| format!("parsing {name} schema"))?;
    JSONSchema::compile(&schema).map_err(|err| anyhow!("compiling {name} schema: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ID: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn every_schema_compiles() {
        ContractSchemas::load().unwrap();
    }

    #[test]
    fn element_parent_is_optional_but_typed() {
        let schemas = ContractSchemas::load().unwrap();
        let root = json!({"id": ID, "name": null, "type": "object", "required": true, "static": true});
        schemas.validate(Envelope::Element, &root).unwrap();

        let bad = json!({"id": ID, "name": "x", "type": "object", "required": true, "static": true, "parent": 5});
        assert!(schemas.validate(Envelope::Element, &bad).is_err());
    }

    #[test]
    fn empty_collections_violate_listing_schemas() {
        let schemas = ContractSchemas::load().unwrap();
        assert!(schemas.validate(Envelope::Index, &json!([])).is_err());
        assert!(schemas.validate(Envelope::ResourceList, &json!([])).is_err());
        assert!(schemas.validate(Envelope::ElementListing, &json!({})).is_err());
    }

    #[test]
    fn failures_expect_error_envelope() {
        assert_eq!(
            Envelope::for_response(Some(&Operation::Index), 404),
            Envelope::Error
        );
        assert_eq!(Envelope::for_response(None, 200), Envelope::Error);
        assert_eq!(
            Envelope::for_response(Some(&Operation::CreateResource), 200),
            Envelope::Resource
        );
    }
}
