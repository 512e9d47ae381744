//! Path to [`Operation`] resolution for the HTTP transport.
//!
//! Only the path is consulted here; method mismatches on a known path are
//! reported by [`Protocol::dispatch`] so they carry the uniform envelope with
//! status 400. Unknown paths become a 404 envelope.

use crate::catalog::{ElementId, ResourceId};
use crate::error::ErrorKind;
use crate::protocol::{Operation, Protocol, Request, RequestFailure, Response};

/// Map a request path (without query string) onto the operation it names.
pub fn resolve(path: &str) -> Option<Operation> {
    let trimmed = path.strip_prefix('/')?;
    let segments: Vec<&str> = match trimmed {
        "specifications/" => return Some(Operation::Index),
        _ => trimmed.split('/').collect(),
    };

    let operation = match segments.as_slice() {
        ["specifications"] => Operation::Index,
        ["specification"] => Operation::CreateSpecification,
        ["resource"] => Operation::CreateResource,
        ["element"] => Operation::CreateElement,
        ["specifications", name, version, "resources"] => Operation::ListResources {
            name: segment(name)?.to_string(),
            version: segment(version)?.to_string(),
        },
        ["resources", id] => Operation::GetResource {
            id: ResourceId::from(segment(id)?),
        },
        ["resources", id, "elements"] => Operation::ListElements {
            resource: ResourceId::from(segment(id)?),
        },
        ["elements", id] => Operation::GetElement {
            id: ElementId::from(segment(id)?),
        },
        _ => return None,
    };
    Some(operation)
}

fn segment(value: &str) -> Option<&str> {
    let valid = !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-'));
    valid.then_some(value)
}

/// Resolve and run `request`, returning the operation (if any) with the
/// rendered response.
pub fn route(protocol: &Protocol, request: &Request) -> (Option<Operation>, Response) {
    match resolve(&request.path) {
        Some(operation) => {
            let response = protocol.handle(&operation, request);
            (Some(operation), response)
        }
        None => (None, unknown_path(request).into_response()),
    }
}

/// Failure for a request whose body could not be read off the connection.
pub fn unreadable_body(request: &Request, err: &std::io::Error) -> RequestFailure {
    RequestFailure::with_kind(
        request,
        ErrorKind::Validation,
        format!("Could not read request body: {err}"),
    )
}

pub fn unknown_path(request: &Request) -> RequestFailure {
    RequestFailure::with_kind(
        request,
        ErrorKind::NotFound,
        format!("No such endpoint: {}", request.path),
    )
}
