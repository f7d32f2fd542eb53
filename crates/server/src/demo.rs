//! Built-in demonstration endpoints.
//!
//! Each endpoint exercises one action kind (or a chain of them) and is used
//! as a smoke test of a deployment.

use waypoint_core::{
    ActionDescriptor, ContentKind, DocumentSpec, Fault, HttpMethod, RequestSpec, ResponseSpec,
    SecretSpec,
};
use waypoint_engine::{Endpoint, ResolveContext, ResolverRegistry};

/// Secret read and written by the `secret` endpoint.
pub const DEMO_SECRET_ID: &str = "common/QA";

/// User record fetched by `next1`.
pub const NEXT1_URL: &str = "https://reqres.in/api/users/2";

const PASSED: &str = "Test Passed";
const FAILED: &str = "Test Failed";

type Outcome = Result<ActionDescriptor, Fault>;

/// Registry holding every demonstration endpoint.
pub fn registry() -> ResolverRegistry {
    let mut registry = ResolverRegistry::new();
    registry.register_fn(Endpoint::get("text"), text);
    registry.register_fn(Endpoint::get("json"), json);
    registry.register_fn(Endpoint::get("html"), html);
    registry.register_fn(Endpoint::get("xml"), xml);
    registry.register_fn(Endpoint::get("next1"), next1);
    registry.register_fn(Endpoint::get("next2"), next2);
    registry.register_fn(
        Endpoint::new("secret", [HttpMethod::Get, HttpMethod::Post]),
        secret,
    );
    registry.register_fn(Endpoint::get("secretFromMemory"), secret_from_memory);
    registry.register_fn(Endpoint::get("documentJson"), document_json);
    registry.register_fn(Endpoint::get("documentJpg"), document_jpg);
    registry
}

fn literal(content_type: &str, body: impl Into<waypoint_core::Payload>) -> Outcome {
    Ok(ActionDescriptor::response(
        ResponseSpec::ok(body).with_content_type(content_type),
    ))
}

fn text(_: &ResolveContext<'_>) -> Outcome {
    literal("text/plain", PASSED)
}

fn json(_: &ResolveContext<'_>) -> Outcome {
    literal("text/json", serde_json::json!({ "message": PASSED }))
}

fn html(_: &ResolveContext<'_>) -> Outcome {
    literal(
        "text/html",
        "<html><header><title>Test HTML Call</title></header><body>Test Passed</body></html>",
    )
}

fn xml(_: &ResolveContext<'_>) -> Outcome {
    literal("text/xml", "<xml><message>Test Passed</message></xml>")
}

/// Fetch a user, then answer with its first name.
fn next1(ctx: &ResolveContext<'_>) -> Outcome {
    let Some(previous) = ctx.previous else {
        return Ok(ActionDescriptor::request(RequestSpec::new(NEXT1_URL)).with_continuation(1));
    };
    let name = previous
        .pointer("/data/first_name")
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    literal(
        "text/plain",
        serde_json::json!({
            "currentAction": previous.continuation,
            "name": name,
        }),
    )
}

/// Three literal hops; only the last one is returned.
fn next2(ctx: &ResolveContext<'_>) -> Outcome {
    let failed = || ResponseSpec::new(500, FAILED).with_content_type("text/plain");
    let descriptor = match ctx.continuation() {
        None => ActionDescriptor::response(failed()).with_continuation(1),
        Some(1) => ActionDescriptor::response(failed()).with_continuation(2),
        Some(2) => ActionDescriptor::response(
            ResponseSpec::ok(PASSED).with_content_type("text/plain"),
        ),
        Some(_) => ActionDescriptor::response(failed()),
    };
    Ok(descriptor)
}

/// `GET` reads the demo secret, `POST` writes the request body to it.
fn secret(ctx: &ResolveContext<'_>) -> Outcome {
    let region = ctx.event.query("region");
    let spec = match ctx.event.http_method {
        HttpMethod::Post => SecretSpec::post(DEMO_SECRET_ID, ctx.event.body.clone()),
        _ => SecretSpec::get(DEMO_SECRET_ID),
    };
    Ok(ActionDescriptor::secret(spec.with_region(region)))
}

fn secret_from_memory(ctx: &ResolveContext<'_>) -> Outcome {
    Ok(ActionDescriptor::response(
        ResponseSpec::ok(ctx.secret.to_json()).with_content(ContentKind::Json),
    ))
}

/// Fetch the document twice through a continuation; the second copy is
/// returned.
fn document(ctx: &ResolveContext<'_>, path: &str) -> Outcome {
    let descriptor = ActionDescriptor::document(DocumentSpec::new(path));
    Ok(if ctx.is_first_hop() {
        descriptor.with_continuation(1)
    } else {
        descriptor
    })
}

fn document_json(ctx: &ResolveContext<'_>) -> Outcome {
    document(ctx, "documents/document.json")
}

fn document_jpg(ctx: &ResolveContext<'_>) -> Outcome {
    document(ctx, "documents/document.jpg")
}
