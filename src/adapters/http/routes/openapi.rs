//! OpenAPI description rendered from the route tree.
//!
//! Documentation only: nothing here feeds back into dispatch.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use super::tree::{RouteEntry, Tag};

pub const API_TITLE: &str = "bundlehub api server";
pub const API_DESCRIPTION: &str = "This is bundlehub api server.";
pub const API_VERSION: &str = "1.0.0";

/// Builds an OpenAPI 3 document listing every entry.
pub fn render(entries: &[RouteEntry], token_header: &str, cookie_name: &str) -> Value {
    let mut paths: BTreeMap<&str, Map<String, Value>> = BTreeMap::new();
    let mut tags: Vec<Tag> = Vec::new();

    for entry in entries {
        if let Some(tag) = entry.tag {
            if !tags.iter().any(|t| t.name == tag.name) {
                tags.push(tag);
            }
        }

        let mut operation = json!({
            "operationId": entry.bound.doc.id,
            "summary": entry.bound.doc.summary,
            "responses": {
                "200": { "description": "OK" }
            }
        });
        if let Some(tag) = entry.tag {
            operation["tags"] = json!([tag.name]);
        }
        if !entry.params.is_empty() {
            operation["parameters"] = entry
                .params
                .iter()
                .map(|name| {
                    json!({
                        "name": name,
                        "in": "path",
                        "required": true,
                        "schema": { "type": "string" }
                    })
                })
                .collect();
        }
        if entry.requires_login() {
            operation["security"] = json!([{ "apiToken": [] }, { "session": [] }]);
            operation["responses"]["403"] = json!({ "description": "login required" });
        }

        paths
            .entry(entry.template.as_str())
            .or_default()
            .insert(entry.bound.method.as_str().to_ascii_lowercase(), operation);
    }

    json!({
        "openapi": "3.0.1",
        "info": {
            "title": API_TITLE,
            "description": API_DESCRIPTION,
            "version": API_VERSION
        },
        "tags": tags
            .iter()
            .map(|t| json!({ "name": t.name, "description": t.description }))
            .collect::<Vec<_>>(),
        "paths": paths,
        "components": {
            "securitySchemes": {
                "apiToken": { "type": "apiKey", "in": "header", "name": token_header },
                "session": { "type": "apiKey", "in": "cookie", "name": cookie_name }
            }
        }
    })
}
