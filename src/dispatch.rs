//! Generic dispatch: turn a fixed binding or a raw route parameter into the
//! entity the handler should operate on.
//!
//! Normalization order for route-sourced names: exact match, then
//! case-insensitive, then the alias table. A name that matches nothing is
//! passed through unchanged; it is the handler's model resolution that then
//! fails with a not-found class error. The dispatcher cannot judge validity
//! of arbitrary entity names, so it never rejects one itself.

use crate::error::AppError;
use crate::registry::{EntityKind, ModelRegistry, TableSpec};
use serde_json::{Map, Value};

/// How a route decides which entity it operates on.
#[derive(Clone, Copy, Debug)]
pub enum Binding {
    /// Entity fixed at route-setup time; any route parameter is ignored.
    Fixed(EntityKind),
    /// Entity name read from the `:table_name` path segment.
    FromRoute,
}

/// Per-request resolution result. Created at dispatch, dropped with the
/// request; never shared across requests.
#[derive(Clone, Debug)]
pub struct Target {
    pub name: String,
    spec: Option<TableSpec>,
}

impl Target {
    /// The storage handle, or the downstream "model not found" error when
    /// the name never resolved.
    pub fn table(&self) -> Result<&TableSpec, AppError> {
        self.spec
            .as_ref()
            .ok_or_else(|| AppError::ModelNotFound(self.name.clone()))
    }
}

/// Resolve the dispatch target for one request.
pub fn resolve(registry: &ModelRegistry, binding: Binding, route_param: Option<&str>) -> Target {
    match binding {
        Binding::Fixed(kind) => {
            let spec = registry.get(kind);
            Target {
                name: spec.canonical.to_string(),
                spec: Some(spec.clone()),
            }
        }
        Binding::FromRoute => {
            let raw = route_param.unwrap_or_default();
            if let Some(spec) = registry.lookup(raw) {
                return Target {
                    name: spec.canonical.to_string(),
                    spec: Some(spec.clone()),
                };
            }
            if let Some(spec) = registry.lookup_ci(raw) {
                tracing::debug!(raw, canonical = spec.canonical, "normalized entity name by case");
                return Target {
                    name: spec.canonical.to_string(),
                    spec: Some(spec.clone()),
                };
            }
            if let Some(spec) = registry.lookup_alias(raw) {
                tracing::debug!(raw, canonical = spec.canonical, "normalized entity name by alias");
                return Target {
                    name: spec.canonical.to_string(),
                    spec: Some(spec.clone()),
                };
            }
            tracing::debug!(raw, "entity name did not normalize; passing through");
            Target {
                name: raw.to_string(),
                spec: None,
            }
        }
    }
}

/// Remove the route-parameter keys from a decoded object so the handler
/// never sees the table name as a domain field.
pub fn strip_route_param(obj: &mut Map<String, Value>) {
    obj.remove("tableName");
    obj.remove("table_name");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ModelRegistry {
        ModelRegistry::new()
    }

    #[test]
    fn fixed_binding_ignores_route_parameter() {
        let reg = registry();
        let t = resolve(&reg, Binding::Fixed(EntityKind::Course), Some("Movie"));
        assert_eq!(t.name, "Course");
        assert_eq!(t.table().unwrap().table_name, "courses");
    }

    #[test]
    fn exact_name_resolves_directly() {
        let reg = registry();
        let t = resolve(&reg, Binding::FromRoute, Some("Payment"));
        assert_eq!(t.name, "Payment");
        assert!(t.table().is_ok());
    }

    #[test]
    fn lowercased_name_resolves_to_canonical() {
        let reg = registry();
        let t = resolve(&reg, Binding::FromRoute, Some("newsandblogs"));
        assert_eq!(t.name, "NewsAndBlogs");
        assert_eq!(t.table().unwrap().table_name, "news_and_blogs");
    }

    #[test]
    fn alias_resolves_same_as_canonical() {
        let reg = registry();
        let via_alias = resolve(&reg, Binding::FromRoute, Some("Orders"));
        let via_canonical = resolve(&reg, Binding::FromRoute, Some("Order"));
        assert_eq!(via_alias.name, via_canonical.name);
        assert_eq!(
            via_alias.table().unwrap().table_name,
            via_canonical.table().unwrap().table_name
        );
    }

    #[test]
    fn unknown_name_passes_through_and_fails_downstream() {
        let reg = registry();
        let t = resolve(&reg, Binding::FromRoute, Some("Webinar"));
        assert_eq!(t.name, "Webinar");
        let err = t.table().unwrap_err();
        assert!(matches!(err, AppError::ModelNotFound(ref n) if n == "Webinar"));
    }

    #[test]
    fn missing_route_parameter_is_an_unresolved_target() {
        let reg = registry();
        let t = resolve(&reg, Binding::FromRoute, None);
        assert!(t.table().is_err());
    }

    #[test]
    fn strip_removes_both_spellings() {
        let mut obj = serde_json::json!({
            "tableName": "Course",
            "table_name": "Course",
            "title": "Oil painting"
        });
        let map = obj.as_object_mut().unwrap();
        strip_route_param(map);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("title"));
    }
}
