//! Target resolution for subscriptions.
//!
//! A subscription names its target by model handle, by schema handle, or by
//! model name. Handles resolve to their schema's channel directly. Names go
//! through the subscriber's registry and may not be live yet; the relay then
//! parks the subscription in the registry instead of failing.

use crate::model::Model;
use crate::registry::Registry;
use crate::schema::Schema;

/// What a relay call targets.
#[derive(Debug, Clone, PartialEq)]
pub enum TargetRef {
    Model(Model),
    Schema(Schema),
    Name(String),
}

/// Outcome of resolving a [`TargetRef`].
#[derive(Debug)]
pub(crate) enum Resolved {
    /// The target's schema (and so its channel) is known.
    Schema(Schema),
    /// A name, routed through the registry that owns it.
    Named { registry: Registry, name: String },
    /// A name with no registry to resolve it against.
    Detached(String),
}

impl TargetRef {
    pub(crate) fn resolve(&self, registry: Option<Registry>) -> Resolved {
        match self {
            TargetRef::Model(model) => Resolved::Schema(model.schema().clone()),
            TargetRef::Schema(schema) => Resolved::Schema(schema.clone()),
            TargetRef::Name(name) => match registry {
                Some(registry) => Resolved::Named {
                    registry,
                    name: name.clone(),
                },
                None => Resolved::Detached(name.clone()),
            },
        }
    }
}

impl core::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TargetRef::Model(model) => f.write_str(model.name()),
            TargetRef::Schema(schema) => match schema.name() {
                Some(name) => f.write_str(&name),
                None => write!(f, "schema {}", schema.id()),
            },
            TargetRef::Name(name) => f.write_str(name),
        }
    }
}

impl From<Model> for TargetRef {
    fn from(value: Model) -> Self {
        TargetRef::Model(value)
    }
}

impl From<&Model> for TargetRef {
    fn from(value: &Model) -> Self {
        TargetRef::Model(value.clone())
    }
}

impl From<Schema> for TargetRef {
    fn from(value: Schema) -> Self {
        TargetRef::Schema(value)
    }
}

impl From<&Schema> for TargetRef {
    fn from(value: &Schema) -> Self {
        TargetRef::Schema(value.clone())
    }
}

impl From<&str> for TargetRef {
    fn from(value: &str) -> Self {
        TargetRef::Name(value.to_string())
    }
}

impl From<String> for TargetRef {
    fn from(value: String) -> Self {
        TargetRef::Name(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaDefinition;

    #[test]
    fn handles_resolve_without_a_registry() {
        let registry = Registry::in_memory();
        let schema = registry.schema(SchemaDefinition::new()).unwrap();
        let model = registry.model("University", &schema).unwrap();

        for target in [TargetRef::from(&model), TargetRef::from(&schema)] {
            match target.resolve(None) {
                Resolved::Schema(resolved) => assert_eq!(resolved, schema),
                other => panic!("expected schema, got {other:?}"),
            }
        }
    }

    #[test]
    fn names_need_a_registry() {
        let registry = Registry::in_memory();
        let target = TargetRef::from("Later");

        assert!(matches!(target.resolve(None), Resolved::Detached(name) if name == "Later"));
        assert!(matches!(
            target.resolve(Some(registry)),
            Resolved::Named { name, .. } if name == "Later"
        ));
    }

    #[test]
    fn display_prefers_model_names() {
        let registry = Registry::in_memory();
        let schema = registry.schema(SchemaDefinition::new()).unwrap();
        assert!(TargetRef::from(&schema).to_string().starts_with("schema "));

        registry.model("University", &schema).unwrap();
        assert_eq!(TargetRef::from(&schema).to_string(), "University");
        assert_eq!(TargetRef::from("Student").to_string(), "Student");
    }
}
