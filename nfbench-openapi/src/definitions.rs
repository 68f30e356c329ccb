//! Registry of reusable schemas and parameters across all loaded documents.
//!
//! 3GPP documents reference each other, for example `TS29571_CommonData.yaml#/components/schemas/Supi`.
//! References are resolved by their last segment against the definitions of every loaded document.
//! When two documents define the same name, the first one loaded wins.

use std::collections::BTreeMap;

use crate::document::{OpenApiDocument, Parameter, Schema, ref_name};

/// Upper bound on chained `$ref` hops, which guards against reference cycles.
const MAX_REF_HOPS: usize = 8;

/// All named schemas and parameters.
#[derive(Clone, Debug, Default)]
pub struct Definitions {
    schemas: BTreeMap<String, Schema>,
    parameters: BTreeMap<String, Parameter>,
}

/// Properties and required fields of an object schema after merging `allOf` parts.
#[derive(Clone, Debug, Default)]
pub struct ObjectShape {
    /// All properties by name.
    pub properties: BTreeMap<String, Schema>,
    /// Names of required properties, in declaration order and without duplicates.
    pub required: Vec<String>,
}

impl Definitions {
    /// Collects the components of the given documents.
    pub fn from_documents<'a>(documents: impl IntoIterator<Item = &'a OpenApiDocument>) -> Self {
        let mut definitions = Self::default();
        for document in documents {
            for (name, schema) in &document.components.schemas {
                definitions
                    .schemas
                    .entry(name.clone())
                    .or_insert_with(|| schema.clone());
            }
            for (name, parameter) in &document.components.parameters {
                definitions
                    .parameters
                    .entry(name.clone())
                    .or_insert_with(|| parameter.clone());
            }
        }
        definitions
    }

    /// Looks up a schema by name or reference.
    pub fn schema(&self, reference: &str) -> Option<&Schema> {
        self.schemas.get(ref_name(reference))
    }

    /// Looks up a parameter by name or reference.
    pub fn parameter(&self, reference: &str) -> Option<&Parameter> {
        self.parameters.get(ref_name(reference))
    }

    /// Follows `$ref`s until a concrete schema is reached.
    ///
    /// Unresolvable references yield the last schema seen.
    pub fn resolve<'a>(&'a self, mut schema: &'a Schema) -> &'a Schema {
        for _ in 0..MAX_REF_HOPS {
            let Some(target) = schema.reference.as_deref().and_then(|r| self.schema(r)) else {
                break;
            };
            schema = target;
        }
        schema
    }

    /// Resolves a parameter `$ref`, returning plain parameters unchanged.
    pub fn resolve_parameter<'a>(&'a self, parameter: &'a Parameter) -> Option<&'a Parameter> {
        match parameter.reference.as_deref() {
            Some(reference) => self.parameter(reference),
            None => Some(parameter),
        }
    }

    /// Returns the merged properties and required fields of an object schema.
    pub fn object_shape(&self, schema: &Schema) -> ObjectShape {
        let mut shape = ObjectShape::default();
        self.collect_shape(schema, &mut shape, 0);
        shape
    }

    fn collect_shape(&self, schema: &Schema, shape: &mut ObjectShape, depth: usize) {
        if depth > MAX_REF_HOPS {
            return;
        }

        let schema = self.resolve(schema);
        for (name, property) in &schema.properties {
            shape
                .properties
                .entry(name.clone())
                .or_insert_with(|| property.clone());
        }
        for name in &schema.required {
            if !shape.required.contains(name) {
                shape.required.push(name.clone());
            }
        }
        for part in &schema.all_of {
            self.collect_shape(part, shape, depth + 1);
        }
    }
}
