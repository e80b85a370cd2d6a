//! Schema introspection, used by the `check` command to compare the
//! arguments we send with what the server actually accepts.

use serde::{Deserialize, Serialize};

use super::{Operation, OperationKind};


#[derive(Debug, Clone, Default, Serialize)]
pub(crate) struct MutationArguments {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct IntrospectedSchema {
    /// `null` if the schema has no mutations at all.
    pub(crate) mutation_type: Option<IntrospectedType>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IntrospectedType {
    pub(crate) name: Option<String>,
    pub(crate) fields: Option<Vec<IntrospectedField>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IntrospectedField {
    pub(crate) name: String,
    pub(crate) args: Vec<IntrospectedArg>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct IntrospectedArg {
    pub(crate) name: String,
    #[serde(rename = "type")]
    pub(crate) ty: TypeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TypeRef {
    pub(crate) kind: String,
    pub(crate) name: Option<String>,
    #[serde(rename = "ofType")]
    pub(crate) of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    pub(crate) fn is_non_null(&self) -> bool {
        self.kind == "NON_NULL"
    }

    /// The name of the named type at the bottom of the wrapper chain.
    pub(crate) fn base_name(&self) -> Option<&str> {
        match (&self.name, &self.of_type) {
            (Some(name), _) => Some(name),
            (None, Some(inner)) => inner.base_name(),
            (None, None) => None,
        }
    }
}

impl Operation for MutationArguments {
    const NAME: &'static str = "MutationArguments";
    const KIND: OperationKind = OperationKind::Query;
    const ROOT_FIELD: &'static str = "__schema";
    // The root mutation type can have any name, so it is not looked up by name.
    const DOCUMENT: &'static str = "\
query MutationArguments {
  __schema {
    mutationType {
      name
      fields {
        name
        args {
          name
          type {
            kind
            name
            ofType {
              kind
              name
            }
          }
        }
      }
    }
  }
}
";
    type Output = IntrospectedSchema;
}
