//! Template Structure Gate
//!
//! Local structural check of a CloudFormation YAML template: it must parse,
//! declare resources, give each one a type, and (optionally) only use
//! resource types from an allow-list. The allow-list only constrains types
//! under its prefix. Cheap enough to run before the remote validator.

use std::collections::HashSet;

use async_trait::async_trait;
use serde_yaml::Value;

use crate::models::ValidationOutcome;
use crate::validator::{DocumentValidator, GateResult};

#[derive(Debug, Clone)]
struct AllowList {
    prefix: String,
    types: HashSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TemplateStructureGate {
    allow_list: Option<AllowList>,
}

impl TemplateStructureGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict resource types starting with `prefix` to the given names.
    /// Types outside the prefix are not checked.
    pub fn with_allowed_types<I, S>(mut self, prefix: impl Into<String>, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_list = Some(AllowList {
            prefix: prefix.into(),
            types: types.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Collect every structural problem, one line each.
    pub fn check(&self, document: &str) -> Result<usize, Vec<String>> {
        let root: Value = serde_yaml::from_str(document)
            .map_err(|e| vec![format!("Template is not valid YAML: {}", e)])?;

        let Value::Mapping(root) = root else {
            return Err(vec!["Template must be a mapping at the top level".to_string()]);
        };

        let resources = match root.get("Resources") {
            Some(Value::Mapping(resources)) if !resources.is_empty() => resources,
            Some(Value::Mapping(_)) => {
                return Err(vec!["Resources section is empty".to_string()]);
            }
            Some(_) => return Err(vec!["Resources section must be a mapping".to_string()]),
            None => return Err(vec!["Template has no Resources section".to_string()]),
        };

        let mut problems = Vec::new();
        for (logical_id, body) in resources {
            let logical_id = logical_id.as_str().unwrap_or("<non-string id>");
            match body.get("Type").and_then(Value::as_str) {
                None => problems.push(format!("Resource {}: missing Type", logical_id)),
                Some(resource_type) => {
                    if let Some(allowed) = &self.allow_list {
                        if resource_type.starts_with(allowed.prefix.as_str())
                            && !allowed.types.contains(resource_type)
                        {
                            problems.push(format!(
                                "Resource {}: unsupported resource type {}",
                                logical_id, resource_type
                            ));
                        }
                    }
                }
            }
        }

        if problems.is_empty() {
            Ok(resources.len())
        } else {
            Err(problems)
        }
    }
}

#[async_trait]
impl DocumentValidator for TemplateStructureGate {
    fn name(&self) -> &str {
        "template-structure"
    }

    async fn validate(&self, document: &str) -> GateResult<ValidationOutcome> {
        Ok(match self.check(document) {
            Ok(count) => ValidationOutcome::accepted(format!(
                "Template structure ok: {} resources",
                count
            )),
            Err(problems) => ValidationOutcome::rejected(problems.join("\n")),
        })
    }
}
