use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationError};

use crate::relational::JoinType;
use crate::table::schema::ColumnRole;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Column names for every role, before any namespace prefix is applied
#[derive(Clone, Debug, PartialEq, Eq, Validate, Serialize, Deserialize)]
#[serde(default)]
#[validate(schema(function = "validate_distinct_names"))]
pub struct ColumnNames {
    /// Identifier of the linear reference line
    #[validate(length(min = 1, message = "link sequence id column cannot be empty"))]
    pub link_sequence_id: String,

    #[validate(length(min = 1, message = "start position column cannot be empty"))]
    pub start_position: String,

    #[validate(length(min = 1, message = "end position column cannot be empty"))]
    pub end_position: String,

    /// Position of point objects, in [0, 1]
    #[validate(length(min = 1, message = "relative position column cannot be empty"))]
    pub relative_position: String,

    #[validate(length(min = 1, message = "identifier column cannot be empty"))]
    pub id: String,

    /// Entity type; also the substring searched for when deriving a prefix
    #[validate(length(min = 1, message = "object type column cannot be empty"))]
    pub object_type: String,

    /// Nested parent references of child objects
    #[validate(length(min = 1, message = "relations column cannot be empty"))]
    pub relations: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            link_sequence_id: "linkSequenceId".to_string(),
            start_position: "start".to_string(),
            end_position: "end".to_string(),
            relative_position: "relativePosition".to_string(),
            id: "id".to_string(),
            object_type: "objectType".to_string(),
            relations: "relations".to_string(),
        }
    }
}

impl ColumnNames {
    pub fn name_for(&self, role: ColumnRole) -> &str {
        match role {
            ColumnRole::LinkSequenceId => &self.link_sequence_id,
            ColumnRole::StartPosition => &self.start_position,
            ColumnRole::EndPosition => &self.end_position,
            ColumnRole::RelativePosition => &self.relative_position,
            ColumnRole::Identifier => &self.id,
            ColumnRole::ObjectType => &self.object_type,
            ColumnRole::Relations => &self.relations,
        }
    }
}

fn validate_distinct_names(names: &ColumnNames) -> Result<(), ValidationError> {
    let mut seen = std::collections::HashSet::new();
    for role in ColumnRole::ALL {
        if !seen.insert(names.name_for(role)) {
            let mut err = ValidationError::new("duplicate_column_name");
            err.message = Some(
                format!(
                    "column name '{}' is used for more than one role",
                    names.name_for(role)
                )
                .into(),
            );
            return Err(err);
        }
    }
    Ok(())
}

/// Join configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    #[validate(nested)]
    pub columns: ColumnNames,

    /// Join kind used when a caller does not pick one
    pub join_type: JoinType,

    /// Leading text of a prefix derived from the object type (`t` -> `t105_`)
    #[validate(length(min = 1, message = "object type prefix cannot be empty"))]
    pub object_type_prefix: String,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            join_type: JoinType::Inner,
            object_type_prefix: "t".to_string(),
        }
    }
}

impl JoinConfig {
    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate YAML content
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content.to_string(),
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}
