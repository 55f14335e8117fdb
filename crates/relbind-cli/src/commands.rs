//! Subcommand handling.

use crate::formatter::Formatter;
use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use relbind::{Dialect, Mapper, MapperConfig, Operation, SchemaSet, Side};
use std::sync::Arc;

/// Inspection subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List entities and their fields
    Entities,

    /// Show the relations an entity exposes
    Relations {
        /// Owner entity
        #[arg(short, long)]
        entity: String,

        /// Bind this slice field as a many-to-many relation instead
        #[arg(long, value_name = "FIELD")]
        many_to_many: Option<String>,

        /// Binding side for --many-to-many
        #[arg(long, value_enum, default_value_t = SideArg::Left)]
        side: SideArg,
    },

    /// Show the effective handler chain of an operation
    Chain {
        /// Entity name
        #[arg(short, long)]
        entity: String,

        /// Operation name (e.g., Insert, Find, HardDelete)
        #[arg(short, long)]
        operation: String,
    },
}

/// Many-to-many binding side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    Left,
    Right,
}

impl From<SideArg> for Side {
    fn from(side: SideArg) -> Self {
        match side {
            SideArg::Left => Side::Left,
            SideArg::Right => Side::Right,
        }
    }
}

/// A mapper together with the schema it was opened over.
pub struct Session {
    pub mapper: Mapper,
    pub schema: SchemaSet,
}

impl Session {
    /// Open a session over `schema`.
    pub fn new(config: &MapperConfig, schema: SchemaSet) -> anyhow::Result<Self> {
        let dialect: Dialect = config.driver.parse()?;
        let mapper = Mapper::with_provider(
            dialect,
            config.data_source.clone(),
            Arc::new(schema.clone()),
            config.join_options()?,
        );
        Ok(Self { mapper, schema })
    }
}

/// Execute a subcommand and return its formatted output.
pub fn execute(
    session: &Session,
    command: &Command,
    formatter: &dyn Formatter,
) -> anyhow::Result<String> {
    match command {
        Command::Entities => {
            let entities = session
                .schema
                .entity_names()
                .map(|name| {
                    session
                        .mapper
                        .model_named(name)
                        .map(|handle| handle.descriptor().clone())
                        .with_context(|| format!("failed to resolve entity {name}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            Ok(formatter.format_entities(&entities))
        }

        Command::Relations {
            entity,
            many_to_many,
            side,
        } => {
            let handle = session.mapper.model_named(entity)?;
            let relations = match many_to_many {
                Some(field) => match handle.preload_many_to_many(field, (*side).into())? {
                    Some(relation) => vec![relation],
                    None => bail!("{entity}.{field} is not a slice of entities"),
                },
                None => handle.relations()?,
            };
            Ok(formatter.format_relations(&relations))
        }

        Command::Chain { entity, operation } => {
            // Built-in operations match case-insensitively; anything else is a custom chain.
            let operation = operation
                .parse::<Operation>()
                .map(|op| op.as_str().to_string())
                .unwrap_or_else(|_| operation.clone());
            let chain = session.mapper.model_handlers(&operation, entity);
            Ok(formatter.format_chain(entity, &operation, &chain))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::JsonFormatter;
    use relbind::{EntityDef, FieldDef, FieldShape, ScalarType};

    fn session() -> Session {
        let schema = SchemaSet::new()
            .with_entity(
                EntityDef::new("User")
                    .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                    .with_field(FieldDef::new("Blogs", FieldShape::slice_of("Blog")))
                    .with_field(FieldDef::new("Friends", FieldShape::slice_of("User"))),
            )
            .with_entity(
                EntityDef::new("Blog")
                    .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
                    .with_field(FieldDef::primitive("UserID", ScalarType::Int64)),
            );
        Session::new(&MapperConfig::default(), schema).unwrap()
    }

    fn run(command: Command) -> serde_json::Value {
        let output = execute(&session(), &command, &JsonFormatter).unwrap();
        serde_json::from_str(&output).unwrap()
    }

    #[test]
    fn test_entities() {
        let value = run(Command::Entities);

        assert_eq!(value[0]["name"], "Blog");
        assert_eq!(value[1]["name"], "User");
    }

    #[test]
    fn test_relations() {
        let value = run(Command::Relations {
            entity: "User".to_string(),
            many_to_many: None,
            side: SideArg::Left,
        });

        assert_eq!(value.as_array().unwrap().len(), 1);
        assert_eq!(value[0]["kind"], "owns_many");
        assert_eq!(value[0]["key_holder"], "Blog");
    }

    #[test]
    fn test_many_to_many_side() {
        let value = run(Command::Relations {
            entity: "User".to_string(),
            many_to_many: Some("Friends".to_string()),
            side: SideArg::Right,
        });

        assert_eq!(value[0]["join"], "User_User");
        assert_eq!(value[0]["relation_field"], "R_UserID");
        assert_eq!(value[0]["side"], "right");
    }

    #[test]
    fn test_many_to_many_on_primitive_field() {
        let command = Command::Relations {
            entity: "User".to_string(),
            many_to_many: Some("ID".to_string()),
            side: SideArg::Left,
        };
        assert!(execute(&session(), &command, &JsonFormatter).is_err());
    }

    #[test]
    fn test_chain_normalizes_operation() {
        let value = run(Command::Chain {
            entity: "User".to_string(),
            operation: "harddelete".to_string(),
        });

        assert_eq!(value["operation"], "HardDelete");
        assert_eq!(value["steps"][1]["name"], "hard-delete");
    }

    #[test]
    fn test_custom_operation_without_chain() {
        let command = Command::Chain {
            entity: "Ghost".to_string(),
            operation: "Audit".to_string(),
        };
        let output = execute(&session(), &command, &JsonFormatter).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(value["steps"].as_array().unwrap().is_empty());
    }
}
