//! Output formatters for inspection results.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use relbind::{EntityDescriptor, FieldDef, HandlerChain, RelationDescriptor};
use std::sync::Arc;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format entities and their fields.
    fn format_entities(&self, entities: &[Arc<EntityDescriptor>]) -> String;

    /// Format the relations of one entity.
    fn format_relations(&self, relations: &[Arc<RelationDescriptor>]) -> String;

    /// Format a handler chain.
    fn format_chain(&self, entity: &str, operation: &str, chain: &HandlerChain) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_entities(&self, entities: &[Arc<EntityDescriptor>]) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Entity", "Field", "Shape", "Nullable", "Tags"]);

        for entity in entities {
            for field in entity.fields() {
                table.add_row(vec![
                    Cell::new(entity.name()),
                    Cell::new(&field.name),
                    Cell::new(field.shape.to_string()),
                    Cell::new(if field.nullable { "yes" } else { "" }),
                    Cell::new(field.tags.to_string()),
                ]);
            }
        }

        format!("{}\n{} entity(ies)", table, entities.len())
    }

    fn format_relations(&self, relations: &[Arc<RelationDescriptor>]) -> String {
        if relations.is_empty() {
            return "No relations".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec!["Field", "Kind", "Sub", "Key", "Join", "Side"]);

        for relation in relations {
            table.add_row(vec![
                Cell::new(&relation.container_field().name),
                Cell::new(relation.kind()),
                Cell::new(relation.sub().name()),
                Cell::new(qualified_key(relation)),
                Cell::new(relation.join_entity().map(|j| j.name()).unwrap_or("")),
                Cell::new(relation.side().map(side_name).unwrap_or("")),
            ]);
        }

        table.to_string()
    }

    fn format_chain(&self, entity: &str, operation: &str, chain: &HandlerChain) -> String {
        let mut table = Table::new();
        table.set_header(vec!["#", "Step", "Argument"]);

        for (i, step) in chain.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1),
                Cell::new(step.name()),
                Cell::new(step.argument().unwrap_or("")),
            ]);
        }

        format!("{} {}\n{}", entity, operation, table)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_entities(&self, entities: &[Arc<EntityDescriptor>]) -> String {
        let list: Vec<serde_json::Value> = entities
            .iter()
            .map(|entity| {
                serde_json::json!({
                    "name": entity.name(),
                    "fields": entity.fields(),
                })
            })
            .collect();

        serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_relations(&self, relations: &[Arc<RelationDescriptor>]) -> String {
        let list: Vec<serde_json::Value> = relations.iter().map(|r| relation_to_json(r)).collect();
        serde_json::to_string_pretty(&list).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_chain(&self, entity: &str, operation: &str, chain: &HandlerChain) -> String {
        serde_json::to_string_pretty(&serde_json::json!({
            "entity": entity,
            "operation": operation,
            "steps": chain,
        }))
        .unwrap_or_else(|_| "{}".to_string())
    }
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_entities(&self, entities: &[Arc<EntityDescriptor>]) -> String {
        let mut output = String::from("entity,field,shape,nullable,tags\n");
        for entity in entities {
            for field in entity.fields() {
                output.push_str(&field_row_csv(entity.name(), field));
                output.push('\n');
            }
        }
        output
    }

    fn format_relations(&self, relations: &[Arc<RelationDescriptor>]) -> String {
        let mut output = String::from("field,kind,sub,key,join,side\n");
        for relation in relations {
            output.push_str(&format!(
                "{},{},{},{},{},{}\n",
                relation.container_field().name,
                relation.kind(),
                relation.sub().name(),
                qualified_key(relation),
                relation.join_entity().map(|j| j.name()).unwrap_or(""),
                relation.side().map(side_name).unwrap_or(""),
            ));
        }
        output
    }

    fn format_chain(&self, _entity: &str, _operation: &str, chain: &HandlerChain) -> String {
        let mut output = String::from("step,argument\n");
        for step in chain {
            output.push_str(&format!("{},{}\n", step.name(), step.argument().unwrap_or("")));
        }
        output
    }
}

/// `Holder.Field` naming the key that carries a relation.
fn qualified_key(relation: &RelationDescriptor) -> String {
    format!(
        "{}.{}",
        relation.key_holder().name(),
        relation.relation_field().name
    )
}

fn side_name(side: relbind::Side) -> &'static str {
    match side {
        relbind::Side::Left => "left",
        relbind::Side::Right => "right",
    }
}

/// Convert a relation to a JSON object.
fn relation_to_json(relation: &RelationDescriptor) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    obj.insert(
        "field".to_string(),
        relation.container_field().name.clone().into(),
    );
    obj.insert("kind".to_string(), relation.kind().as_str().into());
    obj.insert("owner".to_string(), relation.owner().name().into());
    obj.insert("sub".to_string(), relation.sub().name().into());
    obj.insert("key_holder".to_string(), relation.key_holder().name().into());
    obj.insert(
        "relation_field".to_string(),
        relation.relation_field().name.clone().into(),
    );
    if let Some(join) = relation.join_entity() {
        obj.insert("join".to_string(), join.name().into());
    }
    if let Some(field) = relation.sub_relation_field() {
        obj.insert("sub_relation_field".to_string(), field.name.clone().into());
    }
    if let Some(side) = relation.side() {
        obj.insert("side".to_string(), side_name(side).into());
    }
    serde_json::Value::Object(obj)
}

/// Format a field as a CSV row.
fn field_row_csv(entity: &str, field: &FieldDef) -> String {
    format!(
        "{},{},{},{},\"{}\"",
        entity,
        field.name,
        field.shape,
        field.nullable,
        escape_csv(&field.tags.to_string())
    )
}

/// Escape a string for CSV (double quotes).
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use relbind::{EntityDef, Operation, ScalarType};

    fn user() -> Arc<EntityDescriptor> {
        let def = EntityDef::new("User")
            .with_field(FieldDef::primitive("ID", ScalarType::Int64).primary_key())
            .with_field(FieldDef::primitive("Name", ScalarType::String));
        Arc::new(EntityDescriptor::build(def).unwrap())
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv("say \"hi\""), "say \"\"hi\"\"");
    }

    #[test]
    fn test_entities_csv() {
        let output = CsvFormatter.format_entities(&[user()]);
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "entity,field,shape,nullable,tags");
        assert_eq!(lines[1], "User,ID,int64,false,\"primary key\"");
        assert_eq!(lines[2], "User,Name,string,false,\"\"");
    }

    #[test]
    fn test_entities_json() {
        let output = JsonFormatter.format_entities(&[user()]);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value[0]["name"], "User");
        assert_eq!(value[0]["fields"][0]["tags"], "primary key");
    }

    #[test]
    fn test_chain_json() {
        let chain = Operation::Update.default_chain();
        let output = JsonFormatter.format_chain("User", "Update", &chain);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["operation"], "Update");
        assert_eq!(value["steps"][2]["name"], "update");
    }

    #[test]
    fn test_empty_relations_table() {
        assert_eq!(TableFormatter.format_relations(&[]), "No relations");
    }

    #[test]
    fn test_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }
}
