//! Form fields
//!
//! A [`Field`] is an attribute edited through the entity form. The set of
//! field types is closed ([`FieldKind`]) and each type tag in configuration
//! maps to one constructor registered by [`FieldFactory::fields`].

use crate::attribute::{Attribute, AttributeBuilder, SchemaAttribute};
use crate::collection::{AttributeFactory, ItemConfig};
use crate::query::Query;
use cruddy_core::{Arrayable, EngineResult};
use serde_json::{Map, Value, json};

/// Factory building field collections
pub type FieldFactory = AttributeFactory<Field>;

// ============================================================================
// Field
// ============================================================================

/// An attribute rendered as a form input
#[derive(Debug, Clone)]
pub struct Field {
    base: Attribute,
    kind: FieldKind,
    label: Option<String>,
    required: bool,
    disabled: bool,
}

impl Field {
    fn configure(
        builder: AttributeBuilder,
        item: &ItemConfig,
        class: &str,
        can_order: bool,
        kind: FieldKind,
    ) -> EngineResult<Self> {
        Ok(Self {
            base: builder.class(class).can_order(can_order).build(),
            kind,
            label: item.string("label")?,
            required: item.flag("required", false)?,
            disabled: item.flag("disabled", false)?,
        })
    }

    /// Type-specific settings
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a value is required
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether the input is read-only
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Display label: translation, then configured label, then generated
    pub fn label(&self) -> String {
        self.base
            .translate(Some("fields"), self.label.as_deref())
            .unwrap_or_else(|| self.base.generate_label())
    }

    /// Localized placeholder, if one exists
    pub fn placeholder(&self) -> Option<String> {
        self.base.translate(Some("placeholders"), None)
    }
}

impl Arrayable for Field {
    fn to_array(&self) -> Map<String, Value> {
        let mut map = self.base.to_array();
        map.insert("label".into(), Value::String(self.label()));
        map.insert("placeholder".into(), json!(self.placeholder()));
        map.insert("required".into(), Value::Bool(self.required));
        map.insert("disabled".into(), Value::Bool(self.disabled));
        self.kind.extend(&mut map);
        map
    }
}

impl SchemaAttribute for Field {
    fn attribute(&self) -> &Attribute {
        &self.base
    }

    fn modify_query(&self, query: &mut Query) {
        if let FieldKind::Relation { .. } = self.kind {
            query.with(self.base.id());
        }
    }
}

// ============================================================================
// FieldKind
// ============================================================================

/// Type-specific field settings
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Single line input (`string`, `email`, `password`)
    Input { input_type: InputType },
    /// Multi-line text
    Textarea { rows: u64 },
    /// Numeric input
    Number { float: bool },
    /// Checkbox
    Boolean,
    /// Date and/or time picker
    DateTime { mode: DateMode },
    /// Select from a fixed list of values
    Enum {
        items: Vec<(String, String)>,
        prompt: Option<String>,
    },
    /// Reference to another entity
    Relation { reference: String, multiple: bool },
}

impl FieldKind {
    fn extend(&self, map: &mut Map<String, Value>) {
        match self {
            FieldKind::Input { input_type } => {
                map.insert("input_type".into(), json!(input_type.as_str()));
            }
            FieldKind::Textarea { rows } => {
                map.insert("rows".into(), json!(rows));
            }
            FieldKind::Number { float } => {
                map.insert("float".into(), json!(float));
            }
            FieldKind::Boolean => {}
            FieldKind::DateTime { mode } => {
                map.insert("format".into(), json!(mode.format()));
            }
            FieldKind::Enum { items, prompt } => {
                let items: Map<String, Value> = items
                    .iter()
                    .map(|(value, label)| (value.clone(), Value::String(label.clone())))
                    .collect();
                map.insert("items".into(), Value::Object(items));
                map.insert("prompt".into(), json!(prompt));
            }
            FieldKind::Relation {
                reference,
                multiple,
            } => {
                map.insert("reference".into(), json!(reference));
                map.insert("multiple".into(), json!(multiple));
            }
        }
    }
}

/// HTML input type of an [`FieldKind::Input`] field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Text,
    Email,
    Password,
}

impl InputType {
    /// The HTML `type` attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Email => "email",
            InputType::Password => "password",
        }
    }
}

/// What a [`FieldKind::DateTime`] field picks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateMode {
    Date,
    Time,
    DateTime,
}

impl DateMode {
    /// Display format understood by the UI
    pub fn format(&self) -> &'static str {
        match self {
            DateMode::Date => "YYYY-MM-DD",
            DateMode::Time => "HH:mm",
            DateMode::DateTime => "YYYY-MM-DD HH:mm",
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl AttributeFactory<Field> {
    /// Factory with every built-in field type; untyped items become `string`
    pub fn fields() -> Self {
        Self::new("fields", "string")
            .with("string", string)
            .with("email", email)
            .with("password", password)
            .with("text", text)
            .with("integer", integer)
            .with("float", float)
            .with("bool", boolean)
            .with("date", date)
            .with("time", time)
            .with("datetime", datetime)
            .with("enum", enumeration)
            .with("relation", relation)
    }
}

fn input(builder: AttributeBuilder, item: &ItemConfig, input_type: InputType) -> EngineResult<Field> {
    let can_order = input_type != InputType::Password;
    Field::configure(builder, item, "Input", can_order, FieldKind::Input { input_type })
}

fn string(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    input(builder, item, InputType::Text)
}

fn email(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    input(builder, item, InputType::Email)
}

fn password(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    input(builder, item, InputType::Password)
}

fn text(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    let rows = item.integer("rows")?.unwrap_or(3);
    Field::configure(builder, item, "Textarea", false, FieldKind::Textarea { rows })
}

fn integer(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    Field::configure(builder, item, "Number", true, FieldKind::Number { float: false })
}

fn float(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    Field::configure(builder, item, "Number", true, FieldKind::Number { float: true })
}

fn boolean(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    Field::configure(builder, item, "Boolean", true, FieldKind::Boolean)
}

fn date_time(builder: AttributeBuilder, item: &ItemConfig, mode: DateMode) -> EngineResult<Field> {
    Field::configure(builder, item, "DateTime", true, FieldKind::DateTime { mode })
}

fn date(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    date_time(builder, item, DateMode::Date)
}

fn time(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    date_time(builder, item, DateMode::Time)
}

fn datetime(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    date_time(builder, item, DateMode::DateTime)
}

fn enumeration(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    let items = match item.value("items") {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(value, label)| match label {
                Value::String(label) => Ok((value.clone(), label.clone())),
                _ => Err(item.invalid(format!("label of item '{}' must be a string", value))),
            })
            .collect::<EngineResult<Vec<_>>>()?,
        Some(Value::Array(list)) => list
            .iter()
            .map(|value| match value {
                Value::String(value) => Ok((value.clone(), value.clone())),
                _ => Err(item.invalid("items must be strings")),
            })
            .collect::<EngineResult<Vec<_>>>()?,
        Some(_) => return Err(item.invalid("'items' must be a table or a list")),
        None => return Err(item.invalid("enum fields need 'items'")),
    };

    let prompt = item.string("prompt")?;
    Field::configure(builder, item, "Enum", true, FieldKind::Enum { items, prompt })
}

fn relation(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Field> {
    let reference = item
        .string("reference")?
        .unwrap_or_else(|| item.id().to_string());
    let multiple = item.flag("multiple", false)?;

    Field::configure(
        builder,
        item,
        "Relation",
        false,
        FieldKind::Relation {
            reference,
            multiple,
        },
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lang::{Catalog, EntityScope, Translator};
    use cruddy_core::SortDirection;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn build(items: Value) -> crate::collection::Collection<Field> {
        FieldFactory::fields()
            .create_from_collection(&EntityScope::untranslated("users"), &items)
            .unwrap()
    }

    #[test]
    fn test_email_field_to_array() {
        let fields = build(json!({ "email": "email" }));
        assert_eq!(
            fields.get("email").unwrap().to_json(),
            json!({
                "class": "Input",
                "id": "email",
                "type": "email",
                "hide": false,
                "help": null,
                "can_order": true,
                "label": "Email",
                "placeholder": null,
                "required": false,
                "disabled": false,
                "input_type": "email",
            })
        );
    }

    #[test]
    fn test_untyped_field_is_string() {
        let fields = build(json!(["first_name"]));
        let field = fields.get("first_name").unwrap();
        assert_eq!(field.attribute().kind(), "string");
        assert_eq!(field.kind(), &FieldKind::Input { input_type: InputType::Text });
        assert_eq!(field.label(), "First name");
    }

    #[test]
    fn test_label_precedence() {
        let catalog: Arc<dyn Translator> = Arc::new(
            Catalog::new()
                .with_line("users.fields.email", "E-mail address")
                .with_line("users.placeholders.email", "you@example.com"),
        );
        let fields = FieldFactory::fields()
            .create_from_collection(
                &EntityScope::new("users", catalog),
                &json!({
                    "email": { "type": "email", "label": "Mail" },
                    "name": { "label": "Your name" },
                }),
            )
            .unwrap();

        let email = fields.get("email").unwrap();
        assert_eq!(email.label(), "E-mail address");
        assert_eq!(email.placeholder().as_deref(), Some("you@example.com"));
        assert_eq!(fields.get("name").unwrap().label(), "Your name");
    }

    #[test]
    fn test_flags_and_orderability() {
        let fields = build(json!({
            "password": { "type": "password", "required": true },
            "bio": { "type": "text", "rows": 6, "disabled": true },
            "age": "integer",
        }));

        let password = fields.get("password").unwrap();
        assert!(password.is_required());
        assert!(!password.can_order());

        let bio = fields.get("bio").unwrap();
        assert!(bio.is_disabled());
        assert_eq!(bio.kind(), &FieldKind::Textarea { rows: 6 });
        assert!(!bio.can_order());

        assert!(fields.get("age").unwrap().can_order());
        assert_eq!(fields.orderable().count(), 1);
    }

    #[test]
    fn test_enum_field() {
        let fields = build(json!({
            "role": { "type": "enum", "items": { "admin": "Administrator", "user": "User" }, "prompt": "Pick one" },
            "size": { "type": "enum", "items": ["s", "m"] },
        }));

        let role = fields.get("role").unwrap().to_array();
        assert_eq!(role["class"], json!("Enum"));
        assert_eq!(role["items"], json!({ "admin": "Administrator", "user": "User" }));
        assert_eq!(role["prompt"], json!("Pick one"));

        assert_eq!(
            fields.get("size").unwrap().kind(),
            &FieldKind::Enum {
                items: vec![("s".into(), "s".into()), ("m".into(), "m".into())],
                prompt: None,
            }
        );
    }

    #[test]
    fn test_enum_without_items_fails() {
        let err = FieldFactory::fields()
            .create_from_collection(
                &EntityScope::untranslated("users"),
                &json!({ "role": "enum" }),
            )
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_datetime_formats() {
        let fields = build(json!({ "born": "date", "at": "time", "seen": "datetime" }));
        assert_eq!(fields.get("born").unwrap().to_array()["format"], json!("YYYY-MM-DD"));
        assert_eq!(fields.get("at").unwrap().to_array()["format"], json!("HH:mm"));
        assert_eq!(
            fields.get("seen").unwrap().to_array()["format"],
            json!("YYYY-MM-DD HH:mm")
        );
    }

    #[test]
    fn test_relation_field_eager_loads() {
        let fields = build(json!({
            "author": { "type": "relation", "reference": "users" },
            "tags": { "type": "relation", "multiple": true },
        }));

        let author = fields.get("author").unwrap();
        assert!(!author.can_order());
        assert_eq!(author.to_array()["reference"], json!("users"));

        let tags = fields.get("tags").unwrap();
        assert_eq!(
            tags.kind(),
            &FieldKind::Relation { reference: "tags".into(), multiple: true }
        );

        let mut query = Query::table("posts");
        for field in &fields {
            field.modify_query(&mut query);
        }
        assert_eq!(query.eager_loads(), ["author", "tags"]);
    }

    #[test]
    fn test_field_order_uses_id() {
        let fields = build(json!({ "email": "email" }));
        let mut query = Query::table("users");
        fields.get("email").unwrap().order(&mut query, SortDirection::Asc);
        assert_eq!(query.to_sql(), "SELECT * FROM users ORDER BY email ASC");
    }

    #[test]
    fn test_registered_kinds() {
        assert_eq!(
            FieldFactory::fields().kinds(),
            vec![
                "bool", "date", "datetime", "email", "enum", "float", "integer", "password",
                "relation", "string", "text", "time"
            ]
        );
    }
}
