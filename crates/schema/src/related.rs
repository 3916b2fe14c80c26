//! Related entity lists shown alongside an entity's form

use crate::attribute::{Attribute, AttributeBuilder, SchemaAttribute};
use crate::collection::{AttributeFactory, ItemConfig};
use cruddy_core::{Arrayable, EngineResult, EntityId};
use serde_json::{Map, Value};

/// Factory building related collections
pub type RelatedFactory = AttributeFactory<Related>;

/// A list of another entity's items reachable through a relation
#[derive(Debug, Clone)]
pub struct Related {
    base: Attribute,
    entity: EntityId,
    relation: String,
}

impl Related {
    /// Id of the related entity
    pub fn related_entity(&self) -> &str {
        &self.entity
    }

    /// Name of the relation on the owning model
    pub fn relation(&self) -> &str {
        &self.relation
    }

    /// Tab title: translation, then generated
    pub fn title(&self) -> String {
        self.base
            .translate(Some("related"), None)
            .unwrap_or_else(|| self.base.generate_label())
    }
}

impl Arrayable for Related {
    fn to_array(&self) -> Map<String, Value> {
        let mut map = self.base.to_array();
        map.insert("title".into(), Value::String(self.title()));
        map.insert("entity".into(), Value::String(self.entity.clone()));
        map.insert("relation".into(), Value::String(self.relation.clone()));
        map
    }
}

impl SchemaAttribute for Related {
    fn attribute(&self) -> &Attribute {
        &self.base
    }
}

impl AttributeFactory<Related> {
    /// Factory with the single `related` type, which is also the default
    pub fn related() -> Self {
        Self::new("related", "related").with("related", related)
    }
}

fn related(builder: AttributeBuilder, item: &ItemConfig) -> EngineResult<Related> {
    let entity = item
        .string("entity")?
        .unwrap_or_else(|| item.id().to_string());
    let relation = item
        .string("relation")?
        .unwrap_or_else(|| item.id().to_string());

    Ok(Related {
        base: builder.class("Related").build(),
        entity,
        relation,
    })
}
