//! End-to-end tests over a directory of entity definitions

use cruddy::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Map, json};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn definitions() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("users.toml"),
        r#"
title = "Members"
order_by = "email"

[fields]
name = { type = "string", required = true }
email = "email"
role = { type = "enum", items = { admin = "Administrator", editor = "Editor" } }
born_at = "date"

[columns]
name = "proto"
email = "proto"
posts_count = { type = "computed", clause = "(select count(*) from posts where posts.user_id = users.id)" }

[related]
posts = { relation = "posts" }

[form]
model = "App\\User"
customAttributes = { email = "e-mail address" }

[form.rules]
name = "required|min:3"
email = ["required", "email"]
role = "in:admin,editor"
"#,
    )
    .unwrap();
    fs::write(
        dir.path().join("posts.json"),
        r#"{
            "fields": ["title", "body"],
            "form": "forms.posts"
        }"#,
    )
    .unwrap();
    dir
}

fn factory(dir: &TempDir) -> EntityFactory {
    let config = ConfigRepository::from_entities_dir(dir.path()).unwrap();
    let container = Container::new();
    container.bind_model("App\\User", Model::new("App\\User", "users"));
    EntityFactory::new(Arc::new(config), Arc::new(container))
}

#[test]
fn test_resolve_from_directory() {
    let dir = definitions();
    let factory = factory(&dir);

    assert_eq!(factory.ids(), vec!["posts".to_string(), "users".to_string()]);

    let users = factory.resolve("users").unwrap();
    assert!(Arc::ptr_eq(&users, &factory.resolve("users").unwrap()));
    assert_eq!(users.title(), "Members");
    assert_eq!(users.fields().ids(), vec!["name", "email", "role", "born_at"]);
    assert_eq!(users.related().ids(), vec!["posts"]);
    assert_eq!(users.primary_column(), Some("name"));
}

#[test]
fn test_attribute_wire_shape() {
    let dir = definitions();
    let factory = factory(&dir);
    let users = factory.resolve("users").unwrap();

    let email = users.fields().get("email").unwrap().attribute().to_json();
    assert_eq!(
        email,
        json!({
            "class": "Input",
            "id": "email",
            "type": "email",
            "hide": false,
            "help": null,
            "can_order": true,
        })
    );
}

#[test]
fn test_form_validation() {
    let dir = definitions();
    let factory = factory(&dir);
    let users = factory.resolve("users").unwrap();
    let form = users.form(&factory).unwrap();

    let mut input = Map::new();
    input.insert("name".into(), json!("Al"));
    input.insert("email".into(), json!("not an address"));
    input.insert("role".into(), json!("admin"));

    let errors = form.validate(&input).unwrap_err();
    assert_eq!(errors.len(), 2);
    assert_eq!(
        errors.first("email"),
        Some("The e-mail address must be a valid email address.")
    );

    input.insert("name".into(), json!("Alice"));
    input.insert("email".into(), json!("alice@example.com"));
    assert!(form.validate(&input).is_ok());
}

#[test]
fn test_custom_form_processor() {
    let dir = definitions();
    let factory = factory(&dir);
    let custom: Arc<dyn FormProcessor> = Arc::new(Form::new(
        Arc::new(Model::new("App\\Post", "posts")),
        Validator::default(),
    ));
    factory.container().bind_form("forms.posts", custom.clone());

    let posts = factory.resolve("posts").unwrap();
    assert!(Arc::ptr_eq(&posts.form(&factory).unwrap(), &custom));
}

#[test]
fn test_listing_query() {
    let dir = definitions();
    let factory = factory(&dir);
    let users = factory.resolve("users").unwrap();

    let query = factory.listing_query(&users, None).unwrap();
    assert_eq!(
        query.to_sql(),
        "SELECT id, name, email, (select count(*) from posts where posts.user_id = users.id) as posts_count FROM users ORDER BY email ASC"
    );

    let query = factory
        .listing_query(&users, Some(("posts_count", SortDirection::Desc)))
        .unwrap();
    assert!(query.to_sql().ends_with(
        "ORDER BY (select count(*) from posts where posts.user_id = users.id) DESC"
    ));
}

#[test]
fn test_missing_entity() {
    let dir = definitions();
    let err = factory(&dir).resolve("comments").unwrap_err();
    assert!(err.is_not_found());
}
