use serde_json::{json, Value};

use super::{index_arg, opt_str_arg, str_arg};
use crate::{
    app::App,
    errors::{DeckError, Result},
    repository::SquarePromptDraft,
};

pub fn list(app: &mut App, args: Value) -> Result<Value> {
    let category = opt_str_arg(&args, "category").filter(|c| *c != "all");
    Ok(json!({ "prompts": app.square().list(category) }))
}

pub fn get(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "square.get", "id")?;
    Ok(json!(app.square().get(id)?))
}

pub fn categories(app: &mut App, _args: Value) -> Result<Value> {
    Ok(json!({ "categories": app.square().list_categories() }))
}

pub fn add_category(app: &mut App, args: Value) -> Result<Value> {
    let name = str_arg(&args, "square.add_category", "name")?;
    app.accounts().require_admin()?;

    app.square_mut().add_category(name)?;
    Ok(json!({ "categories": app.square().list_categories() }))
}

pub fn remove_category(app: &mut App, args: Value) -> Result<Value> {
    let index = index_arg(&args, "square.remove_category", "index")?;
    app.accounts().require_admin()?;

    let removed = app.square_mut().remove_category(index)?;
    Ok(json!({
        "removed": removed,
        "categories": app.square().list_categories(),
    }))
}

pub fn upsert(app: &mut App, args: Value) -> Result<Value> {
    let draft: SquarePromptDraft = serde_json::from_value(args)
        .map_err(|e| DeckError::invalid_args("square.upsert", e.to_string()))?;
    app.accounts().require_admin()?;

    let prompt = app.square_mut().upsert(draft)?;
    Ok(json!(prompt))
}

pub fn delete(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "square.delete", "id")?;
    app.accounts().require_admin()?;

    app.square_mut().delete(id)?;
    Ok(json!({ "success": true }))
}
