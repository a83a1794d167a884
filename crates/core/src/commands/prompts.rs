use serde_json::{json, Value};

use super::{index_arg, opt_str_arg, str_arg};
use crate::{app::App, errors::Result};

/// Username of the session, checked to own `id` when one is given
fn owner(app: &App, id: Option<&str>) -> Result<String> {
    let username = app.accounts().require_user()?.username.clone();
    if let Some(id) = id {
        app.prompts().get_owned(id, &username)?;
    }
    Ok(username)
}

pub fn list(app: &mut App, args: Value) -> Result<Value> {
    let user = owner(app, None)?;
    let category = opt_str_arg(&args, "category").filter(|c| *c != "all");

    let prompts = app.prompts().list_by_owner_in_category(&user, category);
    Ok(json!({ "prompts": prompts }))
}

pub fn get(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.get", "id")?;
    let user = owner(app, None)?;

    let prompt = app.prompts().get_owned(id, &user)?;
    Ok(json!(prompt))
}

pub fn create(app: &mut App, args: Value) -> Result<Value> {
    let title = str_arg(&args, "prompts.create", "title")?;
    let category = opt_str_arg(&args, "category").unwrap_or_default();
    let content = opt_str_arg(&args, "content").unwrap_or_default();
    let user = owner(app, None)?;

    let prompt = app.prompts_mut().create_prompt(&user, title, category, content)?;
    Ok(json!(prompt))
}

pub fn update(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.update", "id")?;
    let title = str_arg(&args, "prompts.update", "title")?;
    let category = str_arg(&args, "prompts.update", "category")?;
    let content = str_arg(&args, "prompts.update", "content")?;
    owner(app, Some(id))?;

    let prompt = app.prompts_mut().update_prompt(id, title, category, content)?;
    Ok(json!(prompt))
}

pub fn delete(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.delete", "id")?;
    owner(app, Some(id))?;

    app.prompts_mut().delete_prompt(id)?;
    Ok(json!({ "success": true }))
}

pub fn switch_version(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.switch_version", "id")?;
    let index = index_arg(&args, "prompts.switch_version", "index")?;
    owner(app, Some(id))?;

    let prompt = app.prompts_mut().switch_version(id, index)?;
    Ok(json!(prompt))
}

pub fn add_version(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.add_version", "id")?;
    let name = str_arg(&args, "prompts.add_version", "name")?;
    let content = opt_str_arg(&args, "content").unwrap_or_default();
    owner(app, Some(id))?;

    let prompt = app.prompts_mut().add_version(id, name, content)?;
    Ok(json!(prompt))
}

pub fn delete_version(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.delete_version", "id")?;
    let index = index_arg(&args, "prompts.delete_version", "index")?;
    owner(app, Some(id))?;

    let prompt = app.prompts_mut().delete_version(id, index)?;
    Ok(json!(prompt))
}

pub fn rename_version(app: &mut App, args: Value) -> Result<Value> {
    let id = str_arg(&args, "prompts.rename_version", "id")?;
    let index = index_arg(&args, "prompts.rename_version", "index")?;
    let name = str_arg(&args, "prompts.rename_version", "name")?;
    owner(app, Some(id))?;

    let prompt = app.prompts_mut().rename_version(id, index, name)?;
    Ok(json!(prompt))
}

pub fn categories(app: &mut App, _args: Value) -> Result<Value> {
    let user = owner(app, None)?;
    Ok(json!({ "categories": app.prompts().distinct_categories(&user) }))
}

pub fn use_template(app: &mut App, args: Value) -> Result<Value> {
    let square_id = str_arg(&args, "prompts.use_template", "squareId")?;

    let prompt = app.use_template(square_id)?;
    Ok(json!(prompt))
}
