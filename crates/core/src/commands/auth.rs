use serde_json::{json, Value};

use super::str_arg;
use crate::{app::App, errors::Result};

pub fn register(app: &mut App, args: Value) -> Result<Value> {
    let username = str_arg(&args, "auth.register", "username")?;
    let password = str_arg(&args, "auth.register", "password")?;

    let user = app.accounts_mut().register(username, password)?;
    Ok(json!({ "user": user }))
}

pub fn login(app: &mut App, args: Value) -> Result<Value> {
    let username = str_arg(&args, "auth.login", "username")?;
    let password = str_arg(&args, "auth.login", "password")?;

    let user = app.accounts_mut().login(username, password)?;
    Ok(json!({ "user": user }))
}

pub fn logout(app: &mut App, _args: Value) -> Result<Value> {
    app.accounts_mut().logout()?;
    Ok(json!({ "success": true }))
}

pub fn current(app: &mut App, _args: Value) -> Result<Value> {
    Ok(json!({ "user": app.accounts().current_user() }))
}
