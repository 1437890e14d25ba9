use serde_json::{json, Value};

use folio_core::{ReplayStore, StoreKey};

use crate::cli::{KeyArgs, StoreAction, StoreArgs};
use crate::error::CliError;

pub fn run(args: &StoreArgs) -> Result<Value, CliError> {
    let store = ReplayStore::open(args.dir.as_path())?;

    match &args.action {
        StoreAction::Exists(key_args) => {
            let key = parse_key(key_args)?;
            Ok(json!({
                "key": key.canonical(),
                "file": key.file_name(),
                "exists": store.exists(&key),
            }))
        }
        StoreAction::Read(key_args) => {
            let key = parse_key(key_args)?;
            let bytes = store.read(&key)?;
            let snapshot: Value = serde_json::from_slice(&bytes)?;
            Ok(json!({
                "key": key.canonical(),
                "file": key.file_name(),
                "snapshot": snapshot,
            }))
        }
    }
}

fn parse_key(args: &KeyArgs) -> Result<StoreKey, CliError> {
    let mut components = Vec::with_capacity(args.components.len());
    for raw in &args.components {
        let (name, value) = raw.split_once('=').ok_or_else(|| {
            CliError::Command(format!("component '{raw}' must be NAME=VALUE"))
        })?;
        components.push((name, value));
    }
    Ok(StoreKey::new(args.prefix.as_str(), components.as_slice()))
}
