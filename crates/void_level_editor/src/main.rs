//! Void Level Editor demo
//!
//! Loads a scene from a JSON array of game object records, selects every
//! top-level object, drags the group, commits the move, then undoes and
//! redoes it. Every command that would reach the host is printed as JSON.
//!
//! Run with: cargo run -p void_level_editor -- [scene.json] [dx dy dz]

use std::error::Error;
use std::path::Path;

use glam::Vec3;
use serde_json::Value;

use void_level_editor::{
    Editor, EditorConfig, GameObjectTransferData, OutgoingQueue, SelectOptions, TransferDataError,
};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (scene_path, offset) = parse_args(&args)?;

    let config = EditorConfig::load_or_default();
    let (mut editor, queue, table) = Editor::in_memory(config);

    let records = match &scene_path {
        Some(path) => load_records(Path::new(path))?,
        None => default_scene(),
    };
    let spawned = spawn_all(&mut editor, records);
    editor.present_frame();
    log::info!("{} object(s) loaded, {} instance(s) registered", spawned, table.len());

    let roots = editor.scene.roots().to_vec();
    for guid in roots {
        if editor.scene.get(guid).is_some_and(|o| o.is_game_object()) {
            editor.select(Some(guid), SelectOptions::multi());
        }
    }
    editor.present_frame();
    log::info!("{} object(s) selected", editor.selection.len());

    let pivot = *editor.selection.pivot();
    editor.set_pivot(pivot.with_translation(pivot.translation + offset));
    editor.on_client_only_move();
    editor.present_frame();
    editor.on_client_only_move_end()?;
    print_outgoing("move", &queue)?;

    if editor.undo()? {
        print_outgoing("undo", &queue)?;
    }
    if editor.redo()? {
        print_outgoing("redo", &queue)?;
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Result<(Option<String>, Vec3), Box<dyn Error>> {
    let (path, rest) = match args.first() {
        Some(first) if first.parse::<f32>().is_err() => (Some(first.clone()), &args[1..]),
        _ => (None, args),
    };
    let offset = match rest {
        [] => Vec3::new(5.0, 0.0, 0.0),
        [x, y, z] => Vec3::new(x.parse()?, y.parse()?, z.parse()?),
        _ => return Err("usage: void_level_editor [scene.json] [dx dy dz]".into()),
    };
    Ok((path, offset))
}

fn load_records(path: &Path) -> Result<Vec<GameObjectTransferData>, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let Value::Array(items) = value else {
        return Err(format!("{:?} does not hold an array of records", path).into());
    };

    let mut records = Vec::with_capacity(items.len());
    for item in &items {
        match GameObjectTransferData::from_table(item) {
            Ok(record) => records.push(record),
            Err(e @ TransferDataError::MissingGuid { .. }) => log::warn!("skipping record: {}", e),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(records)
}

/// Spawn parents before children, whatever the file order.
fn spawn_all(editor: &mut Editor, mut pending: Vec<GameObjectTransferData>) -> usize {
    let mut spawned = 0;
    loop {
        let before = pending.len();
        pending.retain(|record| {
            let parent = record.parent_data.as_ref().and_then(|p| p.parent());
            let ready = parent.map_or(true, |p| editor.scene.contains(p));
            if !ready {
                return true;
            }
            match editor.spawn(record) {
                Ok(_) => spawned += 1,
                Err(e) => log::warn!("cannot spawn record: {}", e),
            }
            false
        });
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }
    // whatever is left has a parent outside the scene
    for record in &pending {
        match editor.spawn(record) {
            Ok(_) => spawned += 1,
            Err(e) => log::warn!("cannot spawn record: {}", e),
        }
    }
    spawned
}

fn default_scene() -> Vec<GameObjectTransferData> {
    let records = serde_json::json!([
        {
            "guid": "6f0c1a52-3b1e-4c1d-9a57-0c1f2e3d4a01",
            "name": "crate_a",
            "transform": { "trans": { "x": 0.0, "y": 0.0, "z": 0.0 } },
            "gameEntities": [{ "instanceId": 1, "isSpatial": true }]
        },
        {
            "guid": "6f0c1a52-3b1e-4c1d-9a57-0c1f2e3d4a02",
            "name": "crate_b",
            "transform": { "trans": { "x": 2.0, "y": 0.0, "z": 3.0 } },
            "gameEntities": [{ "instanceId": 1, "isSpatial": true }]
        }
    ]);
    records
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| GameObjectTransferData::from_table(item).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn print_outgoing(stage: &str, queue: &OutgoingQueue) -> Result<(), Box<dyn Error>> {
    for command in queue.drain() {
        println!("[{}] {}", stage, serde_json::to_string(&command.to_json())?);
    }
    Ok(())
}
