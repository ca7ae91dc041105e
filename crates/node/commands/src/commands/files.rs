//! Local file commands: `import`, `list` and `hash`.

use crate::context::NodeContext;
use eyre::Result;
use orca_primitives::{ContentHash, FileRecord};
use std::path::Path;

/// Copy `path` into the files directory and index it under its file name.
pub fn import(ctx: &NodeContext, path: &Path) -> Result<FileRecord> {
    let record = ctx.files.import(path, &ctx.names)?;
    println!("Imported {} ({})", record.name, record.content_hash);
    Ok(record)
}

/// Names of the files in the files directory.
pub fn list(ctx: &NodeContext) -> Result<Vec<String>> {
    let names = ctx.files.list()?;
    println!("Files found:");
    for name in &names {
        println!("{name}");
    }
    Ok(names)
}

pub fn hash(path: &Path) -> Result<ContentHash> {
    let hash = orca_store::hash_file(path)?;
    println!("{hash}");
    Ok(hash)
}
