//! Writes TypeScript declarations for the API's wire types.
//!
//! Usage: `cargo run --bin generate_types [OUTPUT]` (defaults to `shared/types.ts`).

use std::{fs, path::PathBuf};

use db::models::task::{TaskDto, TaskStatus};
use server::error::FieldError;
use ts_rs::TS;

const HEADER: &str = "// This file was generated by `cargo run --bin generate_types`. Do not edit.\n";

fn main() -> anyhow::Result<()> {
    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("shared/types.ts"));

    let decls = [TaskStatus::decl(), TaskDto::decl(), FieldError::decl()];
    let mut content = String::from(HEADER);
    for decl in decls {
        content.push_str("\nexport ");
        content.push_str(&decl);
        content.push('\n');
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, content)?;
    println!("Wrote {}", output.display());
    Ok(())
}
