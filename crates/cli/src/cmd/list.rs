//! Implementation of the `arx list` command.

use anyhow::Result;
use console::{Term, style};

use arx_core::registry;

pub fn cmd_list() -> Result<()> {
  let term = Term::stdout();

  for spec in registry::all() {
    let mut notes = Vec::new();
    if !spec.deps.is_empty() {
      notes.push(format!("deps: {}", spec.deps.join(", ")));
    }
    if !spec.suggests.is_empty() {
      notes.push(format!("suggests: {}", spec.suggests.join(", ")));
    }
    let platforms: Vec<_> = spec.platforms.iter().map(|os| os.as_str()).collect();
    notes.push(format!("platforms: {}", platforms.join(", ")));

    term.write_line(&format!(
      "{} {}",
      style(format!("{:<12}", spec.name)).bold(),
      style(notes.join("; ")).dim()
    ))?;
  }

  Ok(())
}
