//! Config subcommands handler

use anyhow::Result;

use bondlog::Config;

/// Show the effective configuration as TOML, preceded by its source path.
#[cfg(not(tarpaulin_include))]
pub fn handle_show() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load_from(&path)?;
    let state = if path.exists() { "" } else { " (not found, defaults)" };
    println!("# {}{}", path.display(), state);
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
