use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use spacecopy_config::CopyConfig;

pub fn show(config: &CopyConfig, path: &Path) -> Result<()> {
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    println!("{}: {}", "Config file".cyan(), source);
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
