//! Init command - write a default configuration file.

use std::path::Path;

use mapstream::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run(path: Option<&Path>, force: bool) -> Result<(), CliError> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_file_path);
    if path.exists() && !force {
        return Err(CliError::AlreadyExists(path.display().to_string()));
    }

    ConfigFile::default().save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit this file to set provider endpoints and the tile budget.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.ini");
        run(Some(&path), false).unwrap();
        assert!(path.exists());
        assert!(matches!(
            run(Some(&path), false),
            Err(CliError::AlreadyExists(_))
        ));
        run(Some(&path), true).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap(), ConfigFile::default());
    }
}
