use std::{fs, path::Path};

use chrono::Local;
use tracing::info;

use crate::{
    env::Env,
    error::Result,
    paths::{app_dirs, basename, join_path},
};

/// Compact local timestamp used in backup names
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d%H%M%S").to_string()
}

/// Copies a shared file into the backups directory before it is mutated.
///
/// Backups are named `<basename>.<timestamp>`; a numeric suffix keeps two
/// mutations within the same second apart. Returns the backup path, or `None`
/// when the file does not exist yet.
///
/// # Arguments
/// * `path` - File about to be rewritten
pub fn backup_file(env: &Env, path: &str) -> Result<Option<String>> {
    if !Path::new(path).exists() {
        return Ok(None);
    }

    let backups_dir = app_dirs(env).backups_dir;
    fs::create_dir_all(&backups_dir)?;

    let file_base = match basename(path) {
        "" => "config",
        name => name,
    };
    let stem = format!("{file_base}.{}", timestamp());
    let mut dest = join_path([backups_dir.as_str(), stem.as_str()]);
    let mut index = 2;
    while Path::new(&dest).exists() {
        dest = join_path([backups_dir.as_str(), &format!("{stem}-{index}")]);
        index += 1;
    }

    fs::copy(path, &dest)?;
    info!(source = %path, backup = %dest, "backed up shared file");
    Ok(Some(dest))
}

/// Backups taken so far, sorted by name
pub fn list_backups(env: &Env) -> Result<Vec<String>> {
    let backups_dir = app_dirs(env).backups_dir;
    if !Path::new(&backups_dir).exists() {
        return Ok(Vec::new());
    }
    let mut names = fs::read_dir(&backups_dir)?
        .map(|entry| entry.map(|entry| entry.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()?;
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn missing_file_has_no_backup() -> Result<()> {
        let dir = TempDir::new()?;
        let env = Env::new(dir.path().to_string_lossy().into_owned());
        let path = join_path([env.home_dir.as_str(), ".gitconfig"]);
        assert_eq!(backup_file(&env, &path)?, None);
        assert!(list_backups(&env)?.is_empty());
        Ok(())
    }

    #[test]
    fn each_backup_gets_its_own_file() -> Result<()> {
        let dir = TempDir::new()?;
        let env = Env::new(dir.path().to_string_lossy().into_owned());
        let path = join_path([env.home_dir.as_str(), ".gitconfig"]);
        fs::write(&path, "[user]\n")?;

        let first = backup_file(&env, &path)?.expect("first backup");
        let second = backup_file(&env, &path)?.expect("second backup");
        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first)?, "[user]\n");

        let names = list_backups(&env)?;
        assert_eq!(names.len(), 2);
        assert!(names.iter().all(|name| name.starts_with(".gitconfig.")));
        Ok(())
    }
}
