use std::fs;

use gitid::{
    AppError, Env,
    backup::list_backups,
    blocks::block_ids,
    include::{git_config_path, include_file_path},
    manager::{self, ProfileDraft},
    paths::join_path,
    ssh::ssh_config_path,
    storage::{load_config, load_profile, write_file_atomic},
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

struct Sandbox {
    _dir: TempDir,
    env: Env,
}

impl Sandbox {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let home = dir.path().to_string_lossy().into_owned();
        let env = Env::new(home.clone()).with_cwd(join_path([home.as_str(), "src"]));
        Self { _dir: dir, env }
    }

    fn path(&self, rest: &str) -> String {
        join_path([self.env.home_dir.as_str(), rest])
    }

    fn add(&self, id: &str, name: &str, email: &str) -> gitid::Profile {
        manager::add_profile(
            &self.env,
            ProfileDraft {
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                email: Some(email.to_string()),
                ..ProfileDraft::default()
            },
        )
        .expect("add profile")
    }

    fn git_config(&self) -> String {
        fs::read_to_string(git_config_path(&self.env)).unwrap_or_default()
    }

    fn ssh_config(&self) -> String {
        fs::read_to_string(ssh_config_path(&self.env)).unwrap_or_default()
    }
}

#[test]
fn add_profile_writes_all_files() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    let profile = sandbox.add("work", "Jane Doe", "jane@work.com");

    assert_eq!(profile.ssh.host_alias, "work.github.com");
    assert_eq!(profile.ssh.key_path, sandbox.path(".ssh/id_ed25519_work"));
    assert_eq!(load_profile(&sandbox.env, "work")?, Some(profile));
    assert_eq!(load_config(&sandbox.env)?.profiles, vec!["work"]);

    let ssh = sandbox.ssh_config();
    assert!(ssh.contains("Host work.github.com"));
    assert!(ssh.contains("IdentityFile ~/.ssh/id_ed25519_work"));

    let fragment = fs::read_to_string(include_file_path(&sandbox.env, "work"))?;
    assert!(fragment.contains("name = Jane Doe"));
    assert!(fragment.contains("email = jane@work.com"));
    Ok(())
}

#[test]
fn duplicate_ids_get_suffixes() {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");
    let second = sandbox.add("work", "Jane Doe", "jane@work.com");
    assert_eq!(second.id, "work-2");
    assert_eq!(second.ssh.host_alias, "work-2.github.com");
}

#[test]
fn add_profile_requires_identity() {
    let sandbox = Sandbox::new();
    let result = manager::add_profile(
        &sandbox.env,
        ProfileDraft {
            label: Some("Work".into()),
            name: Some("Jane".into()),
            ..ProfileDraft::default()
        },
    );
    assert!(matches!(result, Err(AppError::Validation(_))));

    let result = manager::add_profile(
        &sandbox.env,
        ProfileDraft {
            name: Some("Jane".into()),
            email: Some("not-an-email".into()),
            ..ProfileDraft::default()
        },
    );
    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[test]
fn remapping_a_directory_leaves_one_include_block() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");
    sandbox.add("personal", "Jane", "jane@home.com");
    let dir = sandbox.path("code/work");

    let first = manager::map_directory(&sandbox.env, &dir, "work")?;
    let second = manager::map_directory(&sandbox.env, &format!("{dir}/"), "personal")?;
    assert_ne!(first.id, second.id);

    let git_config = sandbox.git_config();
    assert_eq!(block_ids(&git_config, "include")?, vec![second.id.clone()]);
    assert_eq!(git_config.matches("[includeIf \"gitdir:").count(), 1);
    assert!(git_config.contains(&format!("gitdir:{dir}/")));
    assert!(git_config.contains(&include_file_path(&sandbox.env, "personal")));
    assert!(!git_config.contains(&include_file_path(&sandbox.env, "work")));

    let config = load_config(&sandbox.env)?;
    assert_eq!(config.mappings, vec![second]);
    Ok(())
}

#[test]
fn mapping_twice_changes_nothing() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");

    let first = manager::map_directory(&sandbox.env, "~/code/work", "work")?;
    let after_first = sandbox.git_config();
    let backups = list_backups(&sandbox.env)?.len();

    let second = manager::map_directory(&sandbox.env, "~/code/work/", "work")?;
    assert_eq!(first, second);
    assert_eq!(sandbox.git_config(), after_first);
    assert_eq!(list_backups(&sandbox.env)?.len(), backups);
    assert_eq!(load_config(&sandbox.env)?.mappings.len(), 1);
    Ok(())
}

#[test]
fn removing_a_profile_cascades() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    write_file_atomic(&ssh_config_path(&sandbox.env), "Host box\n  User me\n")?;
    write_file_atomic(&git_config_path(&sandbox.env), "[core]\n  pager = less\n")?;

    sandbox.add("work", "Jane Doe", "jane@work.com");
    sandbox.add("personal", "Jane", "jane@home.com");
    let mapping = manager::map_directory(&sandbox.env, "~/code/work", "work")?;
    manager::map_directory(&sandbox.env, "~/code/home", "personal")?;

    manager::remove_profile(&sandbox.env, "work")?;

    let git_config = sandbox.git_config();
    let ssh_config = sandbox.ssh_config();
    assert!(!git_config.contains(&mapping.id));
    assert!(!ssh_config.contains("gitid:ssh:work"));
    assert!(git_config.starts_with("[core]\n  pager = less\n"));
    assert!(ssh_config.starts_with("Host box\n  User me\n"));
    assert!(ssh_config.contains("gitid:ssh:personal"));

    let config = load_config(&sandbox.env)?;
    assert_eq!(config.profiles, vec!["personal"]);
    assert!(config.mappings.iter().all(|mapping| mapping.profile_id == "personal"));
    assert_eq!(load_profile(&sandbox.env, "work")?, None);
    assert!(!std::path::Path::new(&include_file_path(&sandbox.env, "work")).exists());

    manager::remove_profile(&sandbox.env, "personal")?;
    assert_eq!(sandbox.git_config(), "[core]\n  pager = less\n");
    assert_eq!(sandbox.ssh_config(), "Host box\n  User me\n");
    Ok(())
}

#[test]
fn unknown_profiles_are_not_found() {
    let sandbox = Sandbox::new();
    assert!(matches!(
        manager::remove_profile(&sandbox.env, "ghost"),
        Err(AppError::ProfileNotFound(_))
    ));
    assert!(matches!(
        manager::map_directory(&sandbox.env, "~/code", "ghost"),
        Err(AppError::ProfileNotFound(_))
    ));
    assert!(sandbox.git_config().is_empty());
}

#[test]
fn unmap_by_path_or_id() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");
    let by_path = manager::map_directory(&sandbox.env, "projects", "work")?;
    assert_eq!(by_path.path, format!("{}/", sandbox.path("src/projects")));
    let by_id = manager::map_directory(&sandbox.env, "~/other", "work")?;

    assert_eq!(manager::unmap_directory(&sandbox.env, "projects/")?, Some(by_path));
    assert_eq!(manager::unmap_directory(&sandbox.env, &by_id.id)?, Some(by_id));
    assert_eq!(manager::unmap_directory(&sandbox.env, "projects")?, None);
    assert!(sandbox.git_config().is_empty());
    Ok(())
}

#[test]
fn add_profile_can_map_directory() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    manager::add_profile(
        &sandbox.env,
        ProfileDraft {
            label: Some("ACME Corp".into()),
            name: Some("Jane Doe".into()),
            email: Some("jane@acme.com".into()),
            map_dir: Some("~/acme".into()),
            ..ProfileDraft::default()
        },
    )?;

    let config = load_config(&sandbox.env)?;
    assert_eq!(config.profiles, vec!["acme-corp"]);
    assert_eq!(config.mappings.len(), 1);
    assert_eq!(config.mappings[0].path, format!("{}/", sandbox.path("acme")));
    assert_eq!(block_ids(&sandbox.git_config(), "include")?, vec![config.mappings[0].id.clone()]);
    Ok(())
}

#[test]
fn status_reports_drift_and_refresh_repairs_it() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");
    let mapping = manager::map_directory(&sandbox.env, "~/code", "work")?;

    let status = manager::status(&sandbox.env)?;
    assert!(status.missing_include_blocks.is_empty());
    assert!(status.missing_ssh_blocks.is_empty());

    fs::write(ssh_config_path(&sandbox.env), "")?;
    fs::write(git_config_path(&sandbox.env), "# >>> gitid:include:stale-1\nx\n# <<< gitid:include:stale-1\n")?;

    let status = manager::status(&sandbox.env)?;
    assert_eq!(status.missing_include_blocks, vec![mapping.id.clone()]);
    assert_eq!(status.orphan_include_blocks, vec!["stale-1"]);
    assert_eq!(status.missing_ssh_blocks, vec!["work"]);

    manager::refresh_profile(&sandbox.env, "work")?;
    manager::map_directory(&sandbox.env, "~/code", "work")?;
    let status = manager::status(&sandbox.env)?;
    assert!(status.missing_ssh_blocks.is_empty());
    assert!(status.missing_include_blocks.is_empty());
    Ok(())
}

#[test]
fn linking_an_account_updates_profile() -> gitid::Result<()> {
    let sandbox = Sandbox::new();
    sandbox.add("work", "Jane Doe", "jane@work.com");
    let profile = manager::link_account(&sandbox.env, "work", "jane-work")?;
    assert_eq!(profile.github_username(), Some("jane-work"));
    assert_eq!(load_profile(&sandbox.env, "work")?, Some(profile));
    Ok(())
}

#[cfg(unix)]
#[test]
fn symlinked_dotfiles_are_patched_through_the_link() -> gitid::Result<()> {
    use std::os::unix::fs::{PermissionsExt, symlink};

    let sandbox = Sandbox::new();
    let real_git = sandbox.path("dotfiles/gitconfig");
    let real_ssh = sandbox.path("dotfiles/ssh_config");
    write_file_atomic(&real_git, "[core]\n  pager = less\n")?;
    write_file_atomic(&real_ssh, "Host box\n")?;
    fs::set_permissions(&real_ssh, fs::Permissions::from_mode(0o600))?;
    fs::create_dir_all(sandbox.path(".ssh"))?;
    symlink(&real_git, git_config_path(&sandbox.env))?;
    symlink(&real_ssh, ssh_config_path(&sandbox.env))?;

    sandbox.add("work", "Jane Doe", "jane@work.com");
    let mapping = manager::map_directory(&sandbox.env, "~/code", "work")?;

    for link in [git_config_path(&sandbox.env), ssh_config_path(&sandbox.env)] {
        assert!(fs::symlink_metadata(&link)?.file_type().is_symlink(), "{link}");
    }
    let git_config = fs::read_to_string(&real_git)?;
    assert!(git_config.starts_with("[core]\n  pager = less\n"));
    assert_eq!(block_ids(&git_config, "include")?, vec![mapping.id]);
    assert!(fs::read_to_string(&real_ssh)?.contains("Host work.github.com"));
    assert_eq!(fs::metadata(&real_ssh)?.permissions().mode() & 0o777, 0o600);
    Ok(())
}

#[test]
fn account_login_requires_profile() {
    let sandbox = Sandbox::new();
    assert!(matches!(
        manager::login_account(&sandbox.env, "ghost"),
        Err(AppError::ProfileNotFound(_))
    ));
}
