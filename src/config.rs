use crate::error::{DiagError, Result};
use crate::types::config::DiagConfig;
use std::path::{Path, PathBuf};
use toml::map::Map;
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "diagnostico.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".diagnostico/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/diagnostico/config.toml";

/// Loads the layered configuration for `root`, or only `explicit` when given.
/// Missing layers are skipped; with no files at all the defaults apply.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<DiagConfig> {
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(DiagError::ConfigNotFound(path.display().to_string()));
        }
        let cfg = into_config(read_toml_value(path)?)?;
        cfg.validate()?;
        return Ok(cfg);
    }

    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    global_path: Option<&Path>,
) -> Result<DiagConfig> {
    let mut merged = Value::Table(Map::new());
    if let Some(path) = global_path {
        merge_file_if_exists(&mut merged, path)?;
    }
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_CONFIG_FILE))?;
    merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;

    let cfg = into_config(merged)?;
    cfg.validate()?;
    Ok(cfg)
}

fn into_config(value: Value) -> Result<DiagConfig> {
    value
        .try_into()
        .map_err(|e: toml::de::Error| DiagError::ConfigParse(e.to_string()))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    tracing::debug!(path = %path.display(), "merging config layer");
    let value = read_toml_value(path)?;
    merge_toml(merged, value);
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| DiagError::ConfigParse(format!("{}: {}", path.display(), e)))
}

fn merge_toml(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::Backend;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn load_config_falls_back_to_defaults_when_no_files() {
        let dir = TempDir::new().expect("temp dir should be created");
        let cfg = load_config_with_global(dir.path(), None).expect("load should not fail");
        assert_eq!(cfg.storage.backend, Backend::Csv);
        assert!(!cfg.form.contact_required);
    }

    #[test]
    fn load_config_merges_global_project_and_local_in_order() {
        let root = TempDir::new().expect("root temp dir should be created");
        let global_root = TempDir::new().expect("global temp dir should be created");
        let global_path = global_root.path().join("config.toml");

        fs::write(
            &global_path,
            r#"
[server]
bind = "0.0.0.0:7000"

[storage]
csv_path = "global.csv"
"#,
        )
        .expect("global config should write");

        fs::write(
            root.path().join(DEFAULT_CONFIG_FILE),
            r#"
[form]
contact_required = true

[storage]
csv_path = "project.csv"

[sheets]
sheet_url = "https://docs.google.com/spreadsheets/d/abc/edit"
"#,
        )
        .expect("project config should write");

        fs::create_dir_all(root.path().join(".diagnostico")).expect("local dir should create");
        fs::write(
            root.path().join(DEFAULT_LOCAL_FILE),
            r#"
[storage]
backend = "sheets"

[gcp_service_account]
client_email = "bot@example.iam.gserviceaccount.com"
private_key = "pem"
"#,
        )
        .expect("local override should write");

        let cfg = load_config_with_global(root.path(), Some(&global_path))
            .expect("merged config should load");

        assert_eq!(cfg.server.bind, "0.0.0.0:7000");
        assert!(cfg.form.contact_required);
        assert_eq!(cfg.storage.backend, Backend::Sheets);
        assert_eq!(cfg.storage.csv_path, PathBuf::from("project.csv"));
        assert_eq!(
            cfg.gcp_service_account
                .as_ref()
                .map(|key| key.client_email.as_str()),
            Some("bot@example.iam.gserviceaccount.com")
        );
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().expect("temp dir should be created");
        let missing = dir.path().join("nope.toml");
        let result = load_config(dir.path(), Some(&missing));
        assert!(matches!(result, Err(DiagError::ConfigNotFound(_))));
    }

    #[test]
    fn explicit_config_ignores_project_layers() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            "[form]\ncontact_required = true\n",
        )
        .expect("project config should write");
        let explicit = dir.path().join("other.toml");
        fs::write(&explicit, "[storage]\ncsv_path = \"other.csv\"\n")
            .expect("explicit config should write");

        let cfg = load_config(dir.path(), Some(&explicit)).expect("explicit config should load");
        assert!(!cfg.form.contact_required);
        assert_eq!(cfg.storage.csv_path, PathBuf::from("other.csv"));
    }

    #[test]
    fn invalid_layer_reports_path() {
        let dir = TempDir::new().expect("temp dir should be created");
        fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "[form\n").expect("config should write");
        let err = load_config_with_global(dir.path(), None).expect_err("parse should fail");
        assert!(err.to_string().contains(DEFAULT_CONFIG_FILE));
    }
}
