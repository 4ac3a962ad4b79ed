//! AnyFilter command-line tool — entry point.
//!
//! Inspects and edits the versioned configuration of filter instances, and
//! runs the key-renaming `NameFilter` over JSON records.
//!
//! # Usage
//!
//! ```text
//! anyfilter [OPTIONS] <COMMAND>
//!
//! Commands:
//!   show         Print the active configuration of an instance
//!   history      Print every saved snapshot of an instance
//!   set          Replace an instance's configuration with KEY=VALUE pairs
//!   update-form  Replace an instance's configuration from posted form fields
//!   apply        Run NameFilter over a JSON array of records
//!   demo         Save a sample NameFilter configuration and apply it
//!
//! Options:
//!   --config-dir <DIR>    Directory holding history files [env: FILTER_CONFIG_DIR]
//!   --settings <FILE>     Optional TOML settings file
//!   --log-level <LEVEL>   Log level when RUST_LOG is unset
//! ```
//!
//! Logs go to stderr so stdout carries only JSON.

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

use anyfilter::infrastructure::settings::{load_settings, CliSettings};
use anyfilter::{ConfigStore, ConfiguredFilter, StoreSettings};
use anyfilter_core::{ConfigMap, FilterKind, FormData, NameFilter, Record};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Versioned, file-backed configuration for record filters.
#[derive(Debug, Parser)]
#[command(name = "anyfilter", version)]
struct Cli {
    /// Directory holding the `{kind}_{uid}.json` history files.
    #[arg(long, env = "FILTER_CONFIG_DIR", global = true)]
    config_dir: Option<PathBuf>,

    /// TOML file with defaults for `config_dir`, `default_user` and `log_level`.
    #[arg(long, env = "ANYFILTER_SETTINGS", global = true)]
    settings: Option<PathBuf>,

    /// `tracing` level used when `RUST_LOG` is unset.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Which filter instance a command acts on.
#[derive(Debug, Args)]
struct Target {
    /// Filter kind; names the history file and the form fields.
    #[arg(long, default_value = NameFilter::KIND)]
    kind: String,

    /// Instance identifier.
    #[arg(long)]
    uid: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the active configuration as JSON.
    Show(Target),

    /// Print every saved snapshot as JSON.
    History(Target),

    /// Replace the configuration with the given pairs and save it.
    Set {
        #[command(flatten)]
        target: Target,
        /// Recorded on the snapshot; defaults to the settings' `default_user`.
        #[arg(long)]
        user: Option<String>,
        /// Configuration entries.
        #[arg(value_name = "KEY=VALUE", value_parser = parse_pair)]
        pairs: Vec<(String, String)>,
    },

    /// Replace the configuration from `{kind}_key{n}` / `{kind}_val{n}` form
    /// fields and save it.
    UpdateForm {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        user: Option<String>,
        /// Posted form fields.
        #[arg(value_name = "FIELD=VALUE", value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },

    /// Run NameFilter over a JSON array of records.
    Apply {
        /// NameFilter instance whose configuration is used.
        #[arg(long)]
        uid: String,
        /// File to read records from; stdin when omitted.
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Save a sample NameFilter configuration and apply it to a sample record.
    Demo {
        #[arg(long, default_value = "foo")]
        uid: String,
        #[arg(long, default_value = "example")]
        user: String,
    },
}

/// Splits `KEY=VALUE` at the first `=`.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => load_settings(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => CliSettings::default(),
    };

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    let level = cli.log_level.clone().unwrap_or_else(|| settings.log_level.clone());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let store = ConfigStore::open(&store_settings(cli.config_dir.clone(), &settings))
        .context("FILTER_CONFIG_DIR (or --config-dir) must name an existing directory")?;
    info!(config_dir = %store.base_dir().display(), "anyfilter starting");

    run(cli.command, &store, &settings)
}

/// `--config-dir` / `FILTER_CONFIG_DIR` take precedence over the settings file.
fn store_settings(cli_dir: Option<PathBuf>, settings: &CliSettings) -> StoreSettings {
    StoreSettings {
        config_dir: cli_dir.or_else(|| settings.config_dir.clone()),
    }
}

fn run(command: Command, store: &ConfigStore, settings: &CliSettings) -> anyhow::Result<()> {
    let user_or_default = |user: Option<String>| user.unwrap_or_else(|| settings.default_user.clone());

    match command {
        Command::Show(target) => {
            let filter = open(store, &target.kind, &target.uid)?;
            print_json(filter.config())
        }
        Command::History(target) => {
            let filter = open(store, &target.kind, &target.uid)?;
            print_json(&filter.history()?)
        }
        Command::Set { target, user, pairs } => {
            let mut filter = open(store, &target.kind, &target.uid)?;
            filter.set_config(pairs.into_iter().collect::<ConfigMap>());
            let written = filter.save_config(&user_or_default(user))?;
            report_save(&target, written);
            print_json(filter.config())
        }
        Command::UpdateForm { target, user, fields } => {
            let mut filter = open(store, &target.kind, &target.uid)?;
            let form: FormData = fields.into_iter().collect();
            let written = filter.update_config(&form, &user_or_default(user))?;
            report_save(&target, written);
            print_json(filter.config())
        }
        Command::Apply { uid, input } => {
            let filter = open(store, NameFilter::KIND, &uid)?;
            let records = read_records(input.as_ref())?;
            print_json(&filter.apply(records))
        }
        Command::Demo { uid, user } => demo(store, &uid, &user),
    }
}

fn open<'s>(
    store: &'s ConfigStore,
    kind: &str,
    uid: &str,
) -> anyhow::Result<ConfiguredFilter<NameFilter, &'s ConfigStore>> {
    let kind = FilterKind::new(kind).context("invalid --kind")?;
    ConfiguredFilter::open(store, kind, uid, NameFilter)
        .with_context(|| format!("opening filter instance `{uid}`"))
}

fn report_save(target: &Target, written: bool) {
    if written {
        info!(kind = %target.kind, uid = %target.uid, "configuration saved");
    } else {
        info!(kind = %target.kind, uid = %target.uid, "configuration unchanged");
    }
}

fn read_records(input: Option<&PathBuf>) -> anyhow::Result<Vec<Record>> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading records from {}", path.display()))?,
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("reading records from stdin")?;
            raw
        }
    };
    serde_json::from_str(&raw).context("records must be a JSON array of objects")
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Sample usage: renames animal keys to their Latin-derived adjectives.
///
/// Saving only appends a snapshot the first time; later runs find the same
/// configuration already active.
fn demo(store: &ConfigStore, uid: &str, user: &str) -> anyhow::Result<()> {
    let mut filter = open(store, NameFilter::KIND, uid)?;

    filter.set_config(
        [("dog", "canine"), ("cat", "feline"), ("horse", "equine")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    );
    filter.save_config(user)?;

    let record: Record = [("cat", "meow"), ("dog", "woof"), ("horse", "neigh"), ("foo", "bar")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    let records = vec![record];

    print_json(&records)?;
    print_json(&filter.apply(records))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use anyfilter_core::Filter;
    use uuid::Uuid;

    fn temp_store() -> (ConfigStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("anyfilter_cli_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let store = ConfigStore::open(&StoreSettings::new(&dir)).unwrap();
        (store, dir)
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_parse_pair_splits_at_first_equals() {
        assert_eq!(parse_pair("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
    }

    #[test]
    fn test_parse_pair_allows_empty_value() {
        assert_eq!(parse_pair("key="), Ok(("key".to_string(), String::new())));
    }

    #[test]
    fn test_parse_pair_without_equals_is_error() {
        assert!(parse_pair("noequals").is_err());
    }

    #[test]
    fn test_cli_kind_defaults_to_name_filter() {
        // Arrange / Act
        let cli = Cli::parse_from(["anyfilter", "show", "--uid", "foo"]);

        // Assert
        match cli.command {
            Command::Show(target) => {
                assert_eq!(target.kind, "NameFilter");
                assert_eq!(target.uid, "foo");
            }
            other => panic!("expected show, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_kind_override() {
        let cli = Cli::parse_from(["anyfilter", "history", "--kind", "PriceFilter", "--uid", "x"]);
        match cli.command {
            Command::History(target) => assert_eq!(target.kind, "PriceFilter"),
            other => panic!("expected history, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_set_parses_positional_pairs() {
        let cli = Cli::parse_from([
            "anyfilter", "set", "--uid", "foo", "--user", "alice", "dog=canine", "cat=feline",
        ]);

        match cli.command {
            Command::Set { target, user, pairs: parsed } => {
                assert_eq!(target.uid, "foo");
                assert_eq!(user.as_deref(), Some("alice"));
                assert_eq!(parsed, pairs(&[("dog", "canine"), ("cat", "feline")]));
            }
            other => panic!("expected set, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_update_form_parses_positional_fields() {
        let cli = Cli::parse_from([
            "anyfilter",
            "update-form",
            "--uid",
            "foo",
            "NameFilter_key1=dog",
            "NameFilter_val1=canine",
        ]);

        match cli.command {
            Command::UpdateForm { user, fields, .. } => {
                assert_eq!(user, None);
                assert_eq!(
                    fields,
                    pairs(&[("NameFilter_key1", "dog"), ("NameFilter_val1", "canine")])
                );
            }
            other => panic!("expected update-form, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_pair_without_equals() {
        let result = Cli::try_parse_from(["anyfilter", "set", "--uid", "foo", "noequals"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_config_dir_is_global() {
        let cli = Cli::parse_from(["anyfilter", "show", "--uid", "foo", "--config-dir", "/srv/filters"]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/srv/filters")));
    }

    #[test]
    fn test_cli_config_dir_wins_over_settings_file() {
        // Arrange
        let settings = CliSettings {
            config_dir: Some(PathBuf::from("/from/settings")),
            ..CliSettings::default()
        };

        // Act
        let resolved = store_settings(Some(PathBuf::from("/from/cli")), &settings);

        // Assert
        assert_eq!(resolved.config_dir, Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn test_settings_file_config_dir_used_when_cli_is_silent() {
        let settings = CliSettings {
            config_dir: Some(PathBuf::from("/from/settings")),
            ..CliSettings::default()
        };

        let resolved = store_settings(None, &settings);

        assert_eq!(resolved.config_dir, Some(PathBuf::from("/from/settings")));
    }

    #[test]
    fn test_run_set_saves_as_default_user() {
        // Arrange
        let (store, dir) = temp_store();
        let settings = CliSettings {
            default_user: "ops".to_string(),
            ..CliSettings::default()
        };
        let cli = Cli::parse_from(["anyfilter", "set", "--uid", "foo", "dog=canine"]);

        // Act
        run(cli.command, &store, &settings).unwrap();

        // Assert
        let history = open(&store, NameFilter::KIND, "foo").unwrap().history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.snapshots()[0].user, "ops");
        assert_eq!(history.active_config().get("dog").map(String::as_str), Some("canine"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_demo_saves_sample_config_that_renames_record() {
        // Arrange
        let (store, dir) = temp_store();
        let command = Command::Demo {
            uid: "foo".to_string(),
            user: "example".to_string(),
        };

        // Act
        run(command, &store, &CliSettings::default()).unwrap();

        // Assert
        assert!(store.base_dir().join("NameFilter_foo.json").is_file());
        let filter = open(&store, NameFilter::KIND, "foo").unwrap();
        let record: Record = [("cat", "meow"), ("dog", "woof"), ("horse", "neigh"), ("foo", "bar")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), json!(v)))
            .collect();
        let out = NameFilter.apply(vec![record], filter.config());
        let expected: Record = json!({
            "feline": "meow",
            "canine": "woof",
            "equine": "neigh",
            "foo": "bar"
        })
        .as_object()
        .cloned()
        .unwrap();
        assert_eq!(out, vec![expected]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_run_demo_twice_keeps_single_snapshot() {
        let (store, dir) = temp_store();
        let demo_command = || Command::Demo {
            uid: "foo".to_string(),
            user: "example".to_string(),
        };

        run(demo_command(), &store, &CliSettings::default()).unwrap();
        run(demo_command(), &store, &CliSettings::default()).unwrap();

        let history = open(&store, NameFilter::KIND, "foo").unwrap().history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.snapshots()[0].user, "example");
        std::fs::remove_dir_all(&dir).ok();
    }
}
