//! Command-line interface for termprofile.
//!
//! Reads and writes profile values from the shell, prints the resolved file
//! layout, and checks search patterns the same way the find dialog does.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::debug::DebugLevel;
use termprofile_config::{ConfigDirs, Domain, Profile, ProfileError, SearchFlags, Value};

/// termprofile - typed, persistent terminal settings profiles
#[derive(Parser, Debug)]
#[command(name = "termprofile")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<DebugLevel>,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH", global = true, num_args = 0..=1, default_missing_value = "")]
    pub log_file: Option<PathBuf>,

    /// Override the user configuration base directory
    #[arg(long, value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// System configuration base directory to search (repeatable, in order)
    #[arg(long = "system-dir", value_name = "DIR", global = true)]
    pub system_dirs: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a value (the type's zero value if unset)
    Get {
        profile: String,
        #[arg(value_name = "TYPE")]
        domain: Domain,
        key: String,
    },

    /// Store a value and write the profile file
    Set {
        profile: String,
        #[arg(value_name = "TYPE")]
        domain: Domain,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// List entries, optionally of one type only
    List {
        profile: String,
        #[arg(value_name = "TYPE")]
        domain: Option<Domain>,
    },

    /// Print all readable entries as JSON
    Dump { profile: String },

    /// Show which files are probed for a profile and which one is used
    Where { profile: String },

    /// Validate a search pattern the way the find dialog does
    SearchCheck(SearchCheckArgs),
}

#[derive(Args, Debug)]
pub struct SearchCheckArgs {
    #[arg(allow_hyphen_values = true)]
    pub pattern: String,

    #[arg(long)]
    pub match_case: bool,

    #[arg(long)]
    pub entire_word: bool,

    /// Treat the pattern as a regular expression
    #[arg(long)]
    pub regex: bool,

    #[arg(long)]
    pub backwards: bool,

    #[arg(long)]
    pub wrap: bool,
}

impl SearchCheckArgs {
    pub fn flags(&self) -> SearchFlags {
        let mut flags = SearchFlags::NONE;
        flags.set(SearchFlags::MATCH_CASE, self.match_case);
        flags.set(SearchFlags::ENTIRE_WORD, self.entire_word);
        flags.set(SearchFlags::AS_REGEX, self.regex);
        flags.set(SearchFlags::BACKWARDS, self.backwards);
        flags.set(SearchFlags::WRAP, self.wrap);
        flags
    }
}

impl Cli {
    /// Directory set from the flags, falling back to the platform's.
    pub fn config_dirs(&self) -> ConfigDirs {
        let from_env = ConfigDirs::from_env();
        let user_base = self
            .config_dir
            .clone()
            .unwrap_or_else(|| from_env.user_base().to_path_buf());
        let system_bases = if self.system_dirs.is_empty() {
            from_env.system_bases().to_vec()
        } else {
            self.system_dirs.clone()
        };
        ConfigDirs::new(user_base, system_bases)
    }

    /// Log file requested on the command line; an empty value means the
    /// default location in the temp directory.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file.as_ref().map(|p| {
            if p.as_os_str().is_empty() {
                crate::debug::default_log_path()
            } else {
                p.clone()
            }
        })
    }
}

/// Execute `command`, writing results to `out`.
pub fn run(command: &Commands, dirs: &ConfigDirs, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Get {
            profile,
            domain,
            key,
        } => {
            let mut profile = open(profile, dirs)?;
            let value = profile.get_value(*domain, key);
            report_load_error(&profile);
            writeln!(out, "{value}")?;
        }
        Commands::Set {
            profile,
            domain,
            key,
            value,
        } => {
            let parsed = domain
                .parse_value(value)
                .ok_or_else(|| anyhow!("'{value}' is not a valid {domain}"))?;
            let mut profile = open(profile, dirs)?;
            let sink = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
            let events = std::sync::Arc::clone(&sink);
            profile.subscribe(*domain, move |event| events.lock().push(event.clone()));

            let result = profile.set_value(key, parsed);
            report_load_error(&profile);
            for event in sink.lock().iter() {
                writeln!(out, "{}: {} = {}", event.kind_name(), event.key(), event_value(event))?;
            }
            result.with_context(|| format!("failed to store '{key}'"))?;
            if let Some(path) = profile.file_path() {
                writeln!(out, "saved to {}", path.display())?;
            }
        }
        Commands::List { profile, domain } => {
            let mut profile = open(profile, dirs)?;
            let domains = match domain {
                Some(d) => vec![*d],
                None => Domain::ALL.to_vec(),
            };
            for d in domains {
                for key in profile.keys(d) {
                    let value = profile.get_value(d, &key);
                    writeln!(out, "{}.{} = {}", d.section(), key, value)?;
                }
            }
            report_load_error(&profile);
        }
        Commands::Dump { profile } => {
            let mut profile = open(profile, dirs)?;
            let snapshot = profile.snapshot();
            report_load_error(&profile);
            writeln!(out, "{}", serde_json::to_string_pretty(&snapshot)?)?;
        }
        Commands::Where { profile } => {
            termprofile_config::validate_profile_name(profile)?;
            let resolved = dirs.resolve(profile);
            for candidate in dirs.candidates(profile) {
                let marker = if resolved.as_ref() == Some(&candidate) {
                    "*"
                } else {
                    " "
                };
                writeln!(out, "{marker} {}", candidate.display())?;
            }
            if resolved.is_none() {
                writeln!(
                    out,
                    "no file yet; first save creates {}",
                    dirs.user_profile_path(profile).display()
                )?;
            }
        }
        Commands::SearchCheck(args) => {
            let flags = args.flags();
            let mut scratch = Profile::with_dirs("search", dirs.clone())?;
            match scratch.apply_search(&args.pattern, flags) {
                Ok(()) => writeln!(out, "ok: {:?} [{}]", args.pattern, flags)?,
                Err(ProfileError::InvalidPattern(msg)) => {
                    bail!("Invalid search expression: {msg}")
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

fn open(name: &str, dirs: &ConfigDirs) -> Result<Profile> {
    Profile::with_dirs(name, dirs.clone()).with_context(|| format!("cannot open profile '{name}'"))
}

fn report_load_error(profile: &Profile) {
    if let Some(e) = profile.load_error() {
        eprintln!("termprofile: warning: {e}; using an empty profile");
    }
}

fn event_value(event: &termprofile_config::ChangeEvent) -> Value {
    use termprofile_config::ChangeEvent;
    match event {
        ChangeEvent::StringChanged { value, .. } => Value::Text(value.clone()),
        ChangeEvent::IntChanged { value, .. } => Value::Integer(*value),
        ChangeEvent::BooleanChanged { value, .. } => Value::Boolean(*value),
        ChangeEvent::FloatChanged { value, .. } => Value::Float(*value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dirs(temp_dir: &TempDir) -> ConfigDirs {
        ConfigDirs::new(temp_dir.path().join("user"), vec![])
    }

    fn run_to_string(command: Commands, dirs: &ConfigDirs) -> Result<String> {
        let mut out = Vec::new();
        run(&command, dirs, &mut out)?;
        Ok(String::from_utf8(out).expect("utf-8 output"))
    }

    #[test]
    fn test_cli_parses_set() {
        let cli = Cli::try_parse_from([
            "termprofile",
            "--config-dir",
            "/tmp/cfg",
            "set",
            "Default",
            "int",
            "columns",
            "-5",
        ])
        .expect("valid arguments");
        match cli.command {
            Commands::Set {
                domain, ref value, ..
            } => {
                assert_eq!(domain, Domain::Integer);
                assert_eq!(value, "-5");
            }
            ref other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config_dirs().user_base(), std::path::Path::new("/tmp/cfg"));
    }

    #[test]
    fn test_cli_rejects_unknown_type() {
        assert!(Cli::try_parse_from(["termprofile", "get", "Default", "colour", "k"]).is_err());
    }

    #[test]
    fn test_set_get_and_list() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dirs = dirs(&temp_dir);

        let out = run_to_string(
            Commands::Set {
                profile: "Default".into(),
                domain: Domain::Float,
                key: "scale".into(),
                value: "1.5".into(),
            },
            &dirs,
        )
        .expect("set succeeds");
        assert!(out.starts_with("float-changed: scale = 1.5\n"));

        let out = run_to_string(
            Commands::Get {
                profile: "Default".into(),
                domain: Domain::Float,
                key: "scale".into(),
            },
            &dirs,
        )
        .expect("get succeeds");
        assert_eq!(out, "1.5\n");

        let out = run_to_string(
            Commands::List {
                profile: "Default".into(),
                domain: None,
            },
            &dirs,
        )
        .expect("list succeeds");
        assert_eq!(out, "floats.scale = 1.5\n");
    }

    #[test]
    fn test_set_rejects_unparseable_value() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let result = run_to_string(
            Commands::Set {
                profile: "Default".into(),
                domain: Domain::Boolean,
                key: "bell".into(),
                value: "perhaps".into(),
            },
            &dirs(&temp_dir),
        );
        assert!(result.is_err());
        assert!(!temp_dir.path().join("user").exists());
    }

    #[test]
    fn test_where_marks_nothing_before_first_save() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let out = run_to_string(
            Commands::Where {
                profile: "Default".into(),
            },
            &dirs(&temp_dir),
        )
        .expect("where succeeds");
        assert!(out.contains("no file yet"));
        assert!(!out.contains('*'));
    }

    #[test]
    fn test_search_check() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dirs = dirs(&temp_dir);
        let check = |pattern: &str, regex: bool| {
            run_to_string(
                Commands::SearchCheck(SearchCheckArgs {
                    pattern: pattern.into(),
                    match_case: false,
                    entire_word: false,
                    regex,
                    backwards: false,
                    wrap: true,
                }),
                &dirs,
            )
        };
        assert!(check("abc(", true).is_err());
        let out = check("abc(", false).expect("literal pattern accepted");
        assert!(out.contains("WRAP"));
    }
}
