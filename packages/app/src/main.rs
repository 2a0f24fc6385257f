use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use conjugar::commands::practice::{parse_persons, parse_tenses, AnswerMode, PracticeOptions};
use conjugar::commands::{self, split_list, Console, OutputFormat};
use conjugar::credentials::StoragePreference;
use conjugar::logging::init_tracing;
use conjugar::{App, AppResult, Config};
use conjugar_algo::{Difficulty, Tense};

#[derive(Parser)]
#[command(name = "conjugar", about = "Spanish verb conjugation trainer", version)]
struct Cli {
    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive conjugation drill
    Practice {
        #[arg(long, value_parser = parse_difficulty)]
        difficulty: Option<Difficulty>,
        /// Comma-separated infinitives
        #[arg(long)]
        verbs: Option<String>,
        /// Comma-separated tenses (present, preterite, ...)
        #[arg(long)]
        tenses: Option<String>,
        /// Comma-separated persons (yo, tú, 2, ...)
        #[arg(long)]
        persons: Option<String>,
        #[arg(long)]
        count: Option<usize>,
        #[arg(long, value_enum, default_value_t = AnswerMode::Free)]
        mode: AnswerMode,
        #[arg(long)]
        seed: Option<u64>,
        /// Drill the current learning path stage
        #[arg(long)]
        stage: bool,
    },

    /// Drill items that are due for review
    Review {
        #[arg(long, default_value = "10")]
        limit: usize,
        #[arg(long, value_enum, default_value_t = AnswerMode::Free)]
        mode: AnswerMode,
    },

    /// Conjugate your way through a short story
    Story {
        #[arg(long, value_parser = parse_tense, default_value = "present")]
        tense: Tense,
        #[arg(long, default_value = "5")]
        length: usize,
        #[arg(long, value_enum, default_value_t = AnswerMode::Free)]
        mode: AnswerMode,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Timed round on the most common verbs
    Speed {
        /// Round length in seconds
        #[arg(long, default_value = "60")]
        duration: u32,
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Real-world task scenarios
    Scenario {
        /// Scenario id (random when omitted)
        id: Option<String>,
        #[arg(long, default_value = "5")]
        count: usize,
        /// List scenarios and completion
        #[arg(long)]
        list: bool,
    },

    /// Learning path progress
    #[command(subcommand)]
    Path(PathCommand),

    /// Overall statistics
    Stats,

    /// Recent wrong answers
    Mistakes {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Daily accuracy
    Curve {
        #[arg(long, default_value = "30")]
        days: u32,
    },

    /// Lowest-accuracy verb forms
    Weak {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Recent practice sessions
    Sessions {
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print a conjugation table
    Conjugate {
        verb: String,
        #[arg(long, value_parser = parse_tense)]
        tense: Option<Tense>,
    },

    /// Show or change preferences
    #[command(subcommand)]
    Settings(SettingsCommand),

    /// Manage API keys
    Credentials {
        /// Password protecting the master key
        #[arg(long, global = true, env = "CONJUGAR_MASTER_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        #[command(subcommand)]
        command: CredentialsCommand,
    },
}

#[derive(Subcommand)]
enum PathCommand {
    /// Current path and stage
    Show,
    /// Switch to beginner, intermediate or advanced
    Switch { path: String },
    /// Record a stage result in percent
    Complete { accuracy: f64 },
}

#[derive(Subcommand)]
enum SettingsCommand {
    Show,
    /// Keys: strictness, count, difficulty, translation
    Set { key: String, value: String },
}

#[derive(Subcommand)]
enum CredentialsCommand {
    /// Store a credential (prompts for the value when omitted)
    Set {
        key: String,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// auto, keyring, file or env
        #[arg(long, value_parser = parse_storage)]
        storage: Option<StoragePreference>,
        /// Store even if validation fails
        #[arg(long)]
        force: bool,
    },
    /// Print a credential (masked unless --show)
    Get {
        key: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        show: bool,
    },
    List,
    Delete {
        key: String,
        #[arg(long)]
        username: Option<String>,
    },
    /// Validate one credential, or all stored ones
    Validate {
        key: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Storage backends and settings
    Info,
    /// Default backend: auto, keyring, file or env
    Prefer {
        #[arg(value_parser = parse_storage)]
        storage: StoragePreference,
    },
    /// Write a manifest of stored names (no values)
    Backup {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Re-encrypt under a new master key
    Rotate {
        #[arg(long, env = "CONJUGAR_NEW_MASTER_PASSWORD", hide_env_values = true)]
        new_password: Option<String>,
    },
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    Difficulty::from_str(s).ok_or_else(|| format!("unknown difficulty '{}'", s))
}

fn parse_tense(s: &str) -> Result<Tense, String> {
    Tense::from_str(s).ok_or_else(|| format!("unknown tense '{}'", s))
}

fn parse_storage(s: &str) -> Result<StoragePreference, String> {
    StoragePreference::from_str(s).ok_or_else(|| format!("unknown storage '{}'", s))
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    let _log_guard = init_tracing(&config.log_level, &config.log_dir());

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: Config) -> AppResult<()> {
    let format = cli.format;
    let mut app = App::open(config)?;
    let mut console = Console::stdio();

    match cli.command {
        Command::Practice {
            difficulty,
            verbs,
            tenses,
            persons,
            count,
            mode,
            seed,
            stage,
        } => {
            let options = PracticeOptions {
                difficulty,
                verbs: split_list(verbs.as_deref()),
                tenses: parse_tenses(&split_list(tenses.as_deref()))?,
                persons: parse_persons(&split_list(persons.as_deref()))?,
                count,
                mode,
                seed,
                stage,
            };
            commands::practice::run(&app, &mut console, &options)?;
        }
        Command::Review { limit, mode } => {
            commands::practice::run_review(&app, &mut console, limit, mode)?;
        }
        Command::Story {
            tense,
            length,
            mode,
            seed,
        } => {
            commands::practice::run_story(&app, &mut console, tense, length, mode, seed)?;
        }
        Command::Speed { duration, seed } => {
            commands::drills::run_speed(&mut console, duration, seed)?;
        }
        Command::Scenario { id, count, list } => {
            if list {
                commands::drills::run_scenario_list(&app, console.out())?;
            } else {
                commands::drills::run_scenario(&app, &mut console, id.as_deref(), count)?;
            }
        }
        Command::Path(sub) => {
            let out = console.out();
            match sub {
                PathCommand::Show => commands::progress::run_path_show(&app, out, format)?,
                PathCommand::Switch { path } => commands::progress::run_path_switch(&app, out, &path)?,
                PathCommand::Complete { accuracy } => {
                    commands::progress::run_path_complete(&app, out, accuracy)?
                }
            }
        }
        Command::Stats => commands::progress::run_stats(&app, console.out(), format)?,
        Command::Mistakes { limit } => {
            commands::progress::run_mistakes(&app, console.out(), limit, format)?
        }
        Command::Curve { days } => commands::progress::run_curve(&app, console.out(), days, format)?,
        Command::Weak { limit } => commands::progress::run_weak(&app, console.out(), limit, format)?,
        Command::Sessions { limit } => {
            commands::progress::run_sessions(&app, console.out(), limit, format)?
        }
        Command::Conjugate { verb, tense } => {
            commands::conjugate::run(console.out(), &verb, tense, format)?
        }
        Command::Settings(sub) => match sub {
            SettingsCommand::Show => commands::settings::run_show(&app, console.out(), format)?,
            SettingsCommand::Set { key, value } => {
                commands::settings::run_set(&mut app, console.out(), &key, &value)?
            }
        },
        Command::Credentials { password, command } => {
            let old_password = password.clone();
            let mut manager = app.credentials(password)?;
            match command {
                CredentialsCommand::Set {
                    key,
                    value,
                    username,
                    storage,
                    force,
                } => {
                    let request = commands::credentials::SetRequest {
                        key: &key,
                        value,
                        username: username.as_deref(),
                        storage,
                        force,
                    };
                    commands::credentials::run_set(&mut manager, &mut console, request)?;
                }
                CredentialsCommand::Get { key, username, show } => {
                    commands::credentials::run_get(&manager, console.out(), &key, username.as_deref(), show)?
                }
                CredentialsCommand::List => {
                    commands::credentials::run_list(&manager, console.out(), format)?
                }
                CredentialsCommand::Delete { key, username } => {
                    commands::credentials::run_delete(&mut manager, console.out(), &key, username.as_deref())?
                }
                CredentialsCommand::Validate { key, value } => commands::credentials::run_validate(
                    &manager,
                    console.out(),
                    key.as_deref(),
                    value,
                    format,
                )?,
                CredentialsCommand::Info => {
                    commands::credentials::run_info(&manager, console.out(), format)?
                }
                CredentialsCommand::Prefer { storage } => {
                    commands::credentials::run_prefer(&mut manager, console.out(), storage)?
                }
                CredentialsCommand::Backup { dir } => {
                    commands::credentials::run_backup(&manager, console.out(), dir.as_deref())?
                }
                CredentialsCommand::Rotate { new_password } => commands::credentials::run_rotate(
                    &mut manager,
                    console.out(),
                    old_password.as_deref(),
                    new_password.as_deref(),
                )?,
            }
        }
    }

    Ok(())
}
