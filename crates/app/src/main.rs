use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use form_core::model::{FormDefinition, StepCounterTemplate};
use services::{
    FormController, FormHandle, FormRuntime, NoHistory, PersistenceManager, PresenterState,
    WatchPresenter,
};
use storage::repository::Storage;
use tokio::sync::watch;
use tracing::info;
use ui::vm::Markers;
use ui::{App, UiApp, build_app_context};

mod logging;

const APP_TITLE: &str = "Sign up";
const DEMO_FORM: &str = include_str!("../forms/signup.json");

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    counter_template: StepCounterTemplate,
    markers: Markers,
    form_handle: FormHandle,
    presenter_state: watch::Receiver<PresenterState>,
}

impl UiApp for DesktopApp {
    fn title(&self) -> String {
        APP_TITLE.to_string()
    }

    fn counter_template(&self) -> StepCounterTemplate {
        self.counter_template.clone()
    }

    fn markers(&self) -> Markers {
        self.markers.clone()
    }

    fn form_handle(&self) -> FormHandle {
        self.form_handle.clone()
    }

    fn presenter_state(&self) -> watch::Receiver<PresenterState> {
        self.presenter_state.clone()
    }
}

struct Args {
    db_url: String,
    form_path: Option<PathBuf>,
    verbose: bool,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- ui    [--db <sqlite_url>] [--form <path>] [--verbose]");
    eprintln!("  cargo run -p app -- clear [--db <sqlite_url>] [--form <path>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:form-state.sqlite3");
    eprintln!("  --form <built-in sign-up form>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  STEPFORM_DB_URL, STEPFORM_FORM, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Clear,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("STEPFORM_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("form-state.sqlite3".into()), normalize_sqlite_url);
        let mut form_path = std::env::var("STEPFORM_FORM").ok().map(PathBuf::from);
        let mut verbose = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--form" => {
                    form_path = Some(PathBuf::from(require_value(args, "--form")?));
                }
                "--verbose" | "-v" => verbose = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            form_path,
            verbose,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn load_definition(path: Option<&PathBuf>) -> Result<FormDefinition, Box<dyn std::error::Error>> {
    let definition = match path {
        Some(path) => FormDefinition::from_json(&std::fs::read_to_string(path)?)?,
        None => FormDefinition::from_json(DEMO_FORM)?,
    };
    Ok(definition)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand launches the UI.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with('-') => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with('-') {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    logging::init_logging(parsed.verbose);

    let definition = load_definition(parsed.form_path.as_ref())?;

    // Open + migrate SQLite here so core and services never see a URL.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;
    let persistence =
        PersistenceManager::from_config(Arc::clone(&storage.form_states), &definition.config);

    match cmd {
        Command::Ui => {
            let (presenter, presenter_state) = WatchPresenter::channel();
            let controller =
                FormController::start(&definition, persistence, presenter, NoHistory, 0).await?;
            let (form_handle, _task) = FormRuntime::spawn(controller);

            let config = &definition.config;
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                counter_template: config.step_counter_template.clone(),
                markers: Markers::default().with_loading_class(config.loading_step_marker.clone()),
                form_handle,
                presenter_state,
            });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title(APP_TITLE)
                    .with_always_on_top(false),
            );

            info!(db = %parsed.db_url, "launching form window");
            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Clear => {
            if persistence.clear().await {
                info!(key = persistence.key(), "stored form state cleared");
                Ok(())
            } else {
                Err(std::io::Error::other("failed to clear stored form state").into())
            }
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
