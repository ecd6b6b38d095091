use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tracing::{debug, info};

use eye2heart::app::{App, View};
use eye2heart::config::Settings;
use eye2heart::data::VitalsData;
use eye2heart::logging::{self, LogTarget};
use eye2heart::session::SessionFile;
use eye2heart::source::{ApiSource, DataSource, FileSource};
use eye2heart::{events, report, ui};
use eye2heart_client::{
    ApiClient, ClinicalFeatures, ContactMessage, Credentials, ImageUpload, Prediction,
    PredictionRequest, Registration, Session,
};

#[derive(Parser, Debug)]
#[command(name = "eye2heart")]
#[command(about = "Cardiovascular vitals trends from Eye2Heart retinal assessments")]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API base URL, overrides the settings file
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Where the login session is stored
    #[arg(long, global = true)]
    session_file: Option<PathBuf>,

    /// Write logs to this file (the dashboard never logs to the terminal)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Show the logged-in user's profile
    Profile,

    /// Open the vitals trends dashboard
    Trends {
        /// Read records from a JSON file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// File written by the export key
        #[arg(long, default_value = eye2heart::app::DEFAULT_EXPORT_PATH)]
        export: PathBuf,
    },

    /// Write the vitals analysis to a JSON report and exit
    Report {
        #[arg(short, long, default_value = eye2heart::app::DEFAULT_EXPORT_PATH)]
        output: PathBuf,

        /// Read records from a JSON file instead of the API
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Submit a retinal image and clinical details for risk prediction
    Analyze {
        /// Retinal image to upload
        #[arg(long)]
        image: PathBuf,

        /// Clinical feature as name=value, e.g. --feature age=54 (repeatable)
        #[arg(short = 'F', long = "feature", value_name = "NAME=VALUE")]
        features: Vec<String>,

        /// Print the raw prediction as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send a message to the support team
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        message: String,
    },
}

impl Command {
    fn is_interactive(&self) -> bool {
        matches!(self, Command::Trends { .. })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_target = match (&cli.log_file, cli.command.is_interactive()) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Off,
        (None, false) => LogTarget::Stderr,
    };
    logging::init(log_target, cli.verbose)?;

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        settings.api.endpoint = endpoint;
    }
    if let Some(path) = cli.session_file {
        settings.session_file = Some(path);
    }
    debug!(?settings, "Settings loaded");

    let session_file = SessionFile::new(settings.session_path());

    match cli.command {
        Command::Register {
            name,
            email,
            password,
        } => {
            let client = build_client(&settings)?;
            block_on(client.register(&Registration {
                name,
                email,
                password,
            }))??;
            println!("Account created. Run `eye2heart login` to sign in.");
            Ok(())
        }

        Command::Login { email, password } => {
            let client = build_client(&settings)?;
            let session = block_on(client.login(&Credentials {
                email: email.clone(),
                password,
            }))??;
            session_file.save(&session, Some(email.as_str()))?;
            info!(path = %session_file.path().display(), "Logged in");
            println!("Logged in as {}", email);
            Ok(())
        }

        Command::Logout => {
            session_file.clear()?;
            println!("Logged out");
            Ok(())
        }

        Command::Profile => {
            let client = build_client(&settings)?;
            let session = require_session(&session_file)?;
            let profile = with_session(&session_file, block_on(client.profile(&session))?)?;
            println!("Name:  {}", profile.name);
            println!("Email: {}", profile.email);
            Ok(())
        }

        Command::Trends { file, export } => run_trends(&settings, &session_file, file, export),

        Command::Report { output, file } => {
            let (data, source) = match file {
                Some(path) => {
                    let data = VitalsData::load(&path, &settings.trend)
                        .with_context(|| format!("Failed to load {}", path.display()))?;
                    (data, format!("file: {}", path.display()))
                }
                None => {
                    let client = build_client(&settings)?;
                    let session = require_session(&session_file)?;
                    let records =
                        with_session(&session_file, block_on(client.vitals(&session))?)?;
                    let source = format!("api: {}", client.endpoint());
                    (VitalsData::from_records(records, &settings.trend), source)
                }
            };
            report::write_report(&output, &data, &source)?;
            println!(
                "Exported {} records to {}",
                data.analysis.total_records,
                output.display()
            );
            Ok(())
        }

        Command::Analyze {
            image,
            features,
            json,
        } => {
            let mut clinical = ClinicalFeatures::new();
            for pair in &features {
                clinical.set_pair(pair)?;
            }
            let request = PredictionRequest {
                image: ImageUpload::from_path(&image)?,
                features: clinical,
            };

            let client = build_client(&settings)?;
            let session = require_session(&session_file)?;
            let prediction =
                with_session(&session_file, block_on(client.predict(&session, &request))?)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                print_prediction(&prediction);
            }
            Ok(())
        }

        Command::Contact {
            name,
            email,
            subject,
            message,
        } => {
            let client = build_client(&settings)?;
            let reply = block_on(client.contact(&ContactMessage {
                name,
                email,
                subject,
                message,
            }))??;
            println!("{}", reply);
            Ok(())
        }
    }
}

fn build_client(settings: &Settings) -> Result<ApiClient> {
    Ok(ApiClient::builder()
        .endpoint(settings.api.endpoint.clone())
        .timeout(settings.api.timeout())
        .build()?)
}

/// Run a future to completion on a fresh runtime.
fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new()?;
    Ok(rt.block_on(future))
}

fn require_session(session_file: &SessionFile) -> Result<Session> {
    session_file.load()?.with_context(|| {
        format!(
            "Not logged in (no session at {}). Run `eye2heart login` first.",
            session_file.path().display()
        )
    })
}

/// Discard the stored session if the server rejected it.
fn with_session<T>(
    session_file: &SessionFile,
    result: Result<T, eye2heart_client::ClientError>,
) -> Result<T> {
    match result {
        Err(e) if e.is_unauthorized() => {
            session_file.clear()?;
            Err(e.into())
        }
        other => Ok(other?),
    }
}

fn print_prediction(prediction: &Prediction) {
    println!(
        "Risk level:       {} ({:.1}%)",
        prediction.risk_level, prediction.risk_percent
    );
    println!(
        "Disease detected: {} (image model probability {:.2})",
        if prediction.disease_detected { "yes" } else { "no" },
        prediction.dl_probability
    );
    println!("Confidence:       {:.1}%", prediction.confidence);
    if let Some(bpm) = prediction.heart_rate {
        println!("Heart rate:       {} BPM", bpm);
    }
    println!("10-year outlook:  {}", prediction.ten_year_chd_prediction);

    if let Some(p) = prediction.probabilities {
        println!(
            "Probabilities:    low {:.1}%  medium {:.1}%  high {:.1}%",
            p.low * 100.0,
            p.medium * 100.0,
            p.high * 100.0
        );
    }
    if !prediction.gradcam_legend.is_empty() {
        println!("Grad-CAM legend:");
        for (colour, meaning) in &prediction.gradcam_legend {
            println!("  {:<8} {}", colour, meaning);
        }
    }
}

/// Open the dashboard on the API or a local file.
fn run_trends(
    settings: &Settings,
    session_file: &SessionFile,
    file: Option<PathBuf>,
    export: PathBuf,
) -> Result<()> {
    if let Some(path) = file {
        let source = Box::new(FileSource::new(&path));
        run_tui(source, settings, export, settings.refresh_interval())?;
        return Ok(());
    }

    let client = build_client(settings)?;
    let session = require_session(session_file)?;

    // The runtime must outlive the dashboard; the fetch task runs on its workers
    let rt = tokio::runtime::Runtime::new()?;
    let source = {
        let _guard = rt.enter();
        ApiSource::spawn(client, session, settings.refresh_interval())
    };

    // The API source pushes snapshots, so poll it often
    let session_expired = run_tui(
        Box::new(source),
        settings,
        export,
        Duration::from_millis(100),
    )?;

    if session_expired {
        session_file.clear()?;
        eprintln!("Session expired. Run `eye2heart login` to sign in again.");
    }
    Ok(())
}

/// Run the TUI with the given data source.
///
/// Returns true if the session was rejected while the dashboard was open.
fn run_tui(
    source: Box<dyn DataSource>,
    settings: &Settings,
    export_path: PathBuf,
    poll_interval: Duration,
) -> Result<bool> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Restore the terminal before the panic message is printed
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(source, settings.trend);
    app.export_path = export_path;
    let _ = app.reload_data();

    let result = run_app(&mut terminal, &mut app, poll_interval);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result.map(|()| app.session_expired)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    poll_interval: Duration,
) -> Result<()> {
    let mut last_poll = Instant::now();

    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 18;

    while app.running {
        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(ratatui::style::Color::Yellow));
                let centered = ratatui::layout::Rect::new(
                    0,
                    (area.height / 2).saturating_sub(2),
                    area.width,
                    5.min(area.height),
                );
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(14),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Trends => ui::trends::render(frame, app, chunks[2]),
                View::History => ui::history::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                // Content starts after header (1) + tabs (1)
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, 2),
                _ => {}
            }
        }

        if last_poll.elapsed() >= poll_interval {
            let _ = app.reload_data();
            last_poll = Instant::now();
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "eye2heart",
            "report",
            "--output",
            "out.json",
            "--endpoint",
            "http://api.test",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("http://api.test"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Report { ref output, file: None } if output.as_path() == Path::new("out.json")));
    }

    #[test]
    fn test_cli_repeated_features() {
        let cli = Cli::try_parse_from([
            "eye2heart",
            "analyze",
            "--image",
            "eye.png",
            "--feature",
            "age=54",
            "-F",
            "heartRate=72",
        ])
        .unwrap();
        let Command::Analyze { features, json, .. } = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(features, ["age=54", "heartRate=72"]);
        assert!(!json);
    }

    #[test]
    fn test_only_trends_is_interactive() {
        let cli = Cli::try_parse_from(["eye2heart", "trends", "--file", "v.json"]).unwrap();
        assert!(cli.command.is_interactive());
        let cli = Cli::try_parse_from(["eye2heart", "logout"]).unwrap();
        assert!(!cli.command.is_interactive());
    }

    #[test]
    fn test_with_session_clears_on_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionFile::new(dir.path().join("session.json"));
        file.save(&Session::new("tok"), None).unwrap();

        let result: Result<()> =
            with_session(&file, Err(eye2heart_client::ClientError::Unauthorized));
        assert!(result.is_err());
        assert!(file.load().unwrap().is_none());
    }
}
