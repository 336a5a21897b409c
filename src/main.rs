use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stretchtv::controller::Controller;
use stretchtv::domain::{StretchSelection, StvConfig, StvError};
use stretchtv::model::{Model, Status};
use stretchtv::stretch::{DEFAULT_POLL_LIMIT, RenderedGrid};
use stretchtv::ui::TableUI;

/// A tui based tabular data viewer with content-stretching columns.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Data file to show (csv, parquet, arrow ipc)
    path: String,

    /// Columns that fit their width to the content, comma separated. Default: all
    #[arg(long, value_delimiter = ',')]
    stretch: Vec<String>,

    /// Keep every column at its configured width
    #[arg(long, conflicts_with = "stretch")]
    no_stretch: bool,

    /// Initial column width
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Rows per page
    #[arg(long, default_value_t = 100)]
    page_size: usize,

    /// Frames a column fit waits for rendered rows before giving up
    #[arg(long, default_value_t = DEFAULT_POLL_LIMIT)]
    poll_limit: usize,

    /// Event poll timeout in milliseconds
    #[arg(long, default_value_t = 100)]
    event_poll_time: u64,

    /// Log file, filtered with RUST_LOG
    #[arg(long, default_value = "stv.log")]
    log_file: String,
}

impl Args {
    fn config(&self) -> StvConfig {
        let stretch = if self.no_stretch {
            StretchSelection::NONE
        } else if self.stretch.is_empty() {
            StretchSelection::ALL
        } else {
            StretchSelection::FIELDS(self.stretch.clone())
        };
        StvConfig {
            event_poll_time: self.event_poll_time,
            page_size: self.page_size.max(1),
            column_width: self.width,
            stretch,
            poll_limit: self.poll_limit.max(1),
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_tracing(Path::new(&args.log_file)) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    let mut terminal = ratatui::init();
    let result = run(&args, &mut terminal);
    ratatui::restore();

    match result {
        Err(e) => {
            error!("Exiting with {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_tracing(log_file: &Path) -> Result<(), StvError> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stretchtv=info,stv=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .try_init()
        .map_err(|e| StvError::LoggingFailed(e.to_string()))
}

fn run(args: &Args, terminal: &mut ratatui::DefaultTerminal) -> Result<(), StvError> {
    info!("Starting stv!");
    let cfg = args.config();
    let path = shellexpand::full(&args.path)
        .map_err(|e| StvError::InvalidArgument(e.to_string()))?
        .into_owned();

    let size = terminal.size()?;
    let mut model = Model::init(&cfg, size.height as usize);
    let mut ui = TableUI::new();
    let controller = Controller::new(&cfg);

    // Show the loading state before the (blocking) load.
    terminal.draw(|f| {
        ui.draw(&model, f);
    })?;
    model.load_data_file(PathBuf::from(path))?;

    while model.status != Status::QUITTING {
        let mut rendered = RenderedGrid::new();
        terminal.draw(|f| rendered = ui.draw(&model, f))?;

        // Deferred column work runs once the frame is done.
        model.tick(&rendered);

        if let Some(message) = controller.handle_event(&model)? {
            model.update(Some(message))?;
        };
    }

    Ok(())
}
