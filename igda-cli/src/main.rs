mod lookup;
mod reports;
mod stages;
mod storage;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use igda_core::{AcquisitionMode, Calculator};

use lookup::{DEFAULT_API_BASE, DEFAULT_MODEL, LookupSettings};
use reports::ReportFormat;
use stages::{GeographyRequest, Outcome};
use storage::JsonFileStore;

/// Exit status of a stage that refused to run.
const HALTED_EXIT_CODE: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Bought at a shop or market
    #[value(alias = "compra")]
    Buy,
    /// Bartered or exchanged
    #[value(alias = "cambia")]
    Barter,
    /// Grown or made at home
    Produce,
}

impl From<ModeArg> for AcquisitionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Buy => Self::Buy,
            ModeArg::Barter => Self::Barter,
            ModeArg::Produce => Self::Produce,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "igda", version)]
#[command(
    about = "i-GDA food-miles calculator - one wizard stage per subcommand, saved between runs"
)]
struct Args {
    /// Session snapshot file
    #[arg(long, env = "IGDA_DATA", default_value = "datos.json", global = true)]
    data: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Stage 1: country dimensions and the PD baseline
    Geography(GeographyArgs),
    /// Stage 2: the foods eaten today, in order (1 to 9)
    Foods {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Stage 3: derive the six distance tables from PD
    Tables,
    /// Stage 4: km travelled by each food, in list order
    Distances {
        #[arg(required = true, allow_negative_numbers = true)]
        km: Vec<f64>,
    },
    /// Stage 5: how each food was obtained, in list order
    Modes {
        #[arg(value_enum, required = true)]
        modes: Vec<ModeArg>,
    },
    /// Stage 6: accumulated value per food
    Values(ReportArgs),
    /// Stage 7: the i-GDA index and diet type
    Result(ReportArgs),
    /// Show what has been recorded and the next stage
    Status,
}

#[derive(Debug, clap::Args)]
struct GeographyArgs {
    /// Country name; looked up unless --length and --width are given
    #[arg(required_unless_present = "length")]
    country: Option<String>,

    /// Maximum north-south length in km (manual entry)
    #[arg(long, requires = "width", allow_negative_numbers = true)]
    length: Option<f64>,

    /// Maximum east-west width in km (manual entry)
    #[arg(long, requires = "length", allow_negative_numbers = true)]
    width: Option<f64>,

    /// Chat model used for the lookup
    #[arg(long, env = "IGDA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "IGDA_API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// API key for the lookup
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

impl From<GeographyArgs> for GeographyRequest {
    fn from(args: GeographyArgs) -> Self {
        Self {
            country: args.country,
            length_km: args.length,
            width_km: args.width,
            lookup: LookupSettings {
                api_key: args.api_key,
                model: args.model,
                api_base: args.api_base,
            },
        }
    }
}

#[derive(Debug, clap::Args)]
struct ReportArgs {
    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_logging(args.verbose);

    let store = JsonFileStore::new(&args.data);
    let mut calculator = Calculator::open(store)
        .with_context(|| format!("failed to open session {}", args.data.display()))?;

    let outcome = run(&mut calculator, args.command).await?;
    if outcome == Outcome::Halted {
        std::process::exit(HALTED_EXIT_CODE);
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

async fn run(calculator: &mut Calculator<JsonFileStore>, command: Command) -> Result<Outcome> {
    match command {
        Command::Geography(args) => stages::geography(calculator, args.into()).await,
        Command::Foods { names } => stages::foods(calculator, &names),
        Command::Tables => stages::tables(calculator),
        Command::Distances { km } => stages::distances(calculator, &km),
        Command::Modes { modes } => {
            let modes: Vec<AcquisitionMode> = modes.into_iter().map(Into::into).collect();
            stages::modes(calculator, &modes)
        }
        Command::Values(report) => {
            let mut output_target = OutputTarget::new(report.output)?;
            stages::values(calculator, report.report, &mut output_target)
        }
        Command::Result(report) => {
            let mut output_target = OutputTarget::new(report.output)?;
            stages::result(calculator, report.report, &mut output_target)
        }
        Command::Status => stages::status(calculator),
    }
}

pub enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    pub fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    pub fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
