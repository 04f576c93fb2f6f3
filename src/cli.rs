//! The command line interface for the calculator.
use crate::calculator::{
    CalculatorInputs, CalculatorOutputs, InputsUpdate, compute, solved_irr_percent,
};
use crate::format::{
    NumberLocale, format_millions, format_money, format_payback, format_percent,
};
use crate::input::read_csv;
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{ResultsWriter, create_output_directory, get_output_dir};
use crate::parameters::CalculatorParameters;
use crate::scenario::preset_inputs;
use crate::settings::Settings;
use crate::simulator::Simulator;
use crate::units::{Area, UnitValue};
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the calculator.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Values for the scenario inputs. Any which are omitted keep their defaults.
#[derive(Args, Default)]
pub struct InputOpts {
    /// Number of land parcels
    #[arg(short, long)]
    pub parcels: Option<u32>,
    /// Reference units per square metre per month
    #[arg(short, long)]
    pub unit_value: Option<f64>,
    /// Average area per parcel in square metres
    #[arg(short, long)]
    pub area: Option<f64>,
    /// Annual discount rate in percent
    #[arg(short, long)]
    pub discount_rate: Option<f64>,
}

impl From<&InputOpts> for InputsUpdate {
    fn from(opts: &InputOpts) -> Self {
        Self {
            parcel_count: opts.parcels,
            unit_value: opts.unit_value.map(UnitValue),
            average_area: opts.area.map(Area),
            discount_rate_percent: opts.discount_rate,
        }
    }
}

/// Options shared by commands which display results
#[derive(Args, Default)]
pub struct DisplayOpts {
    /// TOML file overriding the calculator parameters
    #[arg(long)]
    pub parameters: Option<PathBuf>,
    /// How to display numbers (overrides the settings file)
    #[arg(long, value_enum)]
    pub locale: Option<NumberLocale>,
}

/// Options for the batch command
#[derive(Args, Default)]
pub struct BatchOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// TOML file overriding the calculator parameters
    #[arg(long)]
    pub parameters: Option<PathBuf>,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Compute the financial indicators for a single scenario.
    Compute {
        /// Scenario inputs
        #[command(flatten)]
        inputs: InputOpts,
        /// Display options
        #[command(flatten)]
        display: DisplayOpts,
    },
    /// Compare the preset scenarios with the calculator's results.
    Scenarios {
        /// Display options
        #[command(flatten)]
        display: DisplayOpts,
    },
    /// Compute every scenario in a CSV file and save the results.
    Batch {
        /// Path to the scenarios CSV file.
        scenarios_path: PathBuf,
        /// Other batch options
        #[command(flatten)]
        opts: BatchOpts,
    },
    /// Check that every scenario in a CSV file is valid.
    Validate {
        /// Path to the scenarios CSV file.
        scenarios_path: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Compute { inputs, display } => handle_compute_command(&inputs, &display, None),
            Self::Scenarios { display } => handle_scenarios_command(&display, None),
            Self::Batch {
                scenarios_path,
                opts,
            } => handle_batch_command(&scenarios_path, &opts, None),
            Self::Validate { scenarios_path } => handle_validate_command(&scenarios_path, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and start parcelsim
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ parcelsim --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    if let Some(settings) = settings {
        Ok(settings)
    } else {
        Settings::load().context("Failed to load settings.")
    }
}

/// Render the outputs for a scenario as lines of text
pub fn format_report(
    inputs: &CalculatorInputs,
    outputs: &CalculatorOutputs,
    solved_irr: Option<f64>,
    locale: NumberLocale,
) -> Vec<String> {
    let money = |value: f64| format_money(value, locale);
    vec![
        format!("Parcels:                  {}", inputs.parcel_count),
        format!("Unit value:               {}", inputs.unit_value),
        format!("Average area (m2):        {}", inputs.average_area),
        format!(
            "Discount rate:            {}",
            format_percent(inputs.discount_rate_percent, locale)
        ),
        format!(
            "Monthly gross income:     {}",
            money(outputs.monthly_gross_income.value())
        ),
        format!(
            "Monthly operator profit:  {}",
            money(outputs.monthly_operator_profit.value())
        ),
        format!(
            "Monthly investor profit:  {}",
            money(outputs.monthly_investor_profit.value())
        ),
        format!(
            "Monthly net flow:         {}",
            money(outputs.monthly_net_flow.value())
        ),
        format!(
            "Investment:               {}",
            money(outputs.adjusted_investment.value())
        ),
        format!(
            "NPV:                      {}",
            format_millions(outputs.net_present_value_millions, locale)
        ),
        format!(
            "IRR:                      {}",
            format_percent(outputs.internal_rate_of_return_percent, locale)
        ),
        format!(
            "Solved IRR (cash flows):  {}",
            solved_irr.map_or_else(|| "-".into(), |irr| format_percent(irr, locale))
        ),
        format!(
            "Payback:                  {}",
            format_payback(outputs.payback, locale)
        ),
    ]
}

/// Handle the `compute` command.
pub fn handle_compute_command(
    input_opts: &InputOpts,
    display_opts: &DisplayOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let params = CalculatorParameters::load(display_opts.parameters.as_deref())
        .context("Failed to load calculator parameters.")?;
    let locale = display_opts.locale.unwrap_or(settings.locale);

    let mut simulator = Simulator::new(params)?;
    simulator.apply(&input_opts.into())?;

    let inputs = simulator.inputs();
    let outputs = simulator.outputs();
    let solved_irr = solved_irr_percent(inputs, simulator.parameters())?;
    for line in format_report(inputs, outputs, solved_irr, locale) {
        println!("{line}");
    }

    Ok(())
}

/// Handle the `scenarios` command.
pub fn handle_scenarios_command(
    display_opts: &DisplayOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let params = CalculatorParameters::load(display_opts.parameters.as_deref())
        .context("Failed to load calculator parameters.")?;
    let locale = display_opts.locale.unwrap_or(settings.locale);

    println!(
        "{:>8} | {:>12} {:>6} {:>10} | {:>12} {:>6} {:>16}",
        "Parcels", "NPV", "IRR", "Payback", "NPV (calc)", "IRR", "Payback"
    );
    for (row, inputs) in preset_inputs() {
        let outputs = compute(&inputs, &params)?;
        println!(
            "{:>8} | {:>12} {:>6} {:>10} | {:>12} {:>6} {:>16}",
            row.parcel_count,
            row.npv_label,
            row.irr_label,
            row.payback_label,
            format_millions(outputs.net_present_value_millions, locale),
            format_percent(outputs.internal_rate_of_return_percent, locale),
            format_payback(outputs.payback, locale),
        );
    }

    Ok(())
}

/// Read scenarios from file and compute each of them.
///
/// Fails if any scenario is invalid, naming the offending row.
fn compute_scenarios(
    scenarios_path: &Path,
    params: &CalculatorParameters,
) -> Result<Vec<(CalculatorInputs, CalculatorOutputs)>> {
    let scenarios: Vec<CalculatorInputs> = read_csv(scenarios_path)?;

    scenarios
        .into_iter()
        .enumerate()
        .map(|(idx, inputs)| {
            let outputs = compute(&inputs, params)
                .with_context(|| format!("Invalid scenario on row {}", idx + 1))?;
            Ok((inputs, outputs))
        })
        .collect()
}

/// Handle the `batch` command.
pub fn handle_batch_command(
    scenarios_path: &Path,
    opts: &BatchOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;

    // Get path to output folder
    let pathbuf: PathBuf;
    let output_path = if let Some(p) = opts.output_dir.as_deref() {
        p
    } else {
        pathbuf = get_output_dir(scenarios_path)?;
        &pathbuf
    };

    let overwrite = create_output_directory(output_path, opts.overwrite).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_path.display()
        )
    })?;

    // Initialise program logger
    log::init(&settings.log_level, Some(output_path)).context("Failed to initialise logging.")?;
    info!("Output folder: {}", output_path.display());

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }

    let params = CalculatorParameters::load(opts.parameters.as_deref())
        .context("Failed to load calculator parameters.")?;
    let results = compute_scenarios(scenarios_path, &params)
        .context("Failed to compute scenarios.")?;
    info!(
        "Computed {} scenarios from {}",
        results.len(),
        scenarios_path.display()
    );

    let mut writer = ResultsWriter::create(output_path)?;
    for (inputs, outputs) in &results {
        if outputs.payback.months().is_none() {
            warn!(
                "Payback is not achievable for {} parcels: net monthly flow is not positive",
                inputs.parcel_count
            );
        }
        writer.write(inputs, outputs)?;
    }
    writer.flush()?;

    write_metadata(
        output_path,
        scenarios_path,
        opts.parameters.as_deref(),
        &params,
    )
    .context("Failed to save metadata.")?;
    info!("Batch complete!");

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(scenarios_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(&settings.log_level, None).context("Failed to initialise logging.")?;

    let count = validate_scenarios(scenarios_path).context("Failed to validate scenarios.")?;
    info!("Validated {count} scenarios successfully!");

    Ok(())
}

/// Check every row of a scenarios file, returning how many there were
fn validate_scenarios(scenarios_path: &Path) -> Result<usize> {
    let scenarios: Vec<CalculatorInputs> = read_csv(scenarios_path)?;
    for (idx, inputs) in scenarios.iter().enumerate() {
        inputs
            .validate()
            .with_context(|| format!("Invalid scenario on row {}", idx + 1))?;
    }

    Ok(scenarios.len())
}
