//! Syllabus CLI - expand course schedules into assignment spreadsheets
//!
//! # Main Commands
//!
//! ```bash
//! syllabus expand model.json -o schedule.csv   # Model output JSON to CSV
//! syllabus convert syllabus.txt                # Syllabus text to CSV (AI extraction)
//! syllabus serve                               # Start HTTP server (port 3000)
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! syllabus validate model.json     # Report every validation issue
//! syllabus extract syllabus.txt    # Just run AI extraction, print JSON
//! syllabus schema                  # Print the model output JSON schema
//! ```

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use syllabus::{
    build_spreadsheet_csv, config::parse_timezone, model_output_schema, parse_model_file,
    syllabus_to_spreadsheet, AiClient, ExpandOptions, ModelError, PipelineError, Settings,
    SyllabusExtractor,
};

#[derive(Parser)]
#[command(name = "syllabus")]
#[command(about = "Expand course syllabus schedules into dated assignment spreadsheets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Per-call overrides of the environment settings
#[derive(clap::Args, Clone, Default)]
struct ExpandArgs {
    /// Default timezone when the course info has none (IANA name)
    #[arg(long)]
    tz: Option<String>,

    /// Highest accepted end_week
    #[arg(long)]
    max_week: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand model output JSON into a CSV spreadsheet
    Expand {
        /// Model output JSON file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        expand: ExpandArgs,
    },

    /// Validate model output JSON and list every issue
    Validate {
        /// Model output JSON file
        input: PathBuf,

        #[command(flatten)]
        expand: ExpandArgs,
    },

    /// Extract model output JSON from syllabus text with the AI
    Extract {
        /// Plain-text syllabus file
        input: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Syllabus text to CSV: AI extraction, then expansion
    Convert {
        /// Plain-text syllabus file
        input: PathBuf,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also save the extracted model output JSON
        #[arg(long)]
        save_model: Option<PathBuf>,

        #[command(flatten)]
        expand: ExpandArgs,
    },

    /// Print the model output JSON schema
    Schema {
        #[command(flatten)]
        expand: ExpandArgs,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        #[command(flatten)]
        expand: ExpandArgs,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match Settings::from_env() {
        Ok(settings) => run(cli.command, settings).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        if let Some(PipelineError::Model(ModelError::Validation(v))) =
            e.downcast_ref::<PipelineError>()
        {
            for issue in &v.issues {
                eprintln!("   - {}", issue);
            }
        }
        std::process::exit(1);
    }
}

async fn run(command: Commands, settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Expand {
            input,
            output,
            expand,
        } => cmd_expand(&input, output.as_deref(), &apply(&settings, &expand)?),

        Commands::Validate { input, expand } => cmd_validate(&input, &apply(&settings, &expand)?),

        Commands::Extract { input, output } => {
            cmd_extract(&input, output.as_deref(), &settings).await
        }

        Commands::Convert {
            input,
            output,
            save_model,
            expand,
        } => {
            let mut settings = settings;
            settings.expand = apply(&settings, &expand)?;
            cmd_convert(&input, output.as_deref(), save_model.as_deref(), &settings).await
        }

        Commands::Schema { expand } => cmd_schema(&apply(&settings, &expand)?),

        Commands::Serve { port, expand } => {
            let mut settings = settings;
            settings.expand = apply(&settings, &expand)?;
            syllabus::server::start_server(port, settings).await?;
            Ok(())
        }
    }
}

/// Environment settings with command-line overrides applied
fn apply(settings: &Settings, args: &ExpandArgs) -> Result<ExpandOptions, PipelineError> {
    let mut options = settings.expand;
    if let Some(ref tz) = args.tz {
        options = options.with_timezone(parse_timezone("--tz", tz)?);
    }
    if let Some(max_week) = args.max_week {
        options = options.with_max_week(max_week);
    }
    Ok(options)
}

fn cmd_expand(
    input: &Path,
    output: Option<&Path>,
    options: &ExpandOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Expanding: {}", input.display());

    let text = fs::read_to_string(input)?;
    let out = build_spreadsheet_csv(text, options)?;

    eprintln!("   Course: {}", out.course_info.course_code);
    eprintln!(
        "   Term: {} → {} ({})",
        out.course_info.term_start, out.course_info.term_end, out.timezone
    );
    eprintln!(
        "✅ {} rows ({} recurring, {} one-off)",
        out.rows.len(),
        out.recurring_count(),
        out.one_off_count()
    );

    write_output(&out.csv, output)
}

fn cmd_validate(input: &Path, options: &ExpandOptions) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("✔️  Validating: {}", input.display());

    let model = parse_model_file(input, options)?;
    eprintln!(
        "✅ Valid: {} recurring rule(s), {} one-off item(s)",
        model.output.recurring.len(),
        model.output.one_off.len()
    );
    eprintln!(
        "   Term {} → {} ({})",
        model.term.start, model.term.end, model.term.timezone
    );
    Ok(())
}

async fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("🤖 Extracting schedule from: {}", input.display());

    let text = fs::read_to_string(input)?;
    let client = AiClient::from_settings(settings)?;
    let json = client.extract(&text).await?;

    write_output(&json, output)
}

async fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    save_model: Option<&Path>,
    settings: &Settings,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Converting: {}", input.display());

    let text = fs::read_to_string(input)?;
    let client = AiClient::from_settings(settings)?;
    let result = syllabus_to_spreadsheet(&client, &text, &settings.expand).await?;

    if let Some(path) = save_model {
        fs::write(path, &result.model_output)?;
        eprintln!("   💾 Model output saved to: {}", path.display());
    }

    write_output(&result.spreadsheet.csv, output)
}

fn cmd_schema(options: &ExpandOptions) -> Result<(), Box<dyn std::error::Error>> {
    let schema = model_output_schema(options.max_week);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
