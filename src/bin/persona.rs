//! Persona CLI - Command-line interface for Synheart Persona
//!
//! Commands:
//! - replay: Replay recorded interaction events into a session report
//! - validate: Validate interaction event schema and ordering
//! - rules: Print the trait and insight rule tables
//! - schema: Print input/output schema information
//! - doctor: Diagnose environment and configuration

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use synheart_persona::classifier::{FALLBACK_TRAIT, INSIGHT_RULES, TRAIT_RULES};
use synheart_persona::encoder::{ReportEncoder, REPORT_SCHEMA_VERSION};
use synheart_persona::schema::{InteractionEvent, InteractionEventAdapter, SCHEMA_VERSION};
use synheart_persona::{AnalyzerConfig, AnalyzerError, SessionReplayer, Viewport};
use synheart_persona::{PERSONA_VERSION, PRODUCER_NAME};

/// Persona - On-device interaction telemetry and behavioral trait scoring
#[derive(Parser)]
#[command(name = "persona")]
#[command(author = "Synheart AI Inc")]
#[command(version = PERSONA_VERSION)]
#[command(about = "Score behavioral traits from interaction events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay interaction events through an analyzer and emit a report
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Analyzer configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the analysis tick interval in milliseconds
        #[arg(long)]
        analysis_tick_ms: Option<u64>,

        /// Override the session tick interval in milliseconds
        #[arg(long)]
        session_tick_ms: Option<u64>,

        /// Initial viewport width in pixels
        #[arg(long, default_value = "1920")]
        viewport_width: f64,

        /// Initial viewport height in pixels
        #[arg(long, default_value = "1080")]
        viewport_height: f64,

        /// Keep ticking until this timestamp (epoch ms) after the last event
        #[arg(long)]
        session_end_ms: Option<u64>,
    },

    /// Validate interaction event schema
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the trait and insight rule tables
    Rules {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },

    /// Diagnose environment and configuration
    Doctor {
        /// Check an analyzer configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
    /// One analysis tick per line
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (persona.interaction_event.v1)
    Input,
    /// Output schema (persona.report.v1)
    Output,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), PersonaCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            output_format,
            config,
            analysis_tick_ms,
            session_tick_ms,
            viewport_width,
            viewport_height,
            session_end_ms,
        } => {
            let mut config = match config {
                Some(path) => AnalyzerConfig::from_json(&fs::read_to_string(path)?)?,
                None => AnalyzerConfig::default(),
            };
            if let Some(ms) = analysis_tick_ms {
                config.analysis_tick_ms = ms;
            }
            if let Some(ms) = session_tick_ms {
                config.session_tick_ms = ms;
            }
            config.validate()?;

            let mut replayer = SessionReplayer::new(config)
                .with_viewport(Viewport::new(viewport_width, viewport_height));
            if let Some(end) = session_end_ms {
                replayer = replayer.with_session_end(end);
            }

            cmd_replay(&input, &output, input_format, output_format, &replayer)
        }

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Rules { json } => cmd_rules(json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    output_format: OutputFormat,
    replayer: &SessionReplayer,
) -> Result<(), PersonaCliError> {
    let events = read_events(input, input_format)?;
    if events.is_empty() {
        return Err(PersonaCliError::NoEvents);
    }

    let outcome = replayer.replay(&events)?;

    let output_data = match output_format {
        OutputFormat::Json => {
            let report = ReportEncoder::new().encode(&outcome.analyzer, &outcome.reports);
            serde_json::to_string(&report)? + "\n"
        }
        OutputFormat::JsonPretty => {
            ReportEncoder::new().encode_to_json(&outcome.analyzer, &outcome.reports)? + "\n"
        }
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in &outcome.reports {
                lines.push(serde_json::to_string(report)?);
            }
            lines.join("\n") + "\n"
        }
    };

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_validate(
    input: &Path,
    input_format: InputFormat,
    json: bool,
) -> Result<(), PersonaCliError> {
    let events = read_events(input, input_format)?;
    let results = InteractionEventAdapter::validate_events(&events);

    let report = ValidationReport {
        total_events: events.len(),
        valid_events: events.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_type: r.kind.to_string(),
                error: r.error.to_string(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - {} event (index {}): {}",
                    err.event_type, err.index, err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(PersonaCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_rules(json: bool) -> Result<(), PersonaCliError> {
    if json {
        let payload = serde_json::json!({
            "traits": TRAIT_RULES
                .iter()
                .map(|r| serde_json::json!({ "when": r.condition, "trait": r.label }))
                .collect::<Vec<_>>(),
            "fallback": FALLBACK_TRAIT,
            "insights": INSIGHT_RULES
                .iter()
                .map(|r| serde_json::json!({ "when": r.condition, "insight": r.insight }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Trait rules (all matching rules apply, in order)");
    println!("================================================");
    for rule in TRAIT_RULES {
        println!(
            "  {:<36} -> {} ({})",
            rule.condition,
            rule.label.name,
            rule.label.style.as_str()
        );
    }
    println!(
        "  {:<36} -> {} ({})",
        "(no match)",
        FALLBACK_TRAIT.name,
        FALLBACK_TRAIT.style.as_str()
    );
    println!();
    println!("Insight rules (first match wins)");
    println!("================================");
    for rule in INSIGHT_RULES {
        println!("  {:<36} -> {}", rule.condition, rule.insight.text);
    }

    Ok(())
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), PersonaCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("Each event carries timestamp_ms (epoch milliseconds) and a type:");
                println!();
                println!("1. pointer_move - {{ x, y }} in pixels; gated at 50 ms");
                println!("2. click        - {{ x, y, pressure? }} with pressure in [0, 1]");
                println!("3. scroll       - {{ offset }} vertical scroll offset in pixels");
                println!("4. key_press    - {{ key }} non-empty key name");
                println!("5. resize       - {{ width, height }} new viewport size");
                println!();
                println!("Events must be in non-decreasing timestamp order.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", REPORT_SCHEMA_VERSION);
                println!();
                println!("- producer: {{ name, version, instance_id }}");
                println!("- session: {{ session_id, started_at_utc, computed_at_utc, duration_sec }}");
                println!("- buffer_summary: sample counts per buffer");
                println!("- analyses: one entry per analysis tick containing:");
                println!("  - metrics: {{ avg_speed, click_frequency_per_minute, scroll_intensity,");
                println!("               movement_consistency, decision_speed }}");
                println!("  - traits, insight, scroll_pattern, progress");
                println!("- latest: the most recent analysis");
                println!("- display: metric texts, traits, insight, timeline, heatmap");
            }
        }
    }

    Ok(())
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), PersonaCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "persona_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Persona version {}", PERSONA_VERSION),
    });

    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}", SCHEMA_VERSION),
    });

    if let Some(config_path) = config {
        let check = if !config_path.exists() {
            DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            }
        } else {
            match fs::read_to_string(config_path) {
                Ok(content) => match AnalyzerConfig::from_json(&content) {
                    Ok(config) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Config valid (analysis every {} ms, heatmap capacity {})",
                            config.analysis_tick_ms, config.heatmap_capacity
                        ),
                    },
                    Err(e) => DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                },
                Err(e) => DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                },
            }
        };
        checks.push(check);
    }

    let stdin_message = if atty::is(atty::Stream::Stdin) {
        "stdin is a TTY (interactive mode)"
    } else {
        "stdin is a pipe (ready for `replay -i -`)"
    };
    checks.push(DoctorCheck {
        name: "stdin".to_string(),
        status: CheckStatus::Ok,
        message: stdin_message.to_string(),
    });

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PERSONA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Persona Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PersonaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn read_events(
    input: &Path,
    input_format: InputFormat,
) -> Result<Vec<InteractionEvent>, PersonaCliError> {
    let input_data = if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    let events = match input_format {
        InputFormat::Ndjson => InteractionEventAdapter::parse_ndjson(&input_data)?,
        InputFormat::Json => InteractionEventAdapter::parse_array(&input_data)?,
    };
    Ok(events)
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/persona.interaction_event.v1.json",
        "title": SCHEMA_VERSION,
        "description": "Synheart Persona interaction event schema",
        "type": "object",
        "required": ["timestamp_ms", "type"],
        "properties": {
            "schema_version": { "type": "string", "const": SCHEMA_VERSION },
            "timestamp_ms": { "type": "integer", "minimum": 0 },
            "type": {
                "type": "string",
                "enum": ["pointer_move", "click", "scroll", "key_press", "resize"]
            },
            "x": { "type": "number" },
            "y": { "type": "number" },
            "pressure": { "type": "number", "minimum": 0, "maximum": 1 },
            "offset": { "type": "number" },
            "key": { "type": "string", "minLength": 1 },
            "width": { "type": "number", "exclusiveMinimum": 0 },
            "height": { "type": "number", "exclusiveMinimum": 0 }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://synheart.ai/schemas/persona.report.v1.json",
        "title": REPORT_SCHEMA_VERSION,
        "description": "Synheart Persona session report schema",
        "type": "object",
        "required": ["schema_version", "producer", "session", "buffer_summary", "analyses", "display"],
        "properties": {
            "schema_version": { "type": "string", "const": REPORT_SCHEMA_VERSION },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "session": {
                "type": "object",
                "properties": {
                    "session_id": { "type": "string" },
                    "started_at_utc": { "type": ["string", "null"] },
                    "computed_at_utc": { "type": "string" },
                    "duration_sec": { "type": "number" }
                }
            },
            "buffer_summary": { "type": "object" },
            "analyses": { "type": "array", "items": { "type": "object" } },
            "latest": { "type": ["object", "null"] },
            "display": { "type": "object" }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum PersonaCliError {
    Io(io::Error),
    Analyzer(AnalyzerError),
    Json(serde_json::Error),
    NoEvents,
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for PersonaCliError {
    fn from(e: io::Error) -> Self {
        PersonaCliError::Io(e)
    }
}

impl From<AnalyzerError> for PersonaCliError {
    fn from(e: AnalyzerError) -> Self {
        PersonaCliError::Analyzer(e)
    }
}

impl From<serde_json::Error> for PersonaCliError {
    fn from(e: serde_json::Error) -> Self {
        PersonaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PersonaCliError> for CliError {
    fn from(e: PersonaCliError) -> Self {
        match e {
            PersonaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PersonaCliError::Analyzer(e) => {
                let (code, hint) = match &e {
                    AnalyzerError::Validation(_) => {
                        ("VALIDATION_ERROR", "Run 'persona validate' for details")
                    }
                    AnalyzerError::InvalidConfig(_) => {
                        ("CONFIG_ERROR", "Run 'persona doctor --config <file>'")
                    }
                    AnalyzerError::SessionTooLong { .. } => (
                        "SESSION_TOO_LONG",
                        "Check for mixed relative and epoch timestamps, or raise max_session_ms",
                    ),
                    AnalyzerError::InvalidViewport { .. } => {
                        ("VIEWPORT_ERROR", "Viewport width and height must be positive")
                    }
                    _ => (
                        "PARSE_ERROR",
                        "Ensure input matches persona.interaction_event.v1 schema",
                    ),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PersonaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PersonaCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            PersonaCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            PersonaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_type: String,
    error: String,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
