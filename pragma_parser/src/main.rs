use pragma_parser::config::runtime::RuntimeConfig;
use pragma_parser::logging::{self, service, LoggingService};
use pragma_parser::pipeline::{self, PipelineStats, PragmaReport};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Default)]
struct CliOptions {
    files: Vec<PathBuf>,
    json: bool,
    strict_schedule: bool,
    log_file: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <source.c>... [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1..].iter().any(|arg| arg == "--help") {
        print_help(&args[0]);
        return Ok(());
    }

    let options = parse_options(&args[1..]);
    if options.files.is_empty() {
        eprintln!("Error: no input files");
        std::process::exit(1);
    }

    let mut config = match &options.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };
    if options.strict_schedule {
        config.parser.strict_schedule_modifiers = true;
    }

    init_logging(&config, options.log_file.as_deref())?;
    pipeline::validate_pipeline()?;

    let mut stats = PipelineStats::default();
    let mut reports: Vec<PragmaReport> = Vec::new();

    for file in &options.files {
        match pipeline::process_file(file, &config) {
            Ok(report) => {
                stats.record(&report);
                if !options.json {
                    print!("{}", report.render_text());
                }
                reports.push(report);
            }
            Err(error) => {
                stats.record_failure();
                eprintln!("error[{}]: {}: {}", error.error_code(), file.display(), error);
            }
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else if options.files.len() > 1 {
        println!("{}", stats.summary());
    }

    if stats.sources_failed > 0 || stats.sources_with_errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(
    config: &RuntimeConfig,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    logging::config::init_runtime_preferences(config.logging.clone())?;

    let min_level = logging::config::get_min_log_level();
    let multi_logger = service::create_configured_multi_logger(log_file)?;
    let logging_service = LoggingService::new(Arc::new(multi_logger), min_level);
    logging::init_global_logging_with_service(Arc::new(logging_service))?;
    Ok(())
}

fn parse_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--json" => options.json = true,
            "--strict-schedule" => options.strict_schedule = true,
            "--log-file" | "--config" => {
                if i + 1 < args.len() {
                    let path = PathBuf::from(&args[i + 1]);
                    if args[i] == "--log-file" {
                        options.log_file = Some(path);
                    } else {
                        options.config = Some(path);
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: {} requires a path", args[i]);
                }
            }
            other if other.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
            file => options.files.push(PathBuf::from(file)),
        }
        i += 1;
    }

    options
}

fn print_help(program_name: &str) {
    println!("pragma_parser v{}", env!("CARGO_PKG_VERSION"));
    println!("Parses #pragma omp directives and reports their clauses and diagnostics");
    println!();
    println!("USAGE:");
    println!("    {} <source.c>... [options]", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --json              Print reports as JSON");
    println!("    --strict-schedule   Warn about unrecognised schedule modifiers");
    println!("    --log-file PATH     Also write log events to PATH");
    println!("    --config PATH       Load runtime preferences from a TOML file");
    println!();
    println!("EXIT STATUS:");
    println!("    0 when every source parsed without errors, 1 otherwise");
    println!();
    println!("BUILD:");
    println!("    {}", pragma_parser::config::build_info::source_info());
}
