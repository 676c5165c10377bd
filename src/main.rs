//! dm3 - Inspect GATAN DigitalMicrograph DM3 files.
//!
//! This binary prints metadata, dumps the tag tree and checks that a file's
//! image data can be decoded.

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dm3_reader::{
    config::{CheckConfig, Cli, Command, InfoConfig, OutputFormat, ReaderArgs, TagsConfig},
    AxisCalibration, DataType, Dm3Document,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.into_command() {
        Command::Info(config) => run_info(config),
        Command::Tags(config) => run_tags(config),
        Command::Check(config) => run_check(config),
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "dm3=debug,dm3_reader=debug"
    } else {
        "dm3=info,dm3_reader=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Parse the file named by `reader`, logging any failure.
fn open_document(reader: &ReaderArgs) -> Option<Dm3Document> {
    match Dm3Document::open_with(&reader.path, reader.parse_options()) {
        Ok(doc) => {
            debug!(
                "Opened {} ({} tags)",
                reader.path.display(),
                doc.tags().len()
            );
            Some(doc)
        }
        Err(e) => {
            error!("Failed to parse {}: {}", reader.path.display(), e);
            None
        }
    }
}

// =============================================================================
// Info Command
// =============================================================================

fn run_info(config: InfoConfig) -> ExitCode {
    init_logging(config.reader.verbose);

    if let Err(e) = config.reader.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(mut doc) = open_document(&config.reader) else {
        return ExitCode::FAILURE;
    };

    let info = doc.info();
    let code = doc.data_type_code();
    let type_name = doc.data_type().map(DataType::name);
    let layout = doc.image_layout();
    let shape = layout.as_ref().ok().map(|layout| layout.shape());
    let axes = shape.as_ref().map_or(1, Vec::len);
    let calibrations: Vec<Option<AxisCalibration>> =
        (0..axes).map(|axis| doc.axis_units(axis).ok()).collect();
    let brightness = doc.brightness_units().ok();
    let cuts = doc.cuts();

    match config.format {
        OutputFormat::Text => {
            println!("File: {}", doc.identifier());
            println!();
            if info.is_empty() {
                println!("  (no acquisition metadata)");
            }
            for (key, value) in info.iter() {
                println!("  {:<10} {}", format!("{}:", key), value);
            }
            println!();

            match type_name {
                Some(name) => println!("Data type:  {} ({})", name, code),
                None => println!("Data type:  {}", code),
            }
            match (&shape, &layout) {
                (Some(shape), _) => println!("Shape:      {:?}", shape),
                (None, Err(e)) => println!("Shape:      unavailable ({})", e),
                (None, Ok(_)) => {}
            }
            for (axis, calibration) in calibrations.iter().enumerate() {
                match calibration {
                    Some(cal) => println!(
                        "Axis {}:     scale {} {}, origin {}",
                        axis, cal.scale, cal.unit, cal.origin
                    ),
                    None => println!("Axis {}:     uncalibrated", axis),
                }
            }
            if let Some(ref units) = brightness {
                println!("Intensity:  {}", units);
            }
            match cuts {
                Ok(cuts) => println!("Contrast:   {} .. {}", cuts.low, cuts.high),
                Err(ref e) => println!("Contrast:   unavailable ({})", e),
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "file": doc.identifier(),
                "info": info,
                "data_type": {
                    "code": code,
                    "name": type_name,
                },
                "shape": shape,
                "calibrations": calibrations,
                "brightness_units": brightness,
                "cuts": cuts.as_ref().ok(),
            });
            match serde_json::to_string_pretty(&json) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    error!("Failed to serialize report: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Tags Command
// =============================================================================

fn run_tags(config: TagsConfig) -> ExitCode {
    init_logging(config.reader.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(doc) = open_document(&config.reader) else {
        return ExitCode::FAILURE;
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let result = match config.prefix {
        Some(ref prefix) => doc
            .tags()
            .records_with_prefix(prefix)
            .try_for_each(|(key, value)| writeln!(out, "{} = {}", key, value)),
        None => doc.write_tag_dump(&mut out),
    };

    match result.and_then(|_| out.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            error!("Failed to write tags: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn run_check(config: CheckConfig) -> ExitCode {
    // Only log when asked to; the report goes to stdout
    if config.reader.verbose {
        init_logging(true);
    }

    println!("DM3 File Check");
    println!("══════════════");
    println!();

    if let Err(e) = config.reader.validate() {
        println!("✗ Configuration: {}", e);
        return ExitCode::FAILURE;
    }

    let mut doc = match Dm3Document::open_with(&config.reader.path, config.reader.parse_options())
    {
        Ok(doc) => {
            println!(
                "✓ Parsed {} (version {}, {} tags)",
                doc.identifier(),
                doc.header().version,
                doc.tags().len()
            );
            doc
        }
        Err(e) => {
            println!("✗ Parse failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut ok = true;

    match doc.image() {
        Ok(image) => println!(
            "✓ Image: {} {:?} ({})",
            image.data_type.name(),
            image.shape(),
            image.data.element_name()
        ),
        Err(e) => {
            println!("✗ Image: {}", e);
            ok = false;
        }
    }

    if config.thumbnail {
        match doc.thumbnail() {
            Ok(thumbnail) => println!("✓ Thumbnail: {:?}", thumbnail.dim()),
            Err(e) => {
                println!("✗ Thumbnail: {}", e);
                ok = false;
            }
        }
    }

    println!();
    if ok {
        println!("All checks passed");
        ExitCode::SUCCESS
    } else {
        println!("Some checks failed");
        ExitCode::FAILURE
    }
}
