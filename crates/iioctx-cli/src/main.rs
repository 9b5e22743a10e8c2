//! iioctx - Load an XML context description and print the resulting model
//!
//! Reads the document from a file, or from stdin when the path is `-`.

mod config;

use anyhow::{Context as _, Result};
use clap::Parser;
use iioctx_core::{Context, ContextBuilder};
use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::config::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "iioctx")]
#[command(about = "Build an instrumentation context from its XML description")]
#[command(version)]
struct Args {
    /// XML context file, or `-` for stdin
    input: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long, default_value = "iioctx.toml")]
    config: PathBuf,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Print warnings collected while building
    #[arg(long)]
    show_warnings: bool,

    /// Disable DOCTYPE validation
    #[arg(long)]
    no_validate: bool,

    /// Write a default configuration file to the config path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;

    let level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_level(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Some(format) = args.format {
        config.output.format = format;
    }
    if args.show_warnings {
        config.output.show_warnings = true;
    }
    if args.no_validate {
        config.parser.validate = false;
    }

    let input = args
        .input
        .context("no input given; pass a context XML file or `-` for stdin")?;

    let mut builder = ContextBuilder::new(config.parser.clone());
    let result = if input.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        info!(bytes = buf.len(), "Read context from stdin");
        builder.load_bytes(&buf)
    } else {
        builder.load_file(&input)
    };
    let ctx = result.with_context(|| format!("failed to create context from {}", input.display()))?;

    if config.output.show_warnings {
        for warning in builder.warnings() {
            eprintln!("warning: {}", warning);
        }
    }

    let rendered = match config.output.format {
        OutputFormat::Text => render_text(&ctx),
        OutputFormat::Json => serde_json::to_string_pretty(&ctx)?,
        OutputFormat::Xml => ctx.to_xml()?,
    };
    println!("{}", rendered);

    Ok(())
}

/// Indented device/channel/attribute listing
fn render_text(ctx: &Context) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Context '{}' with {} devices:", ctx.name(), ctx.devices().len());
    for device in ctx.devices() {
        let _ = write!(out, "  - {}", device.id());
        if let Some(name) = device.name() {
            let _ = write!(out, " ({})", name);
        }
        let _ = writeln!(out);

        for channel in device.channels() {
            let _ = write!(out, "      {} [{}]", channel.id(), channel.direction());
            if let Some(name) = channel.name() {
                let _ = write!(out, " ({})", name);
            }
            let _ = writeln!(out);
            for attr in channel.attrs().iter() {
                let _ = writeln!(out, "          attr: {}", attr);
            }
        }
        for attr in device.attrs().iter() {
            let _ = writeln!(out, "      attr: {}", attr);
        }
    }
    out.truncate(out.trim_end().len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_text() {
        let xml = r#"<context><device id="dev0" name="adc"><channel id="ch0" type="output"><attribute name="frequency"/></channel><attribute name="calibrate"/></device></context>"#;
        let ctx = iioctx_core::create_xml_context_mem(xml.as_bytes()).unwrap();

        let text = render_text(&ctx);
        assert_eq!(
            text,
            "Context 'xml' with 1 devices:\n  \
             - dev0 (adc)\n      \
             ch0 [output]\n          \
             attr: frequency\n      \
             attr: calibrate"
        );
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("nonsense"), Level::INFO);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["iioctx", "-f", "json", "--show-warnings", "ctx.xml"]);
        assert_eq!(args.format, Some(OutputFormat::Json));
        assert!(args.show_warnings);
        assert_eq!(args.input, Some(PathBuf::from("ctx.xml")));
    }
}
