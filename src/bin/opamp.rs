//! Interactive command-line runner.
//!
//! The API key is asked for (hidden) when none is configured. Anything not
//! given as a flag is asked for on stdin: the context, both opinions, and
//! the output style. After the report is shown the synthesis
//! can be restyled any number of times before optionally saving.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use opamp::cli::{self, Cli};
use opamp::report::{self, RunReport, StyledOutput};
use opamp::utilities::file_handler::FileHandler;
use opamp::utilities::printer::{Printer, PrinterColor};
use opamp::{OpenAICompletion, PipelineOrchestrator, StyleCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,opamp=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();
    let printer = if args.no_color { Printer::plain() } else { Printer::new() };
    let mut config = args.load_config().context("loading configuration")?;

    if args.list_styles {
        let catalog = match &config.style_catalog {
            Some(path) => StyleCatalog::from_yaml_file(path)?,
            None => StyleCatalog::builtin(),
        };
        for item in catalog.menu() {
            println!("{}. {}", item.number, item.label);
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    printer.print("**Conceptual OpAmp Difference Engine**", PrinterColor::BoldWhite);
    println!("{}", "=".repeat(50));

    if cli::needs_api_key(&config, |key| std::env::var(key).ok()) {
        config.api_key = Some(cli::prompt_api_key(&mut out)?);
    }

    let llm = Arc::new(OpenAICompletion::from_config(&config)?);
    let orchestrator = PipelineOrchestrator::from_config(llm, &config)?;
    let catalog = orchestrator.catalog();

    let context = match &args.context {
        Some(c) => c.clone(),
        None => {
            print!("\nEnter the discussion context/topic (e.g., 'climate change policy'): ");
            out.flush()?;
            cli::read_line(&mut input)?.unwrap_or_default()
        }
    };
    let context = config.resolve_context(Some(&context));

    let opinion_positive = match &args.opinion_positive {
        Some(o) => o.clone(),
        None => {
            printer.print("\nFirst Opinion (Positive Input)", PrinterColor::Green);
            println!("Enter the first opinion (press Enter twice when done):");
            cli::read_opinion(&mut input)?
        }
    };
    if opinion_positive.trim().is_empty() {
        bail!("First opinion cannot be empty");
    }

    let opinion_negative = match &args.opinion_negative {
        Some(o) => o.clone(),
        None => {
            printer.print("\nSecond Opinion (Negative Input)", PrinterColor::Green);
            println!("Enter the second opinion (press Enter twice when done):");
            cli::read_opinion(&mut input)?
        }
    };
    if opinion_negative.trim().is_empty() {
        bail!("Second opinion cannot be empty");
    }

    let style = match args.requested_style(catalog)? {
        Some(style) => style,
        None => cli::prompt_style(&mut input, &mut out, catalog)?,
    };
    let also = args.additional_styles(catalog)?;

    printer.print(
        &format!("\nProcessing opinions with context '{}'...", context),
        PrinterColor::Cyan,
    );
    let result = orchestrator
        .run(&opinion_positive, &opinion_negative, &context, style)
        .await?;

    let mut run_report = RunReport::new(result);
    report::print_report(&printer, &run_report);

    for style in also {
        let text = orchestrator.reformat_only(&run_report.result, &style).await?;
        report::print_output(&printer, &StyledOutput { style: style.clone(), text: text.clone() });
        run_report.push(style, text);
    }

    // Non-interactive when everything came from flags.
    let interactive = args.opinion_positive.is_none() || args.opinion_negative.is_none();
    if interactive {
        while cli::confirm(&mut input, &mut out, "\nWould you like the output in a different format?")? {
            let style = cli::prompt_style(&mut input, &mut out, catalog)?;
            let text = orchestrator.reformat_only(&run_report.result, &style).await?;
            report::print_output(&printer, &StyledOutput { style: style.clone(), text: text.clone() });
            run_report.push(style, text);
        }
    }

    let save_to = match &args.save {
        Some(path) => Some(path.clone()),
        None if interactive => {
            if cli::confirm(&mut input, &mut out, "\nSave these results to a file?")? {
                print!("Enter filename (without extension, default {}): ", cli::DEFAULT_SAVE_STEM);
                out.flush()?;
                Some(PathBuf::from(cli::save_stem(cli::read_line(&mut input)?)))
            } else {
                None
            }
        }
        None => None,
    };

    if let Some(path) = save_to {
        let directory = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let stem = path
            .file_name()
            .and_then(|n| n.to_str())
            .context("save path has no file name")?;
        let written = run_report.save(&FileHandler::new(directory), stem, args.json)?;
        for file in written {
            printer.print(&format!("Results saved to {}", file.display()), PrinterColor::BoldGreen);
        }
    }

    Ok(())
}
