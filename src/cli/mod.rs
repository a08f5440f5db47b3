//! Command-line interface for the `opamp` binary.
//!
//! Argument parsing plus the interactive prompts used when opinions or the
//! output style are not given on the command line. The prompts read from any
//! `BufRead` so they can be driven from tests.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::styles::{OutputStyle, StyleCatalog};
use crate::utilities::config::OpAmpConfig;
use crate::utilities::errors::{OpAmpError, Result};

#[derive(Parser, Debug)]
#[command(name = "opamp")]
#[command(about = "Contrast two opinions through ethos, logos and energeia deltas", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Discussion context or topic
    #[arg(short, long)]
    pub context: Option<String>,

    /// First opinion, treated as the positive input
    #[arg(long = "positive", visible_alias = "opinion1")]
    pub opinion_positive: Option<String>,

    /// Second opinion, treated as the negative input
    #[arg(long = "negative", visible_alias = "opinion2")]
    pub opinion_negative: Option<String>,

    /// Output style by name; "custom:<label>" for a free-form style
    #[arg(short, long, conflicts_with_all = ["menu", "custom"])]
    pub style: Option<String>,

    /// Output style by menu number
    #[arg(long)]
    pub menu: Option<usize>,

    /// Free-form output style label
    #[arg(long)]
    pub custom: Option<String>,

    /// Further styles to reformat the same synthesis into
    #[arg(long = "also", value_delimiter = ',')]
    pub also: Vec<String>,

    /// Save the report to <PATH>.txt
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Also save the report as <PATH>.json
    #[arg(long, requires = "save")]
    pub json: bool,

    /// YAML configuration file
    #[arg(long, env = "OPAMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// YAML style catalog replacing the built-in one
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Print the style menu and exit
    #[arg(long)]
    pub list_styles: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Configuration from `--config` (or defaults), environment overrides,
    /// then `--catalog`.
    pub fn load_config(&self) -> Result<OpAmpConfig> {
        let config = match &self.config {
            Some(path) => OpAmpConfig::from_yaml_file(path)?,
            None => OpAmpConfig::default(),
        };
        let mut config = config.with_env_overrides()?;
        if let Some(catalog) = &self.catalog {
            config.style_catalog = Some(catalog.clone());
        }
        Ok(config)
    }

    /// The style requested by flags, if any.
    pub fn requested_style(&self, catalog: &StyleCatalog) -> Result<Option<OutputStyle>> {
        if let Some(number) = self.menu {
            return catalog.select(number, self.custom.as_deref()).map(Some);
        }
        if let Some(label) = &self.custom {
            return Ok(Some(OutputStyle::custom(label.trim())));
        }
        Ok(self.style.as_deref().map(OutputStyle::parse))
    }

    /// Styles for re-entrant reformatting, validated against `catalog`.
    pub fn additional_styles(&self, catalog: &StyleCatalog) -> Result<Vec<OutputStyle>> {
        self.also
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| {
                let style = OutputStyle::parse(s.trim());
                catalog.validate(&style)?;
                Ok(style)
            })
            .collect()
    }
}

/// Environment variable the provider falls back to for its key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// File stem used when the user asks to save but gives no name.
pub const DEFAULT_SAVE_STEM: &str = "opamp_results";

fn io_error(e: io::Error) -> OpAmpError {
    OpAmpError::io("cannot read input", e)
}

/// Whether the key has to be asked for: none in the configuration and
/// `lookup(API_KEY_ENV)` unset or blank.
pub fn needs_api_key(config: &OpAmpConfig, lookup: impl Fn(&str) -> Option<String>) -> bool {
    let configured = config.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    !configured && lookup(API_KEY_ENV).map_or(true, |k| k.trim().is_empty())
}

/// The trimmed key; a blank one is rejected.
pub fn validate_api_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        return Err(OpAmpError::EmptyInput { field: "API key" });
    }
    Ok(key.to_string())
}

/// Ask for the API key on the terminal without echoing it.
pub fn prompt_api_key<W: Write>(output: &mut W) -> Result<String> {
    emit(output, "Enter your OpenAI API key: ")?;
    let key = rpassword::read_password().map_err(io_error)?;
    validate_api_key(&key)
}

/// The stem to save under given the answer to the filename prompt.
pub fn save_stem(answer: Option<String>) -> String {
    answer
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_SAVE_STEM.to_string())
}

/// Read one trimmed line. `None` at end of input.
pub fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(io_error)?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Read a possibly multi-line opinion.
///
/// Leading blank lines are skipped; the first blank line after some text,
/// or end of input, terminates.
pub fn read_opinion<R: BufRead>(input: &mut R) -> Result<String> {
    let mut lines: Vec<String> = Vec::new();
    loop {
        let mut line = String::new();
        if input.read_line(&mut line).map_err(io_error)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            if lines.is_empty() {
                continue;
            }
            break;
        }
        lines.push(line.to_string());
    }
    Ok(lines.join("\n").trim().to_string())
}

fn emit<W: Write>(output: &mut W, text: &str) -> Result<()> {
    write!(output, "{}", text).and_then(|_| output.flush()).map_err(io_error)
}

/// Show the numbered menu and read a choice, re-asking on invalid input.
pub fn prompt_style<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    catalog: &StyleCatalog,
) -> Result<OutputStyle> {
    emit(output, "Select desired output format:\n")?;
    for item in catalog.menu() {
        emit(output, &format!("{}. {}\n", item.number, item.label))?;
    }

    loop {
        emit(output, "Enter the number corresponding to the output type: ")?;
        let Some(answer) = read_line(input)? else {
            return Err(OpAmpError::EmptyInput { field: "output style" });
        };
        let Ok(number) = answer.parse::<usize>() else {
            emit(output, "Invalid input. Try again.\n")?;
            continue;
        };

        let custom = if number == catalog.len() + 1 {
            emit(output, "Enter your custom output type/format: ")?;
            read_line(input)?
        } else {
            None
        };

        match catalog.select(number, custom.as_deref()) {
            Ok(style) => return Ok(style),
            Err(e) => emit(output, &format!("{}. Try again.\n", e))?,
        }
    }
}

/// Ask a yes/no question; anything but `y`/`yes` is no.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    write!(output, "{} (y/n): ", question)
        .and_then(|_| output.flush())
        .map_err(io_error)?;
    Ok(matches!(
        read_line(input)?.map(|a| a.to_ascii_lowercase()).as_deref(),
        Some("y") | Some("yes")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("opamp").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_full_invocation() {
        let cli = parse(&[
            "--context",
            "environmental policy",
            "--positive",
            "Ban plastic now",
            "--negative",
            "Phase plastic out",
            "--style",
            "Press Release",
            "--also",
            "Legal Statement,custom:Haiku",
            "--save",
            "out/plastic",
            "--json",
        ]);
        assert_eq!(cli.context.as_deref(), Some("environmental policy"));
        assert_eq!(cli.opinion_positive.as_deref(), Some("Ban plastic now"));
        assert_eq!(cli.also, vec!["Legal Statement", "custom:Haiku"]);
        assert!(cli.json);

        let catalog = StyleCatalog::builtin();
        assert_eq!(
            cli.requested_style(&catalog).unwrap(),
            Some(OutputStyle::named("Press Release"))
        );
        assert_eq!(
            cli.additional_styles(&catalog).unwrap(),
            vec![OutputStyle::named("Legal Statement"), OutputStyle::custom("Haiku")]
        );
    }

    #[test]
    fn test_json_requires_save() {
        assert!(Cli::try_parse_from(["opamp", "--json"]).is_err());
    }

    #[test]
    fn test_style_conflicts_with_menu() {
        assert!(Cli::try_parse_from(["opamp", "--style", "Press Release", "--menu", "2"]).is_err());
    }

    #[test]
    fn test_menu_number_with_custom_label() {
        let catalog = StyleCatalog::builtin();
        let cli = parse(&["--menu", "11", "--custom", "Haiku"]);
        assert_eq!(cli.requested_style(&catalog).unwrap(), Some(OutputStyle::custom("Haiku")));

        let cli = parse(&["--menu", "2"]);
        assert_eq!(
            cli.requested_style(&catalog).unwrap(),
            Some(OutputStyle::named("Advertising Copy"))
        );

        assert!(parse(&[]).requested_style(&catalog).unwrap().is_none());
    }

    #[test]
    fn test_unknown_additional_style_is_rejected() {
        let cli = parse(&["--also", "Limerick"]);
        let err = cli.additional_styles(&StyleCatalog::builtin()).unwrap_err();
        assert!(matches!(err, OpAmpError::UnknownStyle { .. }));
    }

    #[test]
    fn test_read_opinion_stops_at_blank_line() {
        let mut input = Cursor::new("\n\nWe must ban plastic\nright now.\n\nnext answer\n");
        assert_eq!(read_opinion(&mut input).unwrap(), "We must ban plastic\nright now.");
        assert_eq!(read_line(&mut input).unwrap().as_deref(), Some("next answer"));
    }

    #[test]
    fn test_read_opinion_at_eof() {
        let mut input = Cursor::new("only line");
        assert_eq!(read_opinion(&mut input).unwrap(), "only line");
        assert_eq!(read_opinion(&mut Cursor::new("")).unwrap(), "");
    }

    #[test]
    fn test_prompt_style_retries_until_valid() {
        let catalog = StyleCatalog::builtin();
        let mut input = Cursor::new("abc\n42\n5\n");
        let mut output = Vec::new();

        let style = prompt_style(&mut input, &mut output, &catalog).unwrap();
        assert_eq!(style, OutputStyle::named("Press Release"));

        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("11. Other (Custom)"));
        assert_eq!(shown.matches("Try again").count(), 2);
    }

    #[test]
    fn test_prompt_style_custom_label() {
        let catalog = StyleCatalog::builtin();
        let mut input = Cursor::new("11\n\n11\nHaiku\n");
        let mut output = Vec::new();

        let style = prompt_style(&mut input, &mut output, &catalog).unwrap();
        assert_eq!(style, OutputStyle::custom("Haiku"));
    }

    #[test]
    fn test_prompt_style_eof_is_error() {
        let mut output = Vec::new();
        let err = prompt_style(&mut Cursor::new(""), &mut output, &StyleCatalog::builtin()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_needs_api_key() {
        let mut config = OpAmpConfig::default();
        assert!(needs_api_key(&config, |_| None));
        assert!(needs_api_key(&config, |_| Some("  ".to_string())));
        assert!(!needs_api_key(&config, |key| {
            (key == API_KEY_ENV).then(|| "sk-env".to_string())
        }));

        config.api_key = Some("sk-config".to_string());
        assert!(!needs_api_key(&config, |_| None));
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        assert_eq!(validate_api_key("  sk-test \n").unwrap(), "sk-test");
        let err = validate_api_key("   ").unwrap_err();
        assert!(matches!(err, OpAmpError::EmptyInput { field: "API key" }));
    }

    #[test]
    fn test_save_stem_defaults_when_blank() {
        assert_eq!(save_stem(Some("plastic".to_string())), "plastic");
        assert_eq!(save_stem(Some(String::new())), DEFAULT_SAVE_STEM);
        assert_eq!(save_stem(Some("   ".to_string())), "opamp_results");
        assert_eq!(save_stem(None), "opamp_results");
    }

    #[test]
    fn test_confirm() {
        let mut output = Vec::new();
        assert!(confirm(&mut Cursor::new("Yes\n"), &mut output, "Save?").unwrap());
        assert!(!confirm(&mut Cursor::new("n\n"), &mut output, "Save?").unwrap());
        assert!(!confirm(&mut Cursor::new(""), &mut output, "Save?").unwrap());
    }
}
