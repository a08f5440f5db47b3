//! Human-readable reports of a pipeline run.
//!
//! [`render_text`] produces the plain-text layout written by `--save`;
//! [`print_report`] shows the same information on the console with color.
//! Both take the list of styled outputs, since a run may be reformatted
//! several times after the fact.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::pipeline::PipelineResult;
use crate::styles::OutputStyle;
use crate::types::{Dimension, RhetoricalProfile};
use crate::utilities::errors::Result;
use crate::utilities::file_handler::FileHandler;
use crate::utilities::printer::{Printer, PrinterColor};

pub const REPORT_TITLE: &str = "CONCEPTUAL OP-AMP ANALYSIS RESULTS";

/// One styled rendering of a synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledOutput {
    pub style: OutputStyle,
    pub text: String,
}

/// A run plus every styled output produced from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub result: PipelineResult,
    pub outputs: Vec<StyledOutput>,
}

impl RunReport {
    /// Start a report whose first output is the run's own final output.
    pub fn new(result: PipelineResult) -> Self {
        let first = StyledOutput {
            style: result.style.clone(),
            text: result.final_output.clone(),
        };
        Self {
            result,
            outputs: vec![first],
        }
    }

    pub fn push(&mut self, style: OutputStyle, text: String) {
        self.outputs.push(StyledOutput { style, text });
    }

    /// Write `stem.txt`, and `stem.json` too when `json` is set.
    pub fn save(&self, handler: &FileHandler, stem: &str, json: bool) -> Result<Vec<std::path::PathBuf>> {
        let mut written = vec![handler.save_text(stem, &render_text(self))?];
        if json {
            written.push(handler.save_json(stem, self)?);
        }
        Ok(written)
    }
}

fn profile_line(profile: &RhetoricalProfile) -> String {
    Dimension::ALL
        .iter()
        .map(|&d| format!("{}: {}", title_case(d.key()), profile.describe(d)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn title_case(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plain-text report suitable for saving.
pub fn render_text(report: &RunReport) -> String {
    let r = &report.result;
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", REPORT_TITLE);
    let _ = writeln!(out, "{}\n", "=".repeat(50));
    let _ = writeln!(out, "Context: {}\n", r.context);
    let _ = writeln!(out, "Ground Truth: {}\n", r.ground_truth);
    let _ = writeln!(out, "Positive Input (Opinion 1): {}", r.positive_profile.content);
    let _ = writeln!(out, "{}\n", profile_line(&r.positive_profile));
    let _ = writeln!(out, "Negative Input (Opinion 2): {}", r.negative_profile.content);
    let _ = writeln!(out, "{}\n", profile_line(&r.negative_profile));

    for delta in r.deltas.iter() {
        let _ = writeln!(out, "{} Delta:", title_case(delta.dimension.key()));
        let _ = writeln!(out, "  Null: {}", delta.null_hypothesis);
        let _ = writeln!(out, "  Analysis: {}\n", delta.delta_analysis);
    }

    let _ = writeln!(out, "First Synthesis (Delta Synthesis):\n{}\n", r.first_synthesis);
    for output in &report.outputs {
        let _ = writeln!(out, "Final Output ({}):\n{}\n", output.style, output.text);
    }
    if !r.diagnostics.is_empty() {
        let _ = writeln!(out, "Diagnostics:");
        for d in &r.diagnostics {
            let _ = writeln!(out, "  - {}", d);
        }
    }
    out
}

/// Print the full report to stdout.
pub fn print_report(printer: &Printer, report: &RunReport) {
    let r = &report.result;
    println!();
    printer.rule();
    printer.print(REPORT_TITLE, PrinterColor::BoldWhite);
    printer.rule();

    printer.section("GROUND TRUTH (NULL HYPOTHESIS):", PrinterColor::BoldCyan);
    println!("{}", r.ground_truth);

    printer.section("INPUT ANALYSIS:", PrinterColor::BoldCyan);
    for (title, profile) in [
        ("POSITIVE INPUT (Opinion 1):", &r.positive_profile),
        ("NEGATIVE INPUT (Opinion 2):", &r.negative_profile),
    ] {
        println!();
        printer.print(title, PrinterColor::Green);
        printer.field("Content: ", &profile.content);
        for dim in Dimension::ALL {
            printer.field(&format!("{:<9}", format!("{}:", title_case(dim.key()))), profile.describe(dim));
        }
    }

    printer.section("RHETORICAL DELTAS:", PrinterColor::BoldCyan);
    for delta in r.deltas.iter() {
        println!();
        printer.print(&format!("{} DELTA:", delta.dimension.label()), PrinterColor::Yellow);
        printer.field("Null Hypothesis:", &delta.null_hypothesis);
        printer.field("Analysis:", &delta.delta_analysis);
    }

    printer.section("FIRST SYNTHESIS (DELTA SYNTHESIS):", PrinterColor::BoldCyan);
    println!("{}", r.first_synthesis);
    println!();
    printer.rule();

    for output in &report.outputs {
        print_output(printer, output);
    }

    for d in &r.diagnostics {
        printer.print(&format!("warning: {}", d), PrinterColor::Red);
    }
}

/// Print one styled output block.
pub fn print_output(printer: &Printer, output: &StyledOutput) {
    printer.section(&format!("FINAL OUTPUT ({}):", output.style), PrinterColor::BoldPurple);
    println!("{}", output.text);
    println!();
    printer.rule();
}
