//! Rewriting a synthesis into a requested output style.
//!
//! Named styles take their instruction from the injected [`StyleCatalog`].
//! Custom styles take two calls: a meta-prompt that writes the instructions,
//! then the same rewrite a named style would get. The generated instructions
//! live only for the duration of one call.

use std::sync::Arc;

use crate::llms::base_llm::TextGeneration;
use crate::pipeline::PipelineStage;
use crate::styles::{OutputStyle, StyleCatalog};
use crate::utilities::errors::{OpAmpError, Result};

#[derive(Debug, Clone)]
pub struct Reformatter {
    llm: Arc<dyn TextGeneration>,
    catalog: Arc<StyleCatalog>,
    instructions_temperature: f64,
    rewrite_temperature: f64,
}

impl Reformatter {
    pub fn new(
        llm: Arc<dyn TextGeneration>,
        catalog: Arc<StyleCatalog>,
        instructions_temperature: f64,
        rewrite_temperature: f64,
    ) -> Self {
        Self {
            llm,
            catalog,
            instructions_temperature,
            rewrite_temperature,
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    /// Meta-prompt asking for rewrite instructions, not rewritten content.
    pub fn build_meta_prompt(label: &str) -> String {
        format!(
            "You are to rephrase a synthesized opinion into the following output format: {}. \
             Write clear and direct instructions to another AI about how to transform a complex \
             analytical synthesis into that style/format. Be specific about structure, tone, \
             length, and audience as appropriate. Output only the instructions, not the \
             rephrased content.",
            label
        )
    }

    pub fn build_rewrite_prompt(instructions: &str, synthesis: &str) -> String {
        format!(
            "{}\n\nSYNTHESIS TO REWRITE:\n\"{}\"\n\nProvide the output as requested above:",
            instructions, synthesis
        )
    }

    /// Rewrite `synthesis` into `style`.
    ///
    /// Unknown named styles and empty custom labels fail before any call.
    pub async fn reformat(&self, synthesis: &str, style: &OutputStyle) -> Result<String> {
        self.catalog.validate(style)?;

        let instructions = self.resolve_instructions(style).await?;
        let prompt = Self::build_rewrite_prompt(&instructions, synthesis);

        log::debug!("Rewriting synthesis as '{}'", style);
        let response = self
            .llm
            .generate(&prompt, self.rewrite_temperature)
            .await
            .map_err(|e| OpAmpError::generation(PipelineStage::Reformat, "style rewrite", e))?;
        Ok(response.trim().to_string())
    }

    async fn resolve_instructions(&self, style: &OutputStyle) -> Result<String> {
        match style {
            OutputStyle::Named(name) => self
                .catalog
                .instruction(name)
                .map(str::to_string)
                .ok_or_else(|| OpAmpError::UnknownStyle { name: name.clone() }),
            OutputStyle::Custom(label) => {
                let meta_prompt = Self::build_meta_prompt(label.trim());
                let instructions = self
                    .llm
                    .generate(&meta_prompt, self.instructions_temperature)
                    .await
                    .map_err(|e| {
                        OpAmpError::generation(
                            PipelineStage::Reformat,
                            "custom style instructions",
                            e,
                        )
                    })?;
                log::debug!(
                    "Generated {} chars of instructions for custom style '{}'",
                    instructions.len(),
                    label
                );
                Ok(instructions.trim().to_string())
            }
        }
    }
}
