//! Scripted text-generation double for unit tests.

use std::fmt;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::llms::base_llm::TextGeneration;
use crate::utilities::errors::GenerationError;

type Responder = Box<dyn Fn(&str, usize) -> Result<String, GenerationError> + Send + Sync>;

/// One call seen by [`ScriptedLLM`].
#[derive(Debug, Clone)]
pub(crate) struct RecordedCall {
    pub prompt: String,
    pub temperature: f64,
    pub structured: bool,
}

/// A [`TextGeneration`] whose answers come from a closure.
///
/// The closure receives the prompt and the zero-based call index.
pub(crate) struct ScriptedLLM {
    responder: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl fmt::Debug for ScriptedLLM {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedLLM")
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

impl ScriptedLLM {
    pub fn new(
        responder: impl Fn(&str, usize) -> Result<String, GenerationError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Well-formed answers for every stage.
    ///
    /// Analysis prompts get a JSON object whose descriptions quote the
    /// analyzed opinion; every other prompt gets `"response #<index>"`.
    pub fn happy() -> Self {
        Self::new(|prompt, index| {
            if let Some(opinion) = quoted_opinion(prompt) {
                if prompt.contains("JSON object") {
                    return Ok(serde_json::json!({
                        "ethos": format!("ethos of {}", opinion),
                        "logos": format!("logos of {}", opinion),
                        "energeia": format!("energeia of {}", opinion),
                    })
                    .to_string());
                }
            }
            Ok(format!("response #{}", index))
        })
    }

    /// Always answer with `text`.
    pub fn constant(text: &'static str) -> Self {
        Self::new(move |_, _| Ok(text.to_string()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn respond(&self, prompt: &str, temperature: f64, structured: bool) -> Result<String, GenerationError> {
        let index = {
            let mut calls = self.calls.lock();
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                temperature,
                structured,
            });
            calls.len() - 1
        };
        (self.responder)(prompt, index)
    }
}

/// The text after `Opinion: "` up to the closing quote, if present.
pub(crate) fn quoted_opinion(prompt: &str) -> Option<&str> {
    let start = prompt.find("Opinion: \"")? + "Opinion: \"".len();
    let end = prompt[start..].find('"')?;
    Some(&prompt[start..start + end])
}

#[async_trait]
impl TextGeneration for ScriptedLLM {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str, temperature: f64) -> Result<String, GenerationError> {
        self.respond(prompt, temperature, false)
    }

    async fn generate_json(
        &self,
        prompt: &str,
        temperature: f64,
        _keys: &[&str],
    ) -> Result<String, GenerationError> {
        self.respond(prompt, temperature, true)
    }
}
