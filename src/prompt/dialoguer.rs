//! Dialoguer-based prompt source for terminal use.

use super::PromptSource;
use crate::error::Result;
use dialoguer::Input;
use indexmap::IndexMap;

/// Asks for each unique prompt token on the terminal. An empty reply is
/// a valid answer (the token resolves `Empty`); only an input error
/// aborts the batch.
pub struct DialoguerPromptSource;

impl DialoguerPromptSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DialoguerPromptSource {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptSource for DialoguerPromptSource {
    fn request(&self, names: &[String]) -> Result<IndexMap<String, String>> {
        let mut answers = IndexMap::new();
        for name in names {
            let value: String = Input::new()
                .with_prompt(format!("Value for '{name}'"))
                .allow_empty(true)
                .interact_text()?;
            answers.insert(name.clone(), value);
        }
        Ok(answers)
    }
}
