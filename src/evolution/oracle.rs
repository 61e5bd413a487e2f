//! Seed oracle contract and adapters.
//!
//! The oracle is the external language-model call that plans diverse
//! variations of the user's task. The engine only consumes its output.

use serde_json::Value;

use crate::schema::SeedVariant;

/// Instruction sent to the oracle alongside the task description.
pub const META_INSTRUCTION: &str = r#"You are the Oracle. You never carry out tasks; you only plan them.

Your job is to produce variations of one main task, each of which will be handed to a separate assistant.

Reply with JSON only: a list of objects, each with exactly these fields:
- "systemPrompt": who the assistant is, its personality, limits and style.
- "prompt": the precise task the assistant must perform, with clear instructions.

Rules:
1. Do not perform the task yourself.
2. Produce between 3 and 7 variations of the task, each with a different focus, method, depth, tone or format.
3. Every variation must serve the same central goal.
4. Use clear, professional and objective language.
5. Use exactly this format:

```json
[
  { "systemPrompt": "...", "prompt": "..." }
]
```"#;

/// Oracle failures. These propagate out of seeding.
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
    #[error("Oracle request failed: {0}")]
    Request(String),
}

/// Produces seed variants for a task.
///
/// Returning an empty list is a valid answer ("no variants produced") and
/// must not be reported as an error.
pub trait Oracle {
    fn generate_seed_variants(
        &self,
        meta_instruction: &str,
        task: &str,
    ) -> Result<Vec<SeedVariant>, OracleError>;
}

impl<T: Oracle + ?Sized> Oracle for Box<T> {
    fn generate_seed_variants(
        &self,
        meta_instruction: &str,
        task: &str,
    ) -> Result<Vec<SeedVariant>, OracleError> {
        (**self).generate_seed_variants(meta_instruction, task)
    }
}

/// Oracle that always answers with the same list.
#[derive(Debug, Clone, Default)]
pub struct StaticOracle {
    variants: Vec<SeedVariant>,
}

impl StaticOracle {
    pub fn new(variants: Vec<SeedVariant>) -> Self {
        Self { variants }
    }
}

impl Oracle for StaticOracle {
    fn generate_seed_variants(
        &self,
        _meta_instruction: &str,
        _task: &str,
    ) -> Result<Vec<SeedVariant>, OracleError> {
        Ok(self.variants.clone())
    }
}

/// Adapts a raw text-completion function into an [`Oracle`].
///
/// The function receives the meta instruction and the task and returns the
/// model's reply verbatim; the reply is parsed with [`extract_seed_variants`].
pub struct CompletionOracle<F> {
    complete: F,
}

impl<F> CompletionOracle<F>
where
    F: Fn(&str, &str) -> Result<String, OracleError>,
{
    pub fn new(complete: F) -> Self {
        Self { complete }
    }
}

impl<F> Oracle for CompletionOracle<F>
where
    F: Fn(&str, &str) -> Result<String, OracleError>,
{
    fn generate_seed_variants(
        &self,
        meta_instruction: &str,
        task: &str,
    ) -> Result<Vec<SeedVariant>, OracleError> {
        let reply = (self.complete)(meta_instruction, task)?;
        Ok(extract_seed_variants(&reply))
    }
}

/// Pull a list of seed variants out of free-form model output.
///
/// Prefers the body of a fenced `json` block, otherwise parses from the first
/// `[` or `{`. Anything that is not a JSON array yields an empty list.
/// Array entries that are not variant objects are skipped.
pub fn extract_seed_variants(text: &str) -> Vec<SeedVariant> {
    let Some(candidate) = fenced_json(text).or_else(|| bare_json(text)) else {
        log::warn!("No JSON found in oracle reply");
        return Vec::new();
    };

    let value: Value = match first_json_value(candidate) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Oracle reply is not valid JSON: {e}");
            return Vec::new();
        }
    };

    let Value::Array(items) = value else {
        log::warn!("Oracle reply is JSON but not a list");
        return Vec::new();
    };

    let total = items.len();
    let variants: Vec<SeedVariant> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if variants.len() < total {
        log::warn!(
            "Skipped {} malformed oracle entries",
            total - variants.len()
        );
    }
    variants
}

fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let body = &text[start..];
    let end = body.find("```").unwrap_or(body.len());
    Some(body[..end].trim())
}

fn bare_json(text: &str) -> Option<&str> {
    let start = text.find(['[', '{'])?;
    Some(text[start..].trim())
}

/// Parse the first JSON value, ignoring trailing prose.
fn first_json_value(text: &str) -> Result<Value, serde_json::Error> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Value>();
    match stream.next() {
        Some(result) => result,
        None => serde_json::from_str(text),
    }
}
