use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AlgoError, AlgoResult};

/// Outcome of a finished run
///
/// At least one signal must be present. They are checked in the order
/// `success`, `mistakes`, `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mistakes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u32>,
}

impl RunResult {
    pub fn passed() -> Self {
        Self { success: Some(true), ..Self::default() }
    }

    pub fn failed() -> Self {
        Self { success: Some(false), ..Self::default() }
    }

    pub fn with_mistakes(mistakes: u32) -> Self {
        Self { mistakes: Some(mistakes), ..Self::default() }
    }

    pub fn is_success(&self) -> AlgoResult<bool> {
        if let Some(success) = self.success {
            return Ok(success);
        }
        if let Some(mistakes) = self.mistakes {
            return Ok(mistakes == 0);
        }
        if let Some(errors) = self.errors {
            return Ok(errors == 0);
        }
        Err(AlgoError::MissingRunSignal)
    }

    /// Read a result from loosely typed JSON
    ///
    /// `success` is read by truthiness; `mistakes`/`errors` count as zero
    /// when they are numerically zero (including `"0"`, `false` and `null`).
    pub fn from_value(value: &Value) -> AlgoResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AlgoError::InvalidRunResult(format!("expected object, got {value}")))?;

        let success = object.get("success").map(truthy);
        let mistakes = object.get("mistakes").map(count_or_nonzero);
        let errors = object.get("errors").map(count_or_nonzero);

        let result = Self { success, mistakes, errors };
        result.is_success()?;
        Ok(result)
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Zero stays zero; anything else non-zero or unreadable becomes one
fn count_or_nonzero(value: &Value) -> u32 {
    let numeric = match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Array(_) | Value::Object(_) => None,
    };

    match numeric {
        Some(n) if n == 0.0 => 0,
        Some(n) if n.is_finite() && n > 0.0 && n <= u32::MAX as f64 => n.ceil() as u32,
        _ => 1,
    }
}
