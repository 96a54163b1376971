use serde_json::{json, Value};
use thiserror::Error;

/// A recoverable failure of one tool invocation. Reported back to the remote
/// run as a per-call error output; never aborts the batch or the session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    #[error("malformed tool arguments: {0}")]
    ArgumentParse(String),
    #[error("the revenue should be a string representation of a number")]
    InvalidRevenue,
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// Declarative schema and native implementation of the callable tools.
/// Currently one: `calculate_tax`.
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry;

impl ToolRegistry {
    pub fn new() -> Self {
        Self
    }

    /// The wire contract registered with the remote run. The remote side
    /// uses this to decide when to request local execution.
    pub fn describe(&self) -> Value {
        json!([
            {
                "type": "function",
                "function": {
                    "name": "calculate_tax",
                    "description": "Get the tax for given revenue in euro",
                    "parameters": {
                        "type": "object",
                        "properties": {
                            "revenue": {
                                "type": "string",
                                "description": "Annual revenue in euro"
                            }
                        },
                        "required": ["revenue"]
                    }
                }
            }
        ])
    }

    /// Parse `raw_arguments`, look up `name`, and run the tool. Pure; the
    /// only side effect is the computation itself.
    pub fn invoke(&self, name: &str, raw_arguments: &str) -> Result<String, ToolError> {
        let arguments: Value = serde_json::from_str(raw_arguments)
            .map_err(|e| ToolError::ArgumentParse(e.to_string()))?;

        match name {
            "calculate_tax" => {
                let revenue = coerce_revenue(arguments.get("revenue"))?;
                Ok(format_amount(calculate_tax(revenue)))
            }
            other => Err(ToolError::UnknownTool(other.to_string())),
        }
    }
}

/// Progressive five-bracket tax: marginal rates 0/10/20/30/40 % above
/// 10 000 / 30 000 / 70 000 / 150 000 euro. Continuous at each boundary and
/// monotone non-decreasing; never negative.
pub fn calculate_tax(revenue: f64) -> f64 {
    if revenue <= 10_000.0 {
        0.0
    } else if revenue <= 30_000.0 {
        0.10 * (revenue - 10_000.0)
    } else if revenue <= 70_000.0 {
        2_000.0 + 0.20 * (revenue - 30_000.0)
    } else if revenue <= 150_000.0 {
        10_000.0 + 0.30 * (revenue - 70_000.0)
    } else {
        34_000.0 + 0.40 * (revenue - 150_000.0)
    }
}

fn coerce_revenue(value: Option<&Value>) -> Result<f64, ToolError> {
    let value =
        value.ok_or_else(|| ToolError::ArgumentParse("missing 'revenue' field".to_string()))?;

    let revenue = match value {
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| ToolError::InvalidRevenue)?,
        Value::Number(n) => n.as_f64().ok_or(ToolError::InvalidRevenue)?,
        _ => return Err(ToolError::InvalidRevenue),
    };

    if !revenue.is_finite() {
        return Err(ToolError::InvalidRevenue);
    }
    Ok(revenue)
}

fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_calculates_tax_from_string_revenue() {
        let registry = ToolRegistry::new();
        let output = registry
            .invoke("calculate_tax", "{\"revenue\": \"50000\"}")
            .expect("valid revenue should compute");
        assert_eq!(output, "6000");
    }

    #[test]
    fn test_invoke_accepts_numeric_revenue() {
        let registry = ToolRegistry::new();
        let output = registry
            .invoke("calculate_tax", "{\"revenue\": 50000}")
            .expect("numeric revenue should compute");
        assert_eq!(output, "6000");
    }

    #[test]
    fn test_invoke_rejects_non_numeric_revenue() {
        let registry = ToolRegistry::new();
        let error = registry
            .invoke("calculate_tax", "{\"revenue\": \"abc\"}")
            .expect_err("non-numeric revenue should fail");
        assert_eq!(error, ToolError::InvalidRevenue);
    }

    #[test]
    fn test_invoke_rejects_malformed_arguments() {
        let registry = ToolRegistry::new();
        let error = registry
            .invoke("calculate_tax", "{not json")
            .expect_err("malformed arguments should fail");
        assert!(matches!(error, ToolError::ArgumentParse(_)));
    }

    #[test]
    fn test_invoke_rejects_missing_revenue_field() {
        let registry = ToolRegistry::new();
        let error = registry
            .invoke("calculate_tax", "{}")
            .expect_err("missing revenue should fail");
        assert!(matches!(error, ToolError::ArgumentParse(_)));
    }

    #[test]
    fn test_invoke_rejects_unknown_tool() {
        let registry = ToolRegistry::new();
        let error = registry
            .invoke("calculate_vat", "{\"revenue\": \"1\"}")
            .expect_err("unknown tool should fail");
        assert_eq!(error, ToolError::UnknownTool("calculate_vat".to_string()));
    }

    #[test]
    fn test_describe_exports_single_function_schema() {
        let schema = ToolRegistry::new().describe();
        let tools = schema.as_array().expect("schema must be an array");
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0]["type"], "function");
        assert_eq!(tools[0]["function"]["name"], "calculate_tax");
        assert_eq!(
            tools[0]["function"]["parameters"]["required"],
            serde_json::json!(["revenue"])
        );
    }
}
