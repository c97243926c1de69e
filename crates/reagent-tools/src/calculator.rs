//! Calculator Tool
//!
//! Evaluates arithmetic expressions (`+ - * / ^`, parentheses, unary
//! minus) without going anywhere near an interpreter.

use async_trait::async_trait;
use reagent_core::{
    error::{AgentError, Result},
    tool::Tool,
};

/// Tool evaluating a mathematical expression
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculate"
    }

    fn description(&self) -> &str {
        "Perform mathematical calculations. Input: mathematical expression like '2+2' or '10*5'"
    }

    async fn invoke(&self, input: &str) -> Result<String> {
        let expression = input.trim();
        let value = evaluate_expression(expression)
            .map_err(AgentError::ToolExecution)?;
        Ok(format!("Result: {}", format_number(value)))
    }
}

/// Whole results print without a decimal point (`76`, not `76.0`)
fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Recursive expression evaluator: parentheses reduce innermost-first,
/// then operators split lowest-precedence-last (scanning right to left so
/// left associativity holds).
fn evaluate_expression(expr: &str) -> std::result::Result<f64, String> {
    let original = expr;
    let expr = expr.replace(' ', "");

    if expr.is_empty() {
        return Err(format!("Invalid mathematical expression '{original}'"));
    }

    // Innermost parenthesized group first
    if let Some(start) = expr.rfind('(') {
        let Some(end) = expr[start..].find(')') else {
            return Err(format!("Invalid mathematical expression '{original}'"));
        };
        let inner = evaluate_expression(&expr[start + 1..start + end])?;
        let reduced = format!("{}{}{}", &expr[..start], inner, &expr[start + end + 1..]);
        return evaluate_expression(&reduced);
    }
    if expr.contains(')') {
        return Err(format!("Invalid mathematical expression '{original}'"));
    }

    // Addition/subtraction (lowest precedence, split last)
    for (i, c) in expr.char_indices().rev() {
        if i > 0 && (c == '+' || c == '-') {
            // Skip unary signs and exponent-adjacent signs
            let prev = expr.as_bytes()[i - 1] as char;
            if prev.is_ascii_digit() || prev == '.' {
                let left = evaluate_expression(&expr[..i])?;
                let right = evaluate_expression(&expr[i + 1..])?;
                return Ok(if c == '+' { left + right } else { left - right });
            }
        }
    }

    // Multiplication/division
    for (i, c) in expr.char_indices().rev() {
        if c == '*' || c == '/' {
            let left = evaluate_expression(&expr[..i])?;
            let right = evaluate_expression(&expr[i + 1..])?;
            if c == '/' && right == 0.0 {
                return Err("Division by zero".into());
            }
            return Ok(if c == '*' { left * right } else { left / right });
        }
    }

    // Power
    if let Some(i) = expr.find('^') {
        let left = evaluate_expression(&expr[..i])?;
        let right = evaluate_expression(&expr[i + 1..])?;
        return Ok(left.powf(right));
    }

    expr.parse::<f64>()
        .map_err(|_| format!("Invalid mathematical expression '{original}'"))
}
