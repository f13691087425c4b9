//! Top-level function signature extraction.
//!
//! kiln does not parse MLIR. It locates the first `func.func` declaration in
//! the module text, recovers the operand and result types against a
//! shape-then-element-kind grammar, and rejects anything the flat ABI cannot
//! represent. The module body stays opaque to the rest of the pipeline.

use kiln_dtype::ElementKind;

use crate::error::*;
use crate::types::{FunctionSignature, Shape, TensorType};

/// Extract the signature of the first `func.func` in `module_text`.
///
/// Fails when no function definition is found, when the declaration is
/// malformed, or when any operand or result type is not a ranked tensor
/// with a fully static shape.
pub fn extract_signature(module_text: &str) -> Result<FunctionSignature> {
    let at = module_text.find("func.func").ok_or(Error::NoFunction)?;
    let rest = &module_text[at + "func.func".len()..];

    let rest = skip_visibility(rest.trim_start());
    let rest = rest.strip_prefix('@').ok_or(Error::MissingName)?;

    let name_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.')))
        .unwrap_or(rest.len());
    let name = &rest[..name_len];
    if name.is_empty() {
        return Err(Error::MissingName);
    }

    let rest = rest[name_len..].trim_start();
    let rest = rest.strip_prefix('(').ok_or_else(|| Error::MalformedParams {
        reason: "expected '(' after function name".into(),
    })?;
    let close = matching_paren(rest).ok_or_else(|| Error::MalformedParams {
        reason: "unbalanced parameter list".into(),
    })?;
    let params_text = &rest[..close];

    let mut operands = Vec::new();
    for param in split_top_level(params_text) {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        // `%arg0: tensor<4x8xf32>`, attributes after the type are not expected
        // on tensor-kernel entry points.
        let type_text = match param.split_once(':') {
            Some((_, ty)) => ty.trim(),
            None => param,
        };
        operands.push(parse_tensor_type(type_text)?);
    }

    let after_params = rest[close + 1..].trim_start();
    let after_arrow = after_params.strip_prefix("->").ok_or(Error::MissingResult)?;
    let body_start = after_arrow.find('{').unwrap_or(after_arrow.len());
    let mut result_text = after_arrow[..body_start].trim();
    if let Some(stripped) = result_text.strip_suffix("attributes") {
        result_text = stripped.trim_end();
    }

    if let Some(inner) = result_text.strip_prefix('(') {
        let inner = inner.strip_suffix(')').ok_or_else(|| Error::MalformedParams {
            reason: "unbalanced result list".into(),
        })?;
        if split_top_level(inner).count() > 1 {
            return Err(Error::MultiResult { type_text: result_text.to_string() });
        }
        result_text = inner.trim();
    }
    if result_text.is_empty() {
        return Err(Error::MissingResult);
    }

    let result = parse_tensor_type(result_text)?;

    Ok(FunctionSignature { name: name.to_string(), operands, result })
}

/// Parse one `tensor<DxDx..xEK>` type against the static-shape grammar.
pub fn parse_tensor_type(type_text: &str) -> Result<TensorType> {
    let inner = type_text
        .strip_prefix("tensor<")
        .and_then(|t| t.strip_suffix('>'))
        .ok_or_else(|| Error::NotATensor { type_text: type_text.to_string() })?;

    if inner.starts_with('*') {
        return Err(Error::Unranked { type_text: type_text.to_string() });
    }

    let tokens: Vec<&str> = inner.split('x').map(str::trim).collect();
    let (dims, elem_token) = tokens.split_at(tokens.len() - 1);

    let mut shape = Shape::new();
    for &dim in dims {
        if dim == "?" {
            return Err(Error::DynamicDim { type_text: type_text.to_string() });
        }
        let extent: u64 = dim.parse().map_err(|_| Error::BadDim { token: dim.to_string() })?;
        shape.push(extent);
    }

    let elem = ElementKind::parse_mlir_token(elem_token[0])
        .map_err(|source| Error::Element { type_text: type_text.to_string(), source })?;

    Ok(TensorType { elem, shape })
}

fn skip_visibility(text: &str) -> &str {
    for vis in ["private", "public", "nested"] {
        if let Some(rest) = text.strip_prefix(vis) {
            return rest.trim_start();
        }
    }
    text
}

/// Index of the `)` closing the parameter list opened just before `text`.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Some(i);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Split on commas outside any `<>`/`()` nesting.
fn split_top_level(text: &str) -> impl Iterator<Item = &str> {
    let mut depth = 0i32;
    let mut start = 0usize;
    let mut pieces = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' => depth += 1,
            '>' | ')' => depth -= 1,
            ',' if depth == 0 => {
                pieces.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    pieces.push(&text[start..]);
    pieces.into_iter()
}
