//! RESTCONF `fields` query parameter resolution
//!
//! Grammar (the subset this middleware serves):
//!
//! ```text
//! fields-expr = path *(";" path)
//! path        = name ["/" path / "(" fields-expr ")"]
//! ```
//!
//! Each path is resolved against the schema relative to the request's
//! target resource, producing explicit subtree paths rooted at it.

use crate::errors::{ErrorTag, ErrorType, Result, RpcError};
use crate::model::{InstanceId, QName};
use crate::schema::SchemaContext;

/// Resolve a `fields` expression to explicit subtree paths under `parent`
///
/// Names are written `module:name`, or bare when the module is implied by
/// the parent resource (the parent's last step supplies the module).
///
/// # Errors
///
/// * `invalid-value` (protocol) - empty expression, empty name, or
///   unbalanced parentheses
/// * `unknown-element` (application) - a name matching no schema node
pub fn resolve_fields(
    expr: &str,
    parent: &InstanceId,
    schema: &SchemaContext,
) -> Result<Vec<InstanceId>> {
    if expr.trim().is_empty() {
        return Err(invalid("empty fields expression"));
    }
    let mut paths = Vec::new();
    for part in split_top_level(expr)? {
        resolve_path(part.trim(), parent, schema, &mut paths)?;
    }
    Ok(paths)
}

fn resolve_path(
    part: &str,
    parent: &InstanceId,
    schema: &SchemaContext,
    out: &mut Vec<InstanceId>,
) -> Result<()> {
    if part.is_empty() {
        return Err(invalid("empty path in fields expression"));
    }

    // A trailing (...) group fans out under the prefix path
    if let Some(open) = part.find('(') {
        if !part.ends_with(')') {
            return Err(invalid("unbalanced parentheses in fields expression"));
        }
        let prefix = &part[..open];
        let inner = &part[open + 1..part.len() - 1];
        let base = resolve_segments(prefix, parent, schema)?;
        for sub in split_top_level(inner)? {
            resolve_path(sub.trim(), &base, schema, out)?;
        }
        return Ok(());
    }

    out.push(resolve_segments(part, parent, schema)?);
    Ok(())
}

fn resolve_segments(expr: &str, parent: &InstanceId, schema: &SchemaContext) -> Result<InstanceId> {
    let mut path = parent.clone();
    for segment in expr.split('/') {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(invalid("empty segment in fields expression"));
        }
        let qname = parse_name(segment, &path);
        let candidate = path.child_node(qname);
        if schema.find_node(&candidate).is_none() {
            return Err(
                RpcError::new(ErrorType::Application, ErrorTag::UnknownElement)
                    .with_path(candidate)
                    .with_message(format!("'{}' matches no schema node", segment)),
            );
        }
        path = candidate;
    }
    Ok(path)
}

fn parse_name(segment: &str, path: &InstanceId) -> QName {
    match segment.split_once(':') {
        Some((module, local)) => QName::new(module, local),
        None => {
            let module = path
                .last()
                .map(|arg| arg.qname().module.clone())
                .unwrap_or_default();
            QName::new(module, segment)
        }
    }
}

/// Split on `;` outside parentheses
fn split_top_level(expr: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (index, ch) in expr.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| invalid("unbalanced parentheses in fields expression"))?;
            }
            ';' if depth == 0 => {
                parts.push(&expr[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(invalid("unbalanced parentheses in fields expression"));
    }
    parts.push(&expr[start..]);
    Ok(parts)
}

fn invalid(message: &str) -> RpcError {
    RpcError::new(ErrorType::Protocol, ErrorTag::InvalidValue).with_message(message)
}
