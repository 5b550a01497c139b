//! Dotted field paths over BSON documents
//!
//! Mirrors the MongoDB update-path rules the engine relies on: segments
//! address document keys, numeric segments address array elements
//! (`exercises.2.observations`). Used by the in-memory store and by
//! filter evaluation.

use bson::{Bson, Document};

use crate::types::{Result, WorkshopError};

/// Read the value at `path`, if present
pub fn get_path<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = doc.get(first)?;
    for segment in segments {
        current = match current {
            Bson::Document(d) => d.get(segment)?,
            Bson::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// `$set` semantics: missing intermediate documents are created
pub fn set_path(doc: &mut Document, path: &str, value: Bson) -> Result<()> {
    let slot = resolve_mut(doc, path)?;
    *slot = value;
    Ok(())
}

/// `$push` semantics: appends to the array at `path`, creating it if absent.
///
/// Any existing non-array value, `null` included, is rejected.
pub fn push_path(doc: &mut Document, path: &str, value: Bson) -> Result<()> {
    let absent = get_path(doc, path).is_none();
    let slot = resolve_mut(doc, path)?;
    if absent {
        *slot = Bson::Array(vec![value]);
        return Ok(());
    }
    match slot {
        Bson::Array(items) => {
            items.push(value);
            Ok(())
        }
        other => Err(WorkshopError::Store(format!(
            "cannot push to non-array field '{}' ({:?})",
            path,
            other.element_type()
        ))),
    }
}

/// Keep only `fields` (plus `_id`); an empty list keeps everything
pub fn project(doc: &Document, fields: &[&str]) -> Document {
    if fields.is_empty() {
        return doc.clone();
    }
    let mut out = Document::new();
    if let Some(id) = doc.get("_id") {
        out.insert("_id", id.clone());
    }
    for field in fields {
        if let Some(value) = doc.get(*field) {
            out.insert(*field, value.clone());
        }
    }
    out
}

fn resolve_mut<'a>(doc: &'a mut Document, path: &str) -> Result<&'a mut Bson> {
    let (head, rest) = match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    };

    if !doc.contains_key(head) {
        let fresh = if rest.is_some() {
            Bson::Document(Document::new())
        } else {
            Bson::Null
        };
        doc.insert(head, fresh);
    }
    let entry = doc.get_mut(head).ok_or_else(|| missing(path))?;

    match rest {
        None => Ok(entry),
        Some(rest) => resolve_in(entry, rest),
    }
}

fn resolve_in<'a>(value: &'a mut Bson, path: &str) -> Result<&'a mut Bson> {
    match value {
        Bson::Document(d) => resolve_mut(d, path),
        Bson::Array(items) => {
            let (head, rest) = match path.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (path, None),
            };
            let index: usize = head.parse().map_err(|_| {
                WorkshopError::Store(format!("non-numeric array index '{}'", head))
            })?;
            let len = items.len();
            let item = items.get_mut(index).ok_or_else(|| {
                WorkshopError::Store(format!("array index {} out of bounds ({})", index, len))
            })?;
            match rest {
                None => Ok(item),
                Some(rest) => resolve_in(item, rest),
            }
        }
        other => Err(WorkshopError::Store(format!(
            "cannot traverse {:?} at '{}'",
            other.element_type(),
            path
        ))),
    }
}

fn missing(path: &str) -> WorkshopError {
    WorkshopError::Store(format!("field '{}' not found", path))
}
