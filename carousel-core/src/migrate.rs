//! Loading untrusted document JSON.
//!
//! [`migrate`] accepts any JSON object and produces a [`CarouselDocument`]
//! that satisfies the model invariants: missing fields are filled from the
//! defaults of a new document, values of the wrong type are replaced,
//! unknown layouts fall back to `title-body`, elements of unknown type are
//! dropped, every id is present and unique, and element text is sanitized.
//! Unknown top-level fields are preserved.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::{CarouselDocument, SCHEMA_VERSION};
use crate::element::ElementKind;
use crate::ids::IdAllocator;
use crate::markup;
use crate::slide::{Slide, SlideElement, SlideLayout};

/// Migration failures.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// The input is not a JSON object.
    #[error("document must be a JSON object")]
    NotAnObject,

    /// The input fails the structural check.
    #[error("invalid document: {}", .0.join("; "))]
    Invalid(Vec<String>),

    /// The normalized document still could not be decoded.
    #[error("failed to decode document: {0}")]
    Deserialize(String),
}

/// What [`migrate_with_report`] had to fix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Version found in the input, if any.
    pub source_version: Option<u64>,
    /// Elements removed because their type is unknown or they are malformed.
    pub dropped_elements: usize,
    /// Slide and element ids that were missing or duplicated and got replaced.
    pub regenerated_ids: usize,
    /// Text fields that contained unsafe markup.
    pub sanitized_fields: usize,
    /// Slides whose layout was missing or unknown.
    pub defaulted_layouts: usize,
}

impl MigrationReport {
    /// Whether the input needed no repair beyond filling defaults.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.dropped_elements == 0
            && self.regenerated_ids == 0
            && self.sanitized_fields == 0
            && self.defaulted_layouts == 0
    }
}

/// Structural check of the top-level fields. Returns the list of problems;
/// empty means the shape is acceptable.
#[must_use]
pub fn validate_shape(value: &Value) -> Vec<String> {
    let Some(obj) = value.as_object() else {
        return vec!["document must be an object".to_string()];
    };
    let mut errors = Vec::new();
    if !obj.get("version").is_some_and(Value::is_number) {
        errors.push("field \"version\" missing or not a number".to_string());
    }
    if !obj.get("slides").is_some_and(Value::is_array) {
        errors.push("field \"slides\" missing or not an array".to_string());
    }
    if !obj.get("theme").is_some_and(Value::is_object) {
        errors.push("field \"theme\" missing or not an object".to_string());
    }
    if !obj.get("canvas").is_some_and(Value::is_object) {
        errors.push("field \"canvas\" missing or not an object".to_string());
    }
    errors
}

/// Validate the shape strictly, then migrate. Used for user imports.
pub fn import(value: Value) -> Result<CarouselDocument, MigrateError> {
    let errors = validate_shape(&value);
    if !errors.is_empty() {
        return Err(MigrateError::Invalid(errors));
    }
    migrate(value)
}

/// Parse JSON text and migrate it.
pub fn migrate_str(json: &str) -> Result<CarouselDocument, MigrateError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| MigrateError::Deserialize(e.to_string()))?;
    migrate(value)
}

/// Bring any document object up to the current schema.
pub fn migrate(value: Value) -> Result<CarouselDocument, MigrateError> {
    migrate_with_report(value).map(|(document, _)| document)
}

/// [`migrate`], also reporting what was repaired.
pub fn migrate_with_report(value: Value) -> Result<(CarouselDocument, MigrationReport), MigrateError> {
    let Value::Object(mut incoming) = value else {
        return Err(MigrateError::NotAnObject);
    };
    let mut report = MigrationReport {
        source_version: incoming.get("version").and_then(Value::as_u64),
        ..MigrationReport::default()
    };

    let id = incoming
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .unwrap_or("imported")
        .to_string();
    let raw_slides = match incoming.remove("slides") {
        Some(Value::Array(slides)) => slides,
        _ => Vec::new(),
    };
    clean_optional_fields(&mut incoming);

    let defaults = serde_json::to_value(CarouselDocument::new_empty(id))
        .map_err(|e| MigrateError::Deserialize(e.to_string()))?;
    let mut merged = merge(defaults, Value::Object(incoming));
    if let Some(obj) = merged.as_object_mut() {
        obj.insert("version".into(), SCHEMA_VERSION.into());
        obj.insert("slides".into(), Value::Array(Vec::new()));
    }

    let mut document: CarouselDocument =
        serde_json::from_value(merged).map_err(|e| MigrateError::Deserialize(e.to_string()))?;

    let mut ids = IdAllocator::new();
    for (index, raw) in raw_slides.into_iter().enumerate() {
        let Some(mut slide) = migrate_slide(index, raw, &mut report) else {
            continue;
        };
        report.regenerated_ids += ids.adopt(&mut slide);
        report.sanitized_fields += sanitize_slide(&mut slide);
        document.slides.push(slide);
    }

    if !report.is_clean() {
        tracing::warn!(
            id = %document.id,
            dropped_elements = report.dropped_elements,
            regenerated_ids = report.regenerated_ids,
            sanitized_fields = report.sanitized_fields,
            defaulted_layouts = report.defaulted_layouts,
            "Document repaired during migration"
        );
    }
    Ok((document, report))
}

/// Deep-merge `incoming` onto `defaults`. Objects merge key by key; a value
/// whose JSON type differs from the default (or is null) is replaced by the
/// default. Keys the defaults do not know are kept as they are.
fn merge(defaults: Value, incoming: Value) -> Value {
    match (defaults, incoming) {
        (Value::Object(mut base), Value::Object(over)) => {
            for (key, value) in over {
                let merged = match base.remove(&key) {
                    Some(default) => merge(default, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (default, Value::Null) => default,
        (default, value) if same_kind(&default, &value) => value,
        (default, _) => default,
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Fix top-level fields that have no default to merge against.
fn clean_optional_fields(obj: &mut Map<String, Value>) {
    if !obj.get("description").map_or(true, Value::is_string) {
        obj.remove("description");
    }
    match obj.get_mut("tags") {
        Some(Value::Array(tags)) => tags.retain(Value::is_string),
        Some(_) => {
            obj.remove("tags");
        }
        None => {}
    }
    for key in ["$schema", "generator", "generatorVersion"] {
        if !obj.get(key).map_or(true, Value::is_string) {
            obj.remove(key);
        }
    }
    if !matches!(obj.get("format").and_then(Value::as_str), None | Some("carousel" | "single-post")) {
        obj.remove("format");
    }
    if let Some(Value::Object(footer)) = obj.get_mut("footer") {
        if !matches!(footer.get("style").and_then(Value::as_str), None | Some("uppercase" | "normal")) {
            footer.remove("style");
        }
    }
    if let Some(Value::Object(theme)) = obj.get_mut("theme") {
        if !theme.get("elementGap").map_or(true, Value::is_number) {
            theme.remove("elementGap");
        }
    }
}

fn migrate_slide(index: usize, raw: Value, report: &mut MigrationReport) -> Option<Slide> {
    let Value::Object(mut raw) = raw else {
        tracing::warn!(index, "Skipping slide that is not an object");
        return None;
    };
    let id = match raw.get("id").and_then(Value::as_str) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("slide-{}", index + 1),
    };
    let layout = match raw.get("layout").and_then(Value::as_str).and_then(SlideLayout::parse) {
        Some(layout) => layout,
        None => {
            report.defaulted_layouts += 1;
            SlideLayout::TitleBody
        }
    };
    let elements = match raw.remove("elements") {
        Some(Value::Array(elements)) => elements,
        _ => Vec::new(),
    };
    let elements = elements
        .into_iter()
        .filter_map(|raw| {
            let element = migrate_element(raw);
            if element.is_none() {
                report.dropped_elements += 1;
            }
            element
        })
        .collect();

    let mut slide = Slide::from_parts(id.into(), layout, elements);
    let string = |key: &str| raw.get(key).and_then(Value::as_str).map(str::to_string);
    slide.background = string("background");
    slide.background_image = string("backgroundImage");
    slide.background_position = string("backgroundPosition");
    Some(slide)
}

fn migrate_element(raw: Value) -> Option<SlideElement> {
    let Value::Object(mut obj) = raw else {
        return None;
    };
    let kind = obj.get("type").and_then(Value::as_str)?.to_string();
    if !ElementKind::TYPE_NAMES.contains(&kind.as_str()) {
        tracing::warn!(element_type = %kind, "Dropping element of unknown type");
        return None;
    }
    if !obj.get("id").is_some_and(Value::is_string) {
        // Empty ids are replaced when the slide is adopted.
        obj.insert("id".into(), Value::String(String::new()));
    }

    let mut default_string = |key: &str, default: &str| {
        if !obj.get(key).is_some_and(Value::is_string) {
            obj.insert(key.into(), Value::String(default.to_string()));
        }
    };
    match kind.as_str() {
        "image" => default_string("src", ""),
        "overlay" => default_string("fill", "rgba(0,0,0,0.5)"),
        "divider" | "spacer" | "stat" => {}
        _ => default_string("content", ""),
    }
    match kind.as_str() {
        "heading" => {
            let level = obj
                .get("level")
                .and_then(Value::as_f64)
                .map_or(2, |level| level.round().clamp(1.0, 3.0) as u8);
            obj.insert("level".into(), level.into());
        }
        "spacer" => {
            if !obj.get("height").is_some_and(Value::is_number) {
                obj.insert("height".into(), 40.into());
            }
        }
        "stat" => {
            let items = match obj.remove("items") {
                Some(Value::Array(items)) => items
                    .into_iter()
                    .filter(|item| {
                        item.get("value").is_some_and(Value::is_string)
                            && item.get("label").is_some_and(Value::is_string)
                    })
                    .collect(),
                _ => Vec::new(),
            };
            obj.insert("items".into(), Value::Array(items));
        }
        _ => {}
    }

    for key in ["x", "y", "w", "h", "rotation", "zIndex", "marginTop", "marginBottom", "fontSize", "size", "borderRadius"] {
        if obj.get(key).is_some_and(|value| !value.is_number()) {
            obj.remove(key);
        }
    }
    if obj.get("zIndex").is_some_and(|value| !value.is_i64()) {
        obj.remove("zIndex");
    }
    if !matches!(obj.get("textAlign").and_then(Value::as_str), None | Some("left" | "center" | "right")) {
        obj.remove("textAlign");
    }
    if !matches!(obj.get("variant").and_then(Value::as_str), None | Some("area" | "background" | "inline")) {
        obj.remove("variant");
    }
    for key in ["alt", "objectPosition", "attribution", "icon"] {
        if obj.get(key).is_some_and(|value| !value.is_string()) {
            obj.remove(key);
        }
    }

    match serde_json::from_value(Value::Object(obj)) {
        Ok(element) => Some(element),
        Err(e) => {
            tracing::warn!(element_type = %kind, error = %e, "Dropping malformed element");
            None
        }
    }
}

/// Sanitize every text field on `slide`. Returns how many changed.
fn sanitize_slide(slide: &mut Slide) -> usize {
    let mut changed = 0;
    let mut clean = |text: &mut String| {
        let sanitized = markup::sanitize(text);
        if sanitized != *text {
            *text = sanitized;
            changed += 1;
        }
    };
    for element in slide.elements_mut() {
        if let Some(text) = element.kind.text_mut() {
            clean(text);
        }
        match &mut element.kind {
            ElementKind::Quote {
                attribution: Some(attribution),
                ..
            } => clean(attribution),
            ElementKind::Stat { items } => {
                for item in items {
                    clean(&mut item.value);
                    clean(&mut item.label);
                }
            }
            _ => {}
        }
    }
    changed
}
