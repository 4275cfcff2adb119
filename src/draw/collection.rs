//! Ordered annotation collection with save tracking.

use super::shape::{Annotation, AnnotationId};
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;

/// All committed annotations for the image currently being edited.
///
/// Insertion order is z-order (first = bottom layer). Every mutation bumps a
/// revision counter; the collection is dirty while that revision differs from
/// the last revision confirmed as saved.
#[derive(Debug, Clone, Default)]
pub struct AnnotationCollection {
    annotations: Vec<Annotation>,
    revision: u64,
    saved_revision: u64,
}

impl AnnotationCollection {
    /// Creates a new empty, clean collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the collection with the `annotations` array of a persisted payload.
    ///
    /// Absent, `null`, or malformed payloads yield an empty collection. Entries
    /// that fail to parse are skipped with a warning. The result is clean.
    pub fn hydrate(&mut self, payload: Option<&Value>) {
        let annotations = payload
            .and_then(|value| value.get("annotations"))
            .map(parse_annotations)
            .unwrap_or_default();
        self.reset_to(annotations);
    }

    /// Replaces the collection with already-parsed annotations. The result is clean.
    ///
    /// Later duplicates of an id are dropped. The revision keeps counting up, so
    /// a save confirmed for a revision from before the reset cannot mark later
    /// edits as saved.
    pub fn reset_to(&mut self, annotations: Vec<Annotation>) {
        let mut seen = HashSet::new();
        self.annotations = annotations
            .into_iter()
            .filter(|annotation| seen.insert(annotation.id().clone()))
            .collect();
        self.revision += 1;
        self.saved_revision = self.revision;
        debug!("Hydrated {} annotation(s)", self.annotations.len());
    }

    /// Adds an annotation on top of the existing ones.
    pub fn append(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
        self.revision += 1;
    }

    /// Removes every annotation. Always counts as a mutation, even when empty.
    pub fn clear_all(&mut self) {
        self.annotations.clear();
        self.revision += 1;
    }

    /// Whether anything changed since hydration or the last confirmed save.
    pub fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    /// Read-only view in z-order.
    pub fn snapshot(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Current mutation counter.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Records that the state at `revision` has been persisted.
    ///
    /// Saves can complete after further edits; a stale revision never moves the
    /// saved marker backwards, and later edits keep the collection dirty.
    pub fn mark_saved(&mut self, revision: u64) {
        if revision > self.saved_revision && revision <= self.revision {
            self.saved_revision = revision;
        }
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.annotations.iter().any(|a| a.id() == id)
    }
}

/// Parses a JSON `annotations` array, dropping entries that are malformed,
/// violate shape invariants, or repeat an earlier id.
pub(crate) fn parse_annotations(value: &Value) -> Vec<Annotation> {
    let Some(entries) = value.as_array() else {
        warn!("Ignoring annotations that are not a JSON array");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let annotation = match serde_json::from_value::<Annotation>(entry.clone()) {
            Ok(annotation) => annotation,
            Err(err) => {
                warn!("Skipping annotation #{index}: {err}");
                continue;
            }
        };
        if let Err(reason) = annotation.validate() {
            warn!("Skipping annotation #{index} ({}): {reason}", annotation.id());
            continue;
        }
        if !seen.insert(annotation.id().clone()) {
            warn!("Skipping annotation #{index}: duplicate id {}", annotation.id());
            continue;
        }
        parsed.push(annotation);
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::color::RED;
    use crate::draw::shape::{Point, ShapeKind, Style};
    use serde_json::json;

    fn pen(id: &str) -> Annotation {
        Annotation::seeded(
            ShapeKind::Freehand,
            id.into(),
            Point::new(1.0, 1.0),
            Style {
                stroke: RED,
                stroke_width: 2.0,
                fill: None,
            },
        )
    }

    #[test]
    fn hydrate_single_circle() {
        let mut collection = AnnotationCollection::new();
        let payload = json!({
            "annotations": [{
                "id": "a1", "type": "circle", "x": 5, "y": 5, "radius": 12,
                "stroke": "#10B981", "strokeWidth": 2
            }]
        });
        collection.hydrate(Some(&payload));

        let snapshot = collection.snapshot();
        assert_eq!(snapshot.len(), 1);
        match &snapshot[0] {
            Annotation::Circle {
                id, x, y, radius, ..
            } => {
                assert_eq!(id.as_str(), "a1");
                assert_eq!((*x, *y, *radius), (5.0, 5.0, 12.0));
            }
            other => panic!("expected circle, got {other:?}"),
        }
        assert!(!collection.is_dirty());
    }

    #[test]
    fn hydrate_absent_or_malformed_is_empty() {
        let mut collection = AnnotationCollection::new();
        collection.append(pen("x"));

        collection.hydrate(None);
        assert!(collection.is_empty());

        collection.hydrate(Some(&json!({})));
        assert!(collection.is_empty());

        collection.hydrate(Some(&Value::Null));
        assert!(collection.is_empty());

        collection.hydrate(Some(&json!({ "annotations": "nope" })));
        assert!(collection.is_empty());
        assert!(!collection.is_dirty());
    }

    #[test]
    fn hydrate_skips_bad_entries_and_duplicates() {
        let mut collection = AnnotationCollection::new();
        let payload = json!({
            "annotations": [
                { "id": "a", "type": "line", "points": [0, 0, 5, 5], "stroke": "#EF4444", "strokeWidth": 2 },
                { "id": "b", "type": "hexagon" },
                { "id": "a", "type": "line", "points": [1, 1], "stroke": "#EF4444", "strokeWidth": 2 },
                { "id": "c", "type": "circle", "x": 0, "y": 0, "radius": -4, "stroke": "#EF4444", "strokeWidth": 2 }
            ]
        });
        collection.hydrate(Some(&payload));
        assert_eq!(collection.len(), 1);
        assert_eq!(collection.snapshot()[0].id().as_str(), "a");
    }

    #[test]
    fn clear_all_marks_dirty_even_when_empty() {
        let mut collection = AnnotationCollection::new();
        assert!(!collection.is_dirty());
        collection.clear_all();
        assert!(collection.is_dirty());

        let mut populated = AnnotationCollection::new();
        populated.append(pen("1"));
        populated.mark_saved(populated.revision());
        populated.clear_all();
        assert_eq!(populated.len(), 0);
        assert!(populated.is_dirty());
    }

    #[test]
    fn mark_saved_only_covers_the_saved_revision() {
        let mut collection = AnnotationCollection::new();
        collection.append(pen("1"));
        let saved_at = collection.revision();
        collection.append(pen("2"));

        collection.mark_saved(saved_at);
        assert!(collection.is_dirty());

        collection.mark_saved(collection.revision());
        assert!(!collection.is_dirty());

        collection.mark_saved(saved_at);
        assert!(!collection.is_dirty());
    }

    #[test]
    fn reset_never_reuses_revisions() {
        let mut collection = AnnotationCollection::new();
        collection.append(pen("1"));
        let before_reset = collection.revision();

        collection.reset_to(Vec::new());
        assert!(!collection.is_dirty());
        assert!(collection.revision() > before_reset);

        collection.append(pen("2"));
        collection.mark_saved(before_reset);
        assert!(collection.is_dirty());
    }
}
