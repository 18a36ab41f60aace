use crate::field::{FieldDescriptor, FieldSet};

///
/// SavedField
///
/// One row of a previously saved field configuration, already defaulted:
/// payload-evolution concerns (absent `sortable` on old payloads) are the
/// deserializer's problem, not this algorithm's.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SavedField {
    pub field_name: String,
    pub label: String,
    pub visible: bool,
    pub sortable: bool,
}

/// Merge a saved field list against a freshly discovered field set.
///
/// Saved entries still present in the discovered set come first, in saved
/// order, carrying their saved `visible`/`label`/`sortable`. Discovered
/// fields the saved list has never seen are appended in discovery order,
/// hidden by default so a schema addition never silently appears in a
/// previously saved view.
///
/// Deterministic and idempotent: reconciling an already-reconciled set
/// against the same discovered set returns an identical result. Saved
/// entries for fields the schema no longer has are dropped; fields never
/// present in the discovered set are never invented.
#[must_use]
pub fn reconcile(saved: &[SavedField], discovered: &FieldSet) -> FieldSet {
    let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(discovered.len());
    let mut seen: Vec<&str> = Vec::with_capacity(saved.len());

    for entry in saved {
        if !discovered.contains(&entry.field_name) {
            continue;
        }
        if seen.contains(&entry.field_name.as_str()) {
            continue;
        }
        seen.push(&entry.field_name);
        fields.push(FieldDescriptor {
            field_name: entry.field_name.clone(),
            label: entry.label.clone(),
            visible: entry.visible,
            sortable: entry.sortable,
        });
    }

    for field in discovered {
        if seen.contains(&field.field_name.as_str()) {
            continue;
        }
        fields.push(FieldDescriptor {
            field_name: field.field_name.clone(),
            label: field.label.clone(),
            visible: false,
            sortable: true,
        });
    }

    FieldSet::from_descriptors(fields)
}

impl From<&FieldDescriptor> for SavedField {
    fn from(field: &FieldDescriptor) -> Self {
        Self {
            field_name: field.field_name.clone(),
            label: field.label.clone(),
            visible: field.visible,
            sortable: field.sortable,
        }
    }
}

///
/// TESTS
///
