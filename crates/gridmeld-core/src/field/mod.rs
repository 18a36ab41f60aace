
use crate::error::FieldSetError;
use derive_more::Deref;
use serde::{Deserialize, Serialize};

///
/// FieldDescriptor
///
/// Name, label, visibility, and sortability for one configured column.
/// Identity is `field_name`; order lives in the containing `FieldSet`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub field_name: String,
    pub label: String,
    pub visible: bool,
    pub sortable: bool,
}

impl FieldDescriptor {
    /// Descriptor for a freshly discovered field: visible and sortable.
    #[must_use]
    pub fn discovered(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            visible: true,
            sortable: true,
        }
    }
}

///
/// DiscoveredField
/// Row shape returned by schema discovery.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DiscoveredField {
    pub field_name: String,
    pub label: String,
}

impl DiscoveredField {
    pub fn new(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
        }
    }
}

///
/// VisibilityFilter
/// Projection mode for the field list shown to the operator.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityFilter {
    #[default]
    All,
    Selected,
    Unselected,
}

impl VisibilityFilter {
    #[must_use]
    pub const fn matches(self, visible: bool) -> bool {
        match self {
            Self::All => true,
            Self::Selected => visible,
            Self::Unselected => !visible,
        }
    }
}

///
/// FieldSet
///
/// Ordered collection of field descriptors, unique by `field_name`.
/// Order is significant: it is both the selection-list order of compiled
/// queries and the display order of columns.
///
/// Mutation is explicit and keyed by field name; `FieldSet` does not
/// expose `DerefMut` to avoid accidental bypass of the uniqueness
/// invariant. Every mutator preserves uniqueness and total count.
///

#[repr(transparent)]
#[derive(Clone, Debug, Default, Deref, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldSet(Vec<FieldDescriptor>);

impl FieldSet {
    /// Create an empty field set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a field set from descriptors whose uniqueness the caller
    /// has already established.
    #[must_use]
    pub(crate) const fn from_descriptors(fields: Vec<FieldDescriptor>) -> Self {
        Self(fields)
    }

    /// Replace-wholesale constructor from a schema discovery result.
    ///
    /// Every entry starts visible and sortable, in discovery order.
    /// A later discovery row repeating an earlier `field_name` is dropped
    /// so the uniqueness invariant holds from the start.
    pub fn load_from(discovered: Vec<DiscoveredField>) -> Result<Self, FieldSetError> {
        if discovered.is_empty() {
            return Err(FieldSetError::EmptyResult);
        }

        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(discovered.len());
        for row in discovered {
            if fields.iter().any(|f| f.field_name == row.field_name) {
                continue;
            }
            fields.push(FieldDescriptor::discovered(row.field_name, row.label));
        }

        Ok(Self(fields))
    }

    /// Return the number of fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return an iterator over the descriptors in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldDescriptor> {
        self.0.iter()
    }

    /// Look up a descriptor by field name.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&FieldDescriptor> {
        self.0.iter().find(|f| f.field_name == field_name)
    }

    /// Returns `true` if a descriptor with this field name exists.
    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.get(field_name).is_some()
    }

    fn position(&self, field_name: &str) -> Option<usize> {
        self.0.iter().position(|f| f.field_name == field_name)
    }

    /// Set visibility for a field; no-op when the name is absent.
    pub fn set_visible(&mut self, field_name: &str, visible: bool) {
        if let Some(field) = self.0.iter_mut().find(|f| f.field_name == field_name) {
            field.visible = visible;
        }
    }

    /// Relabel a field; no-op when the name is absent.
    pub fn set_label(&mut self, field_name: &str, label: impl Into<String>) {
        if let Some(field) = self.0.iter_mut().find(|f| f.field_name == field_name) {
            field.label = label.into();
        }
    }

    /// Set sortability for a field; no-op when the name is absent.
    pub fn set_sortable(&mut self, field_name: &str, sortable: bool) {
        if let Some(field) = self.0.iter_mut().find(|f| f.field_name == field_name) {
            field.sortable = sortable;
        }
    }

    /// Swap a field with its predecessor; no-op at the top boundary.
    pub fn move_up(&mut self, field_name: &str) {
        if let Some(index) = self.position(field_name)
            && index > 0
        {
            self.0.swap(index, index - 1);
        }
    }

    /// Swap a field with its successor; no-op at the bottom boundary.
    pub fn move_down(&mut self, field_name: &str) {
        if let Some(index) = self.position(field_name)
            && index + 1 < self.0.len()
        {
            self.0.swap(index, index + 1);
        }
    }

    /// Remove `moved` and re-insert it immediately before or after
    /// `target`. No-op when either name is missing or they are equal.
    pub fn reorder(&mut self, moved: &str, target: &str, insert_after: bool) {
        if moved == target {
            return;
        }
        let Some(from) = self.position(moved) else {
            return;
        };
        if !self.contains(target) {
            return;
        }

        let field = self.0.remove(from);
        // Target position is re-resolved after the removal shifts indices.
        let Some(anchor) = self.position(target) else {
            // Unreachable given the membership check above; restore rather
            // than lose the entry if it ever trips.
            self.0.insert(from.min(self.0.len()), field);
            return;
        };

        let at = if insert_after { anchor + 1 } else { anchor };
        self.0.insert(at.min(self.0.len()), field);
    }

    /// Mark every field visible, order unchanged.
    pub fn select_all(&mut self) {
        for field in &mut self.0 {
            field.visible = true;
        }
    }

    /// Mark every field hidden, order unchanged.
    pub fn deselect_all(&mut self) {
        for field in &mut self.0 {
            field.visible = false;
        }
    }

    /// Borrowing projection of the fields matching `filter`, preserving
    /// relative order. Never copies or drifts from the underlying set.
    pub fn filtered_view(
        &self,
        filter: VisibilityFilter,
    ) -> impl Iterator<Item = &FieldDescriptor> {
        self.0.iter().filter(move |f| filter.matches(f.visible))
    }

    /// Borrowing projection of the visible fields in selection order.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.filtered_view(VisibilityFilter::Selected)
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for FieldSet {
    type Item = FieldDescriptor;
    type IntoIter = std::vec::IntoIter<FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
