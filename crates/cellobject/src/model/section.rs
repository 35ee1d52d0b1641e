//! Sections and their layout overrides.

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use crate::geometry::EdgeInsets;

/// Per-section layout values.
///
/// Every field is optional; an unset field falls back to the container-wide
/// default from [`CollectionConfig`](crate::CollectionConfig).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionLayout {
    /// Minimum spacing between successive lines of items.
    pub minimum_line_spacing: Option<f32>,
    /// Minimum spacing between items on the same line.
    pub minimum_interitem_spacing: Option<f32>,
    /// Insets around the section's content.
    pub inset: Option<EdgeInsets>,
}

impl SectionLayout {
    /// Creates layout with no overrides.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum line spacing.
    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.minimum_line_spacing = Some(spacing);
        self
    }

    /// Sets the minimum inter-item spacing.
    pub fn with_interitem_spacing(mut self, spacing: f32) -> Self {
        self.minimum_interitem_spacing = Some(spacing);
        self
    }

    /// Sets the section inset.
    pub fn with_inset(mut self, inset: EdgeInsets) -> Self {
        self.inset = Some(inset);
        self
    }

    /// Returns `true` if no field is overridden.
    pub fn is_empty(&self) -> bool {
        self.minimum_line_spacing.is_none()
            && self.minimum_interitem_spacing.is_none()
            && self.inset.is_none()
    }

    /// Fills every unset field from `defaults`.
    pub fn or(self, defaults: SectionLayout) -> Self {
        Self {
            minimum_line_spacing: self.minimum_line_spacing.or(defaults.minimum_line_spacing),
            minimum_interitem_spacing: self
                .minimum_interitem_spacing
                .or(defaults.minimum_interitem_spacing),
            inset: self.inset.or(defaults.inset),
        }
    }
}

/// The kind of supplementary view attached to a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplementaryKind {
    Header,
    Footer,
}

/// An ordered group of items sharing layout overrides.
///
/// ```
/// use cellobject::model::{CellComponent, Renderer, Section, SectionLayout};
///
/// let section = Section::new(vec![
///     CellComponent::new(Renderer::class("RowCell")).into_cell(),
/// ])
/// .with_name("recent")
/// .with_layout(SectionLayout::new().with_line_spacing(8.0));
///
/// assert_eq!(section.len(), 1);
/// assert_eq!(section.name(), Some("recent"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Section {
    items: Vec<Cell>,
    name: Option<String>,
    layout: Option<SectionLayout>,
    header: Option<Cell>,
    footer: Option<Cell>,
}

impl Section {
    /// Creates a section holding `items`.
    pub fn new(items: Vec<Cell>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Names the section.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the layout overrides.
    pub fn with_layout(mut self, layout: SectionLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Sets the header cell.
    pub fn with_header(mut self, header: Cell) -> Self {
        self.header = Some(header);
        self
    }

    /// Sets the footer cell.
    pub fn with_footer(mut self, footer: Cell) -> Self {
        self.footer = Some(footer);
        self
    }

    /// Appends an item.
    pub fn push(&mut self, item: Cell) {
        self.items.push(item);
    }

    /// Removes and returns the item at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Cell {
        self.items.remove(index)
    }

    /// The section's items in order.
    pub fn items(&self) -> &[Cell] {
        &self.items
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the section has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The section name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The layout overrides, if any.
    pub fn layout(&self) -> Option<&SectionLayout> {
        self.layout.as_ref()
    }

    /// The supplementary cell of the given kind.
    pub fn supplementary(&self, kind: SupplementaryKind) -> Option<&Cell> {
        match kind {
            SupplementaryKind::Header => self.header.as_ref(),
            SupplementaryKind::Footer => self.footer.as_ref(),
        }
    }
}

impl FromIterator<Cell> for Section {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
