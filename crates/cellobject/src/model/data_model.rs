//! Immutable, sectioned data models.
//!
//! A [`DataModel`] is one version of a collection's contents. Construction is
//! the only mutation point: every change to what the container shows is made by
//! building a new model and handing it to the
//! [`UpdateScheduler`](crate::view::UpdateScheduler).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use cellobject_core::logging::targets;

use super::cell::{Cell, CellId};
use super::index::IndexPath;
use super::section::{Section, SectionLayout};
use crate::error::{ModelError, ModelResult};

/// An ordered sequence of sections with identity lookup.
///
/// Every cell identity appears at most once in a model; construction fails
/// with [`ModelError::DuplicateIdentity`] otherwise.
///
/// # Example
///
/// ```
/// use cellobject::model::{CellComponent, DataModel, IndexPath, Renderer, Section};
///
/// let a = CellComponent::new(Renderer::class("RowCell")).into_cell();
/// let b = CellComponent::new(Renderer::class("RowCell")).into_cell();
///
/// let model = DataModel::new(vec![Section::new(vec![a.clone(), b.clone()])])?;
///
/// assert_eq!(model.number_of_sections(), 1);
/// assert_eq!(model.number_of_items(0)?, 2);
/// assert_eq!(model.path_of(&b), Some(IndexPath::new(0, 1)));
/// assert!(model.item(IndexPath::new(0, 2)).is_err());
/// # Ok::<(), cellobject::ModelError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DataModel {
    sections: Vec<Section>,
    index: HashMap<CellId, IndexPath>,
}

impl DataModel {
    /// An empty model with no sections.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a model from ordered sections.
    pub fn new<I>(sections: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = Section>,
    {
        let sections: Vec<Section> = sections.into_iter().collect();
        let mut index = HashMap::with_capacity(sections.iter().map(Section::len).sum());

        for (section_idx, section) in sections.iter().enumerate() {
            for (item_idx, cell) in section.items().iter().enumerate() {
                let path = IndexPath::new(section_idx, item_idx);
                match index.entry(cell.id()) {
                    Entry::Vacant(slot) => {
                        slot.insert(path);
                    }
                    Entry::Occupied(existing) => {
                        tracing::debug!(
                            target: targets::MODEL,
                            cell = %cell.id(),
                            first = %existing.get(),
                            second = %path,
                            "rejecting model with duplicate cell identity"
                        );
                        return Err(ModelError::DuplicateIdentity {
                            id: cell.id(),
                            first: *existing.get(),
                            second: path,
                        });
                    }
                }
            }
        }

        tracing::trace!(
            target: targets::MODEL,
            sections = sections.len(),
            items = index.len(),
            "built data model"
        );
        Ok(Self { sections, index })
    }

    /// Builds a model from an owned list of sections.
    pub fn from_sections(sections: Vec<Section>) -> ModelResult<Self> {
        Self::new(sections)
    }

    /// Builds a one-section model.
    pub fn single_section(items: Vec<Cell>) -> ModelResult<Self> {
        Self::new([Section::new(items)])
    }

    /// Starts a builder.
    pub fn builder() -> DataModelBuilder {
        DataModelBuilder::new()
    }

    /// Number of sections.
    #[inline]
    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    /// Number of items in `section`.
    pub fn number_of_items(&self, section: usize) -> ModelResult<usize> {
        self.section(section).map(Section::len)
    }

    /// The item at `path`.
    pub fn item(&self, path: IndexPath) -> ModelResult<&Cell> {
        self.get(path).ok_or(ModelError::path_out_of_range(path))
    }

    /// The item at `path`, or `None` if the path is invalid.
    pub fn get(&self, path: IndexPath) -> Option<&Cell> {
        self.sections
            .get(path.section())
            .and_then(|section| section.items().get(path.item()))
    }

    /// The path of `cell`, or `None` if it is not in this model.
    #[inline]
    pub fn path_of(&self, cell: &Cell) -> Option<IndexPath> {
        self.path_of_id(cell.id())
    }

    /// The path of the cell with identity `id`.
    #[inline]
    pub fn path_of_id(&self, id: CellId) -> Option<IndexPath> {
        self.index.get(&id).copied()
    }

    /// Returns `true` if `cell` is in this model.
    pub fn contains(&self, cell: &Cell) -> bool {
        self.index.contains_key(&cell.id())
    }

    /// The section at `section`.
    pub fn section(&self, section: usize) -> ModelResult<&Section> {
        self.sections
            .get(section)
            .ok_or(ModelError::section_out_of_range(section, self.sections.len()))
    }

    /// All sections in order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// The layout overrides of `section`, if it has any.
    pub fn section_layout(&self, section: usize) -> Option<&SectionLayout> {
        self.sections.get(section).and_then(Section::layout)
    }

    /// The index of the first section named `name`.
    pub fn section_index(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name() == Some(name))
    }

    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the model has no items.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Iterates over every item with its path, in path order.
    pub fn items(&self) -> impl Iterator<Item = (IndexPath, &Cell)> + '_ {
        self.sections
            .iter()
            .enumerate()
            .flat_map(|(section_idx, section)| {
                section
                    .items()
                    .iter()
                    .enumerate()
                    .map(move |(item_idx, cell)| (IndexPath::new(section_idx, item_idx), cell))
            })
    }

    /// Builds a new model without `cell`.
    pub fn without(&self, cell: &Cell) -> ModelResult<Self> {
        let path = self
            .path_of(cell)
            .ok_or(ModelError::UnknownCell { id: cell.id() })?;

        let mut sections = self.sections.clone();
        sections[path.section()].remove(path.item());

        let mut index = self.index.clone();
        index.remove(&cell.id());
        for (i, item) in sections[path.section()].items()[path.item()..].iter().enumerate() {
            index.insert(item.id(), IndexPath::new(path.section(), path.item() + i));
        }

        Ok(Self { sections, index })
    }
}

/// Incremental construction of a [`DataModel`].
///
/// ```
/// use cellobject::model::{CellComponent, DataModel, Renderer, SectionLayout};
///
/// let row = || CellComponent::new(Renderer::class("RowCell")).into_cell();
///
/// let model = DataModel::builder()
///     .section(vec![row(), row()])
///     .named_section("more", vec![row()])
///     .layout(SectionLayout::new().with_line_spacing(4.0))
///     .build()?;
///
/// assert_eq!(model.number_of_sections(), 2);
/// assert_eq!(model.section_index("more"), Some(1));
/// assert!(model.section_layout(1).is_some());
/// # Ok::<(), cellobject::ModelError>(())
/// ```
#[derive(Debug, Default)]
pub struct DataModelBuilder {
    sections: Vec<Section>,
}

impl DataModelBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a section holding `items`.
    pub fn section(mut self, items: Vec<Cell>) -> Self {
        self.sections.push(Section::new(items));
        self
    }

    /// Appends a named section holding `items`.
    pub fn named_section(mut self, name: impl Into<String>, items: Vec<Cell>) -> Self {
        self.sections.push(Section::new(items).with_name(name));
        self
    }

    /// Appends a prepared section.
    pub fn push(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// Sets layout overrides on the most recently added section.
    ///
    /// Does nothing if no section has been added yet.
    pub fn layout(mut self, layout: SectionLayout) -> Self {
        if let Some(last) = self.sections.pop() {
            self.sections.push(last.with_layout(layout));
        }
        self
    }

    /// Validates identities and builds the model.
    pub fn build(self) -> ModelResult<DataModel> {
        DataModel::new(self.sections)
    }
}

static_assertions::assert_impl_all!(DataModel: Send, Sync);
