//! Structural diffing between two data models.
//!
//! [`diff`] compares two [`DataModel`]s and produces the [`EditBatch`] that
//! takes a rendering widget from the first to the second. Sections are compared
//! by position; items are matched by identity.
//!
//! Index conventions follow batch-update semantics: deleted, reloaded and
//! moved-from paths are positions in the old model; inserted and moved-to
//! paths are positions in the new model. [`RenderState`] replays a batch with
//! those semantics so callers can check that a batch really produces the new
//! model.

use std::collections::{HashMap, HashSet};

use cellobject_core::logging::{PerfSpan, span_names, targets};

use super::cell::CellId;
use super::data_model::DataModel;
use super::index::IndexPath;
use crate::error::BatchError;

/// A single structural change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperation {
    /// Remove the item at this old-model path.
    DeleteItem(IndexPath),
    /// Insert the item found at this new-model path.
    InsertItem(IndexPath),
    /// Move an item from an old-model path to a new-model path.
    MoveItem { from: IndexPath, to: IndexPath },
    /// Replace the item at this path with the new model's item at the same path.
    ReloadItem(IndexPath),
    /// Remove a trailing section.
    DeleteSection(usize),
    /// Append a section.
    InsertSection(usize),
}

/// An ordered set of edit operations applied together.
///
/// Operations are grouped by kind and always iterate in the order
/// item deletes, item inserts, item moves, item reloads, section deletes,
/// section inserts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBatch {
    deleted_items: Vec<IndexPath>,
    inserted_items: Vec<IndexPath>,
    moved_items: Vec<(IndexPath, IndexPath)>,
    reloaded_items: Vec<IndexPath>,
    deleted_sections: Vec<usize>,
    inserted_sections: Vec<usize>,
}

impl EditBatch {
    /// A batch with no operations. Does not allocate.
    pub const fn empty() -> Self {
        Self {
            deleted_items: Vec::new(),
            inserted_items: Vec::new(),
            moved_items: Vec::new(),
            reloaded_items: Vec::new(),
            deleted_sections: Vec::new(),
            inserted_sections: Vec::new(),
        }
    }

    /// Adds an operation to its group.
    pub fn push(&mut self, operation: EditOperation) {
        match operation {
            EditOperation::DeleteItem(path) => self.deleted_items.push(path),
            EditOperation::InsertItem(path) => self.inserted_items.push(path),
            EditOperation::MoveItem { from, to } => self.moved_items.push((from, to)),
            EditOperation::ReloadItem(path) => self.reloaded_items.push(path),
            EditOperation::DeleteSection(section) => self.deleted_sections.push(section),
            EditOperation::InsertSection(section) => self.inserted_sections.push(section),
        }
    }

    pub fn deleted_items(&self) -> &[IndexPath] {
        &self.deleted_items
    }

    pub fn inserted_items(&self) -> &[IndexPath] {
        &self.inserted_items
    }

    /// `(from, to)` pairs.
    pub fn moved_items(&self) -> &[(IndexPath, IndexPath)] {
        &self.moved_items
    }

    pub fn reloaded_items(&self) -> &[IndexPath] {
        &self.reloaded_items
    }

    pub fn deleted_sections(&self) -> &[usize] {
        &self.deleted_sections
    }

    pub fn inserted_sections(&self) -> &[usize] {
        &self.inserted_sections
    }

    /// Total number of operations.
    pub fn len(&self) -> usize {
        self.deleted_items.len()
            + self.inserted_items.len()
            + self.moved_items.len()
            + self.reloaded_items.len()
            + self.deleted_sections.len()
            + self.inserted_sections.len()
    }

    /// Returns `true` if the batch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the operations in application order.
    pub fn iter(&self) -> impl Iterator<Item = EditOperation> + '_ {
        let deletes = self.deleted_items.iter().map(|&p| EditOperation::DeleteItem(p));
        let inserts = self.inserted_items.iter().map(|&p| EditOperation::InsertItem(p));
        let moves = self
            .moved_items
            .iter()
            .map(|&(from, to)| EditOperation::MoveItem { from, to });
        let reloads = self.reloaded_items.iter().map(|&p| EditOperation::ReloadItem(p));
        let section_deletes = self
            .deleted_sections
            .iter()
            .map(|&s| EditOperation::DeleteSection(s));
        let section_inserts = self
            .inserted_sections
            .iter()
            .map(|&s| EditOperation::InsertSection(s));

        deletes
            .chain(inserts)
            .chain(moves)
            .chain(reloads)
            .chain(section_deletes)
            .chain(section_inserts)
    }

    /// Collects the operations in application order.
    pub fn operations(&self) -> Vec<EditOperation> {
        self.iter().collect()
    }
}

impl FromIterator<EditOperation> for EditBatch {
    fn from_iter<I: IntoIterator<Item = EditOperation>>(iter: I) -> Self {
        let mut batch = Self::empty();
        for operation in iter {
            batch.push(operation);
        }
        batch
    }
}

impl Extend<EditOperation> for EditBatch {
    fn extend<I: IntoIterator<Item = EditOperation>>(&mut self, iter: I) {
        for operation in iter {
            self.push(operation);
        }
    }
}

/// Computes the edit batch that turns `old` into `new`.
///
/// Passing the same model instance twice returns an empty batch without
/// allocating.
///
/// # Example
///
/// ```
/// use cellobject::model::{diff, CellComponent, DataModel, EditOperation, IndexPath, Renderer};
///
/// let row = || CellComponent::new(Renderer::class("RowCell")).into_cell();
/// let (a, b, c, d) = (row(), row(), row(), row());
///
/// let old = DataModel::single_section(vec![a, b.clone(), c.clone()])?;
/// let new = DataModel::single_section(vec![b, c, d])?;
///
/// let batch = diff(&old, &new);
/// assert_eq!(
///     batch.operations(),
///     vec![
///         EditOperation::DeleteItem(IndexPath::new(0, 0)),
///         EditOperation::InsertItem(IndexPath::new(0, 2)),
///     ]
/// );
/// # Ok::<(), cellobject::ModelError>(())
/// ```
pub fn diff(old: &DataModel, new: &DataModel) -> EditBatch {
    if std::ptr::eq(old, new) {
        return EditBatch::empty();
    }

    let _span = PerfSpan::new(span_names::DIFF);

    let old_count = old.number_of_sections();
    let new_count = new.number_of_sections();
    let shared = old_count.min(new_count);
    let survives = |path: IndexPath| path.section() < shared;

    let mut deletes = Vec::new();
    let mut moves = Vec::new();
    for (section_idx, section) in old.sections().iter().enumerate().take(shared) {
        // `(old item, new item)` for identities that stay in this section.
        let mut staying = Vec::new();
        for (item_idx, cell) in section.items().iter().enumerate() {
            let from = IndexPath::new(section_idx, item_idx);
            match new.path_of(cell) {
                Some(to) if !survives(to) => deletes.push(from),
                None => deletes.push(from),
                Some(to) if to.section() != section_idx => moves.push((from, to)),
                Some(to) => staying.push((item_idx, to.item())),
            }
        }

        let stationary = stationary_items(&staying);
        moves.extend(
            staying
                .iter()
                .zip(stationary)
                .filter(|&(_, stays)| !stays)
                .map(|(&(from, to), _)| {
                    (
                        IndexPath::new(section_idx, from),
                        IndexPath::new(section_idx, to),
                    )
                }),
        );
    }

    let mut inserts: Vec<IndexPath> = new
        .items()
        .filter(|&(path, cell)| {
            survives(path) && old.path_of(cell).is_none_or(|from| !survives(from))
        })
        .map(|(path, _)| path)
        .collect();

    let mut reloads = Vec::new();
    if !deletes.is_empty() && !inserts.is_empty() {
        let inserted: HashSet<IndexPath> = inserts.iter().copied().collect();
        reloads.extend(deletes.iter().copied().filter(|p| inserted.contains(p)));
        if !reloads.is_empty() {
            let reloaded: HashSet<IndexPath> = reloads.iter().copied().collect();
            deletes.retain(|p| !reloaded.contains(p));
            inserts.retain(|p| !reloaded.contains(p));
        }
    }

    let batch = EditBatch {
        deleted_items: deletes,
        inserted_items: inserts,
        moved_items: moves,
        reloaded_items: reloads,
        deleted_sections: (shared..old_count).collect(),
        inserted_sections: (shared..new_count).collect(),
    };

    tracing::debug!(
        target: targets::DIFF,
        deleted = batch.deleted_items.len(),
        inserted = batch.inserted_items.len(),
        moved = batch.moved_items.len(),
        reloaded = batch.reloaded_items.len(),
        deleted_sections = batch.deleted_sections.len(),
        inserted_sections = batch.inserted_sections.len(),
        "computed edit batch"
    );

    batch
}

/// Picks the staying items of one section that need no move.
///
/// `staying` holds `(old item, new item)` pairs in old order. An item whose
/// position is unchanged never moves. Of the others, the longest run that is
/// increasing in new order and does not cross an unchanged item stays put as
/// well; everything else is moved.
fn stationary_items(staying: &[(usize, usize)]) -> Vec<bool> {
    let mut stays: Vec<bool> = staying.iter().map(|&(from, to)| from == to).collect();

    // Unchanged positions, ascending. An item may only stay if it sits
    // between the same pair of unchanged items before and after.
    let fixed: Vec<usize> = staying
        .iter()
        .filter(|(from, to)| from == to)
        .map(|&(from, _)| from)
        .collect();
    let gap = |index: usize| fixed.partition_point(|&f| f < index);
    let candidates: Vec<usize> = (0..staying.len())
        .filter(|&i| !stays[i] && gap(staying[i].0) == gap(staying[i].1))
        .collect();

    // Longest increasing subsequence of new positions, patience style.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; candidates.len()];
    for (k, &i) in candidates.iter().enumerate() {
        let to = staying[i].1;
        let slot = tails.partition_point(|&t| staying[candidates[t]].1 < to);
        if slot > 0 {
            previous[k] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(k);
        } else {
            tails[slot] = k;
        }
    }

    let mut next = tails.last().copied();
    while let Some(k) = next {
        stays[candidates[k]] = true;
        next = previous[k];
    }
    stays
}

/// The identities a widget shows, section by section.
///
/// A `RenderState` mirrors what a widget holds after it has loaded a model.
/// [`apply`](Self::apply) replays an [`EditBatch`] with batch-update
/// semantics, pulling inserted and reloaded items from the target model the
/// way a widget pulls them from its data source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
    sections: Vec<Vec<CellId>>,
}

impl RenderState {
    /// The state of a widget that has loaded `model` from scratch.
    pub fn from_model(model: &DataModel) -> Self {
        let sections = model
            .sections()
            .iter()
            .map(|section| section.items().iter().map(|cell| cell.id()).collect())
            .collect();
        Self { sections }
    }

    pub fn number_of_sections(&self) -> usize {
        self.sections.len()
    }

    /// The identities shown in `section`.
    pub fn section(&self, section: usize) -> Option<&[CellId]> {
        self.sections.get(section).map(Vec::as_slice)
    }

    /// Applies `batch`, sourcing new items from `target`.
    pub fn apply(&self, batch: &EditBatch, target: &DataModel) -> Result<Self, BatchError> {
        let old_count = self.sections.len();

        let mut deleted_sections = HashSet::new();
        for &section in batch.deleted_sections() {
            if section >= old_count {
                return Err(BatchError::SectionOutOfRange {
                    operation: "delete section",
                    section,
                    count: old_count,
                });
            }
            deleted_sections.insert(section);
        }

        // Pre-update phase: every old position may be vacated at most once.
        let mut vacated: HashMap<IndexPath, &'static str> = HashMap::new();
        let mut vacate = |operation: &'static str, path: IndexPath| -> Result<(), BatchError> {
            let len = self.sections.get(path.section()).map(Vec::len).ok_or(
                BatchError::SectionOutOfRange {
                    operation,
                    section: path.section(),
                    count: old_count,
                },
            )?;
            if path.item() >= len {
                return Err(BatchError::PathOutOfRange { operation, path });
            }
            if deleted_sections.contains(&path.section()) && operation != "delete" {
                return Err(BatchError::Conflict {
                    phase: "section delete",
                    path,
                });
            }
            if vacated.insert(path, operation).is_some() {
                return Err(BatchError::Conflict {
                    phase: "pre-update",
                    path,
                });
            }
            Ok(())
        };
        for &path in batch.deleted_items() {
            vacate("delete", path)?;
        }
        for &path in batch.reloaded_items() {
            vacate("reload", path)?;
        }
        for &(from, _) in batch.moved_items() {
            vacate("move", from)?;
        }

        // Post-update section layout: inserted sections at their indices,
        // surviving old sections fill the rest in order.
        let new_count = old_count - deleted_sections.len() + batch.inserted_sections().len();
        let mut layout: Vec<Option<Option<usize>>> = vec![None; new_count];
        for &section in batch.inserted_sections() {
            let slot = layout.get_mut(section).ok_or(BatchError::SectionOutOfRange {
                operation: "insert section",
                section,
                count: new_count,
            })?;
            if slot.replace(None).is_some() {
                return Err(BatchError::Conflict {
                    phase: "section insert",
                    path: IndexPath::new(section, 0),
                });
            }
        }
        let mut surviving = (0..old_count).filter(|s| !deleted_sections.contains(s));
        for slot in layout.iter_mut().filter(|slot| slot.is_none()) {
            *slot = Some(surviving.next());
        }
        if new_count != target.number_of_sections() {
            return Err(BatchError::SectionCountMismatch {
                expected: target.number_of_sections(),
                available: new_count,
            });
        }

        // Post-update phase: claim new positions.
        let mut claimed: Vec<HashMap<usize, CellId>> = vec![HashMap::new(); new_count];
        let inserted_section = |section: usize| matches!(layout.get(section), Some(Some(None)));
        let mut claim = |operation: &'static str,
                         path: IndexPath,
                         id: Option<CellId>|
         -> Result<(), BatchError> {
            let Some(cell) = target.get(path) else {
                return Err(BatchError::PathOutOfRange { operation, path });
            };
            let id = id.unwrap_or_else(|| cell.id());
            if inserted_section(path.section()) {
                return Err(BatchError::Conflict {
                    phase: "section insert",
                    path,
                });
            }
            if claimed[path.section()].insert(path.item(), id).is_some() {
                return Err(BatchError::Conflict {
                    phase: "post-update",
                    path,
                });
            }
            Ok(())
        };
        for &path in batch.inserted_items() {
            claim("insert", path, None)?;
        }
        for &path in batch.reloaded_items() {
            claim("reload", path, None)?;
        }
        for &(from, to) in batch.moved_items() {
            let id = self.sections[from.section()][from.item()];
            claim("move", to, Some(id))?;
        }

        let mut sections = Vec::with_capacity(new_count);
        for (new_idx, source) in layout.into_iter().enumerate() {
            let expected = target.sections()[new_idx].len();
            let Some(Some(old_idx)) = source else {
                sections.push(
                    target.sections()[new_idx]
                        .items()
                        .iter()
                        .map(|cell| cell.id())
                        .collect(),
                );
                continue;
            };

            let mut survivors = self.sections[old_idx]
                .iter()
                .enumerate()
                .filter(|(item, _)| !vacated.contains_key(&IndexPath::new(old_idx, *item)))
                .map(|(_, id)| *id);
            let claims = &claimed[new_idx];
            let available = self.sections[old_idx].len()
                - vacated.keys().filter(|p| p.section() == old_idx).count()
                + claims.len();
            if available != expected {
                return Err(BatchError::CountMismatch {
                    section: new_idx,
                    expected,
                    available,
                });
            }

            let mut items = Vec::with_capacity(expected);
            for item in 0..expected {
                match claims.get(&item) {
                    Some(id) => items.push(*id),
                    None => match survivors.next() {
                        Some(id) => items.push(id),
                        None => {
                            return Err(BatchError::CountMismatch {
                                section: new_idx,
                                expected,
                                available: items.len(),
                            });
                        }
                    },
                }
            }
            sections.push(items);
        }

        Ok(Self { sections })
    }
}
