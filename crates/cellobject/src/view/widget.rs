//! The boundary between the collection layer and a rendering widget.
//!
//! A rendering widget (a scrolling grid, a list, a test double) implements
//! [`CollectionWidget`]. It receives edit batches and reload requests from the
//! [`UpdateScheduler`](super::UpdateScheduler) and pulls everything it draws
//! from a [`CollectionDataSource`], normally a
//! [`CollectionView`](super::CollectionView).

use std::fmt;

use crate::error::Result;
use crate::geometry::{EdgeInsets, Size};
use crate::model::{Cell, CellView, EditBatch, IndexPath, Renderer, SupplementaryKind};

/// A one-shot token marking the end of a transition.
///
/// The scheduler hands a `Completion` to the widget with every batch. The
/// widget calls [`complete`](Self::complete) once the batch has finished
/// animating. Dropping the token without completing it means the widget went
/// away mid-transition: the scheduler stays busy and the request's completion
/// callback never runs.
pub struct Completion {
    generation: u64,
    finish: Box<dyn FnOnce() + Send>,
}

impl Completion {
    pub(crate) fn new<F>(generation: u64, finish: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            generation,
            finish: Box::new(finish),
        }
    }

    /// The transition this token belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Signals that the transition has finished.
    pub fn complete(self) {
        (self.finish)();
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

/// A rendering widget driven by the collection layer.
///
/// Only the first three methods are required; the rest default to no-ops for
/// widgets that do not support them.
pub trait CollectionWidget: Send + Sync {
    /// Discards everything shown and reloads from the data source.
    fn reload_all(&self);

    /// Applies `batch` as one animated update and calls
    /// [`Completion::complete`] when the animation ends.
    fn apply_batch(&self, batch: EditBatch, completion: Completion);

    /// The widget's current bounds.
    fn bounds(&self) -> Size;

    /// Makes `renderer` available for dequeuing.
    ///
    /// Called before every dequeue; registering the same renderer again must
    /// be harmless.
    fn register_renderer(&self, _renderer: &Renderer) {}

    /// Reloads the items at `paths` without animation.
    fn reload_items(&self, _paths: &[IndexPath]) {}

    /// Marks the layout dirty so sizes are queried again.
    fn invalidate_layout(&self) {}

    /// Clears the selection of the item at `path`.
    fn deselect_item(&self, _path: IndexPath, _animated: bool) {}

    /// Runs `f` on the visible cell at `path`.
    ///
    /// Returns `false` if no cell is visible there.
    fn with_visible_cell(&self, _path: IndexPath, _f: &mut dyn FnMut(&mut dyn CellView)) -> bool {
        false
    }
}

/// Everything a widget pulls while drawing the collection.
///
/// Paths are interpreted against the currently displayed model.
pub trait CollectionDataSource {
    fn number_of_sections(&self) -> usize;

    fn number_of_items(&self, section: usize) -> Result<usize>;

    /// The renderer for the item at `path`, registered with the widget.
    fn renderer_for_item(&self, path: IndexPath) -> Result<Renderer>;

    /// Configures a dequeued cell for the item at `path`.
    fn configure_cell(&self, path: IndexPath, cell: &mut dyn CellView) -> Result<()>;

    /// The size of the item at `path`.
    fn size_for_item(&self, path: IndexPath) -> Result<Size>;

    fn minimum_line_spacing(&self, section: usize) -> f32;

    fn minimum_interitem_spacing(&self, section: usize) -> f32;

    fn inset(&self, section: usize) -> EdgeInsets;

    fn should_select(&self, path: IndexPath) -> bool;

    fn did_select(&self, path: IndexPath);

    fn did_deselect(&self, path: IndexPath);

    fn will_display(&self, path: IndexPath, cell: &mut dyn CellView);

    fn did_end_display(&self, path: IndexPath, cell: &mut dyn CellView);

    /// The header or footer cell of `section`, if it has one.
    fn supplementary_cell(&self, _section: usize, _kind: SupplementaryKind) -> Option<Cell> {
        None
    }
}
