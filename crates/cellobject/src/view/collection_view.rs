//! The adapter between cell objects and a rendering widget.
//!
//! [`CollectionView`] answers every question a widget asks while drawing
//! ([`CollectionDataSource`]) by looking up the item in the displayed model and
//! querying its capabilities. It also offers the operations a cell object uses
//! to ask for its own refresh, resize, deselection or removal.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cellobject::model::{CellComponent, DataModel, EditBatch, IndexPath, Renderer};
//! use cellobject::view::{CollectionDataSource, CollectionView, CollectionWidget, Completion};
//! use cellobject::Size;
//! use cellobject_core::RunLoop;
//!
//! struct Headless;
//!
//! impl CollectionWidget for Headless {
//!     fn reload_all(&self) {}
//!     fn apply_batch(&self, _batch: EditBatch, completion: Completion) {
//!         completion.complete();
//!     }
//!     fn bounds(&self) -> Size {
//!         Size::new(320.0, 568.0)
//!     }
//! }
//!
//! let view = CollectionView::new(Arc::new(Headless), RunLoop::new());
//! let row = CellComponent::new(Renderer::class("RowCell"))
//!     .with_size(|available| Size::new(available.width, 44.0))
//!     .into_cell();
//!
//! view.set_data_model(DataModel::single_section(vec![row])?, true);
//!
//! assert_eq!(view.number_of_items(0)?, 1);
//! assert_eq!(view.size_for_item(IndexPath::new(0, 0))?, Size::new(320.0, 44.0));
//! # Ok::<(), cellobject::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;

use cellobject_core::logging::targets;
use cellobject_core::{RunLoop, Signal};

use super::scheduler::UpdateScheduler;
use super::widget::{CollectionDataSource, CollectionWidget};
use crate::config::{CollectionConfig, ResolvedLayout};
use crate::error::Result;
use crate::geometry::{EdgeInsets, Size};
use crate::model::{Cell, CellView, DataModel, IndexPath, Renderer, SupplementaryKind};

/// Drives a [`CollectionWidget`] from a sequence of [`DataModel`]s.
pub struct CollectionView {
    scheduler: UpdateScheduler,
    config: CollectionConfig,
    did_scroll: Arc<Signal<()>>,
    will_begin_dragging: Arc<Signal<()>>,
}

impl CollectionView {
    /// Creates a view with the default configuration.
    pub fn new(widget: Arc<dyn CollectionWidget>, run_loop: RunLoop) -> Self {
        Self::with_config(widget, run_loop, CollectionConfig::default())
    }

    pub fn with_config(
        widget: Arc<dyn CollectionWidget>,
        run_loop: RunLoop,
        config: CollectionConfig,
    ) -> Self {
        let scheduler = UpdateScheduler::new(widget, run_loop).with_policy(config.update_policy);
        Self {
            scheduler,
            config,
            did_scroll: Arc::new(Signal::new()),
            will_begin_dragging: Arc::new(Signal::new()),
        }
    }

    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    fn widget(&self) -> &Arc<dyn CollectionWidget> {
        self.scheduler.widget()
    }

    /// The model the widget currently shows.
    pub fn data_model(&self) -> Arc<DataModel> {
        self.scheduler.displayed_model()
    }

    /// Transitions to `model`.
    pub fn set_data_model(&self, model: impl Into<Arc<DataModel>>, animated: bool) {
        self.scheduler.set_model(model, animated);
    }

    /// Transitions to `model` and runs `on_done` once it is shown.
    pub fn set_data_model_with<F>(&self, model: impl Into<Arc<DataModel>>, animated: bool, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.scheduler.request_update(model, animated, on_done);
    }

    // =========================================================================
    // Cell object requests
    // =========================================================================

    /// Reloads the cell showing `cell`.
    ///
    /// Returns `false` if `cell` is not in the displayed model.
    pub fn reload_cell(&self, cell: &Cell) -> bool {
        match self.displayed_path(cell, "reload") {
            Some(path) => {
                self.widget().reload_items(&[path]);
                true
            }
            None => false,
        }
    }

    /// Asks the widget to query sizes again.
    pub fn cell_size_changed(&self, cell: &Cell) {
        tracing::trace!(target: targets::VIEW, cell = %cell.id(), "cell size changed");
        self.widget().invalidate_layout();
    }

    /// Clears the selection of `cell`.
    pub fn deselect_cell(&self, cell: &Cell, animated: bool) -> bool {
        match self.displayed_path(cell, "deselect") {
            Some(path) => {
                self.widget().deselect_item(path, animated);
                true
            }
            None => false,
        }
    }

    /// Removes `cell` from the most recently requested model.
    pub fn delete_cell(&self, cell: &Cell, animated: bool) -> Result<()> {
        let model = self.scheduler.latest_model().without(cell)?;
        tracing::debug!(target: targets::VIEW, cell = %cell.id(), animated, "deleting cell");
        self.scheduler.set_model(model, animated);
        Ok(())
    }

    /// Runs `f` on the visible cell showing `cell`.
    ///
    /// Returns `false` if `cell` is not visible, or if the visible cell was
    /// dequeued for a different renderer.
    pub fn with_cell_view<F>(&self, cell: &Cell, f: F) -> bool
    where
        F: FnOnce(&mut dyn CellView),
    {
        let Some(path) = self.displayed_path(cell, "cell lookup") else {
            return false;
        };

        let renderer = cell.renderer();
        let mut f = Some(f);
        let mut matched = false;
        let visible = self.widget().with_visible_cell(path, &mut |view: &mut dyn CellView| {
            if view.reuse_identifier() == renderer.reuse_identifier() {
                if let Some(f) = f.take() {
                    f(view);
                    matched = true;
                }
            }
        });
        visible && matched
    }

    fn displayed_path(&self, cell: &Cell, action: &'static str) -> Option<IndexPath> {
        let path = self.data_model().path_of(cell);
        if path.is_none() {
            tracing::warn!(
                target: targets::VIEW,
                cell = %cell.id(),
                action,
                "cell is not part of the displayed model"
            );
        }
        path
    }

    // =========================================================================
    // Scroll notifications
    // =========================================================================

    pub fn did_scroll(&self) -> &Arc<Signal<()>> {
        &self.did_scroll
    }

    pub fn will_begin_dragging(&self) -> &Arc<Signal<()>> {
        &self.will_begin_dragging
    }

    /// Called by the widget whenever its content offset changes.
    pub fn notify_did_scroll(&self) {
        self.did_scroll.emit(());
    }

    /// Called by the widget when the user starts dragging the content.
    pub fn notify_will_begin_dragging(&self) {
        self.will_begin_dragging.emit(());
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    fn layout(&self, model: &DataModel, section: usize) -> ResolvedLayout {
        self.config.resolve(model.section_layout(section))
    }

    fn item(&self, path: IndexPath) -> Result<Cell> {
        self.data_model().item(path).cloned().map_err(|err| {
            tracing::error!(target: targets::VIEW, %path, error = %err, "widget asked for a missing item");
            err.into()
        })
    }

    /// Looks up an item for a hook that has nothing to return on failure.
    fn hook_item(&self, path: IndexPath, hook: &'static str) -> Option<Cell> {
        let item = self.data_model().get(path).cloned();
        if item.is_none() {
            tracing::warn!(target: targets::VIEW, %path, hook, "dropping hook for a missing item");
        }
        item
    }
}

impl CollectionDataSource for CollectionView {
    fn number_of_sections(&self) -> usize {
        self.data_model().number_of_sections()
    }

    fn number_of_items(&self, section: usize) -> Result<usize> {
        self.data_model().number_of_items(section).map_err(|err| {
            tracing::error!(target: targets::VIEW, section, error = %err, "widget asked for a missing section");
            err.into()
        })
    }

    fn renderer_for_item(&self, path: IndexPath) -> Result<Renderer> {
        let renderer = self.item(path)?.renderer();
        self.widget().register_renderer(&renderer);
        Ok(renderer)
    }

    fn configure_cell(&self, path: IndexPath, cell: &mut dyn CellView) -> Result<()> {
        let item = self.item(path)?;
        tracing::trace!(target: targets::VIEW, %path, cell = %item.id(), "configuring cell");
        item.configure(cell);
        Ok(())
    }

    fn size_for_item(&self, path: IndexPath) -> Result<Size> {
        let model = self.data_model();
        let item = model.item(path).map_err(|err| {
            tracing::error!(target: targets::VIEW, %path, error = %err, "widget asked for a missing item");
            err
        })?;
        let inset = self.layout(&model, path.section()).inset;
        Ok(item.size_for(self.widget().bounds().inset_by(inset)))
    }

    fn minimum_line_spacing(&self, section: usize) -> f32 {
        self.layout(&self.data_model(), section).minimum_line_spacing
    }

    fn minimum_interitem_spacing(&self, section: usize) -> f32 {
        self.layout(&self.data_model(), section)
            .minimum_interitem_spacing
    }

    fn inset(&self, section: usize) -> EdgeInsets {
        self.layout(&self.data_model(), section).inset
    }

    fn should_select(&self, path: IndexPath) -> bool {
        self.hook_item(path, "should_select")
            .is_some_and(|item| item.should_select())
    }

    fn did_select(&self, path: IndexPath) {
        if let Some(item) = self.hook_item(path, "did_select") {
            item.did_select();
        }
    }

    fn did_deselect(&self, path: IndexPath) {
        if let Some(item) = self.hook_item(path, "did_deselect") {
            item.did_deselect();
        }
    }

    fn will_display(&self, path: IndexPath, cell: &mut dyn CellView) {
        if let Some(item) = self.hook_item(path, "will_display") {
            item.will_display(cell);
        }
    }

    fn did_end_display(&self, path: IndexPath, cell: &mut dyn CellView) {
        if let Some(item) = self.hook_item(path, "did_end_display") {
            item.did_end_displaying(cell);
        }
    }

    fn supplementary_cell(&self, section: usize, kind: SupplementaryKind) -> Option<Cell> {
        let model = self.data_model();
        let cell = model.section(section).ok()?.supplementary(kind).cloned()?;
        self.widget().register_renderer(&cell.renderer());
        Some(cell)
    }
}

impl fmt::Debug for CollectionView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionView")
            .field("scheduler", &self.scheduler)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

static_assertions::assert_impl_all!(CollectionView: Send, Sync);
