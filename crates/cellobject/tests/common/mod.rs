//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cellobject::model::{Cell, CellComponent, CellView, DataModel, EditBatch, IndexPath, Renderer, Section};
use cellobject::view::{CollectionWidget, Completion};
use cellobject::Size;
use parking_lot::Mutex;

/// What the widget was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    ReloadAll,
    Batch(EditBatch),
    Register(String),
    ReloadItems(Vec<IndexPath>),
    InvalidateLayout,
    Deselect(IndexPath, bool),
}

/// A widget that records every call and holds completions until a test fires
/// them.
pub struct RecordingWidget {
    bounds: Size,
    events: Mutex<Vec<WidgetEvent>>,
    completions: Mutex<Vec<Completion>>,
    visible: Mutex<Vec<(IndexPath, LabelView)>>,
}

impl RecordingWidget {
    pub fn new(bounds: Size) -> Arc<Self> {
        Arc::new(Self {
            bounds,
            events: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
            visible: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<WidgetEvent> {
        self.events.lock().clone()
    }

    pub fn batches(&self) -> Vec<EditBatch> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                WidgetEvent::Batch(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn held_completions(&self) -> usize {
        self.completions.lock().len()
    }

    /// Fires the oldest held completion. Returns `false` if none was held.
    pub fn complete_next(&self) -> bool {
        let next = {
            let mut completions = self.completions.lock();
            if completions.is_empty() {
                None
            } else {
                Some(completions.remove(0))
            }
        };
        match next {
            Some(completion) => {
                completion.complete();
                true
            }
            None => false,
        }
    }

    /// Fires held completions until none are left, including ones handed
    /// out while draining.
    pub fn complete_all(&self) -> usize {
        let mut count = 0;
        while self.complete_next() {
            count += 1;
        }
        count
    }

    /// Drops every held completion without firing it.
    pub fn drop_completions(&self) {
        self.completions.lock().clear();
    }

    /// Shows a cell of kind `reuse_identifier` at `path`.
    pub fn show(&self, path: IndexPath, reuse_identifier: &str) {
        self.visible.lock().push((
            path,
            LabelView {
                reuse_identifier: reuse_identifier.to_string(),
                text: String::new(),
            },
        ));
    }

    pub fn visible_text(&self, path: IndexPath) -> Option<String> {
        self.visible
            .lock()
            .iter()
            .find(|(p, _)| *p == path)
            .map(|(_, view)| view.text.clone())
    }
}

impl CollectionWidget for RecordingWidget {
    fn reload_all(&self) {
        self.events.lock().push(WidgetEvent::ReloadAll);
    }

    fn apply_batch(&self, batch: EditBatch, completion: Completion) {
        self.events.lock().push(WidgetEvent::Batch(batch));
        self.completions.lock().push(completion);
    }

    fn bounds(&self) -> Size {
        self.bounds
    }

    fn register_renderer(&self, renderer: &Renderer) {
        self.events
            .lock()
            .push(WidgetEvent::Register(renderer.reuse_identifier().to_string()));
    }

    fn reload_items(&self, paths: &[IndexPath]) {
        self.events.lock().push(WidgetEvent::ReloadItems(paths.to_vec()));
    }

    fn invalidate_layout(&self) {
        self.events.lock().push(WidgetEvent::InvalidateLayout);
    }

    fn deselect_item(&self, path: IndexPath, animated: bool) {
        self.events.lock().push(WidgetEvent::Deselect(path, animated));
    }

    fn with_visible_cell(&self, path: IndexPath, f: &mut dyn FnMut(&mut dyn CellView)) -> bool {
        let mut visible = self.visible.lock();
        match visible.iter_mut().find(|(p, _)| *p == path) {
            Some((_, view)) => {
                f(view);
                true
            }
            None => false,
        }
    }
}

/// A minimal rendered cell.
#[derive(Debug, Default)]
pub struct LabelView {
    pub reuse_identifier: String,
    pub text: String,
}

impl CellView for LabelView {
    fn reuse_identifier(&self) -> &str {
        &self.reuse_identifier
    }
}

pub fn row() -> Cell {
    CellComponent::new(Renderer::class("RowCell")).into_cell()
}

pub fn rows<const N: usize>() -> [Cell; N] {
    std::array::from_fn(|_| row())
}

/// Builds a model from sections of cells.
pub fn model(sections: &[&[&Cell]]) -> Arc<DataModel> {
    let sections = sections
        .iter()
        .map(|items| Section::new(items.iter().map(|&cell| cell.clone()).collect()));
    Arc::new(DataModel::new(sections).expect("test models have unique identities"))
}

/// Installs a test subscriber once; set `RUST_LOG` to see output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
