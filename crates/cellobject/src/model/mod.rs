//! Cell objects, sectioned data models and diffing.
//!
//! - [`Cell`] / [`CellObject`]: items and their optional capabilities
//! - [`Section`] / [`DataModel`]: immutable, sectioned snapshots of a collection
//! - [`diff`]: the [`EditBatch`] that turns one snapshot into another

mod cell;
mod data_model;
mod diff;
mod index;
mod section;

pub use cell::{
    Cell, CellComponent, CellId, CellObject, CellView, DisplayLifecycle, Renderer, SelectHandler,
    Sizeable,
};
pub use data_model::{DataModel, DataModelBuilder};
pub use diff::{EditBatch, EditOperation, RenderState, diff};
pub use index::IndexPath;
pub use section::{Section, SectionLayout, SupplementaryKind};
