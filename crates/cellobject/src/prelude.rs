//! Commonly used types.
//!
//! ```
//! use cellobject::prelude::*;
//! ```

pub use crate::config::CollectionConfig;
pub use crate::error::{Error, ModelError, Result};
pub use crate::geometry::{EdgeInsets, Size};
pub use crate::model::{
    Cell, CellComponent, CellObject, CellView, DataModel, EditBatch, IndexPath, Renderer, Section,
    SectionLayout,
};
pub use crate::view::{
    CollectionDataSource, CollectionView, CollectionWidget, Completion, UpdatePolicy,
    UpdateScheduler,
};
pub use cellobject_core::{RunLoop, Signal};
