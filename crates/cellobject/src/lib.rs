//! cellobject - sectioned cell-object collections for scrolling widgets.
//!
//! Items are *cell objects*: values that declare which renderer draws them and,
//! optionally, how they are sized, selected and notified as they scroll in and
//! out of view. Items are grouped into sections and snapshotted as immutable
//! [`DataModel`](model::DataModel)s. Every change is a new model; the
//! [`UpdateScheduler`](view::UpdateScheduler) diffs it against the model on
//! screen and animates one transition at a time.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use cellobject::prelude::*;
//!
//! struct Headless;
//!
//! impl CollectionWidget for Headless {
//!     fn reload_all(&self) {}
//!     fn apply_batch(&self, batch: EditBatch, completion: Completion) {
//!         println!("animating {} operations", batch.len());
//!         completion.complete();
//!     }
//!     fn bounds(&self) -> Size {
//!         Size::new(375.0, 667.0)
//!     }
//! }
//!
//! let view = CollectionView::new(Arc::new(Headless), RunLoop::new());
//!
//! let greeting = CellComponent::new(Renderer::class("GreetingCell"))
//!     .with_size(|available| Size::new(available.width, 60.0))
//!     .on_select(|| println!("hello"))
//!     .into_cell();
//! let model = DataModel::single_section(vec![greeting.clone()])?;
//!
//! view.set_data_model_with(model, true, || println!("shown"));
//! assert_eq!(view.data_model().path_of(&greeting), Some(IndexPath::new(0, 0)));
//! # Ok::<(), cellobject::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`model`]: cells, sections, data models and the diff engine
//! - [`view`]: the widget boundary, the update scheduler and the adapter
//! - [`config`]: container-wide defaults, loadable from TOML or JSON

pub mod config;
mod error;
mod geometry;
pub mod model;
pub mod prelude;
pub mod view;

pub use cellobject_core::RunLoop;
pub use config::{CollectionConfig, ResolvedLayout};
pub use error::{BatchError, ConfigError, Error, ModelError, ModelResult, Result};
pub use geometry::{EdgeInsets, Size};
pub use view::UpdatePolicy;
