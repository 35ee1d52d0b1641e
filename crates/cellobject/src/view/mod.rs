//! Driving a rendering widget from data models.
//!
//! - [`CollectionWidget`] / [`CollectionDataSource`]: the widget boundary
//! - [`UpdateScheduler`]: one transition at a time, queued requests drained in order
//! - [`CollectionView`]: the adapter widgets pull cells, sizes and hooks from

mod collection_view;
mod scheduler;
mod widget;

pub use collection_view::CollectionView;
pub use scheduler::{
    DoneCallback, PendingUpdate, SchedulerState, TransitionInfo, UpdatePolicy, UpdateScheduler,
};
pub use widget::{CollectionDataSource, CollectionWidget, Completion};
