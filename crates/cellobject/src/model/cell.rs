//! Cell objects and their capabilities.
//!
//! A cell object is anything that can describe one item of a collection: which
//! renderer draws it, how to configure that renderer, and optionally how big it
//! is, whether it can be selected, and what happens as it scrolls in and out of
//! view. Each of those optional behaviors is a separate *capability* queried
//! independently at the moment it is needed.
//!
//! # Capabilities
//!
//! | Capability | Trait | Default when absent |
//! |------------|-------|---------------------|
//! | Sizing | [`Sizeable`] | [`Size::ZERO`] |
//! | Selection | [`SelectHandler`] | selectable, no-op hooks |
//! | Display lifecycle | [`DisplayLifecycle`] | no-op hooks |
//!
//! # Identity
//!
//! Items enter a [`DataModel`](super::DataModel) as [`Cell`] handles. A handle
//! pairs the object with a generated [`CellId`]; clones of a handle share the
//! id, and the diff engine matches items across models by that id alone.
//!
//! # Example
//!
//! ```
//! use cellobject::model::{Cell, CellComponent, Renderer};
//! use cellobject::Size;
//!
//! let title = CellComponent::new(Renderer::class("TitleCell"))
//!     .with_size(|available| Size::new(available.width, 44.0))
//!     .on_select(|| println!("title tapped"))
//!     .into_cell();
//!
//! assert_eq!(title.size_for(Size::new(320.0, 480.0)), Size::new(320.0, 44.0));
//! assert!(title.should_select());
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::geometry::Size;

/// Global counter for generating cell identities.
static NEXT_CELL_ID: AtomicU64 = AtomicU64::new(1);

/// The identity of a cell, unique within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(u64);

impl CellId {
    fn next() -> Self {
        Self(NEXT_CELL_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Declares which renderer draws a cell.
///
/// The reuse identifier is the renderer class name; cells with the same
/// identifier share a reuse pool in the widget.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Renderer {
    /// A renderer built directly from its class.
    Class(Cow<'static, str>),
    /// A renderer instantiated from a named template (a nib, a layout file).
    Template {
        class: Cow<'static, str>,
        template: Cow<'static, str>,
    },
}

impl Renderer {
    /// A class-based renderer.
    pub fn class(name: impl Into<Cow<'static, str>>) -> Self {
        Self::Class(name.into())
    }

    /// A template-based renderer.
    pub fn template(
        class: impl Into<Cow<'static, str>>,
        template: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::Template {
            class: class.into(),
            template: template.into(),
        }
    }

    /// The identifier cells of this renderer are dequeued under.
    pub fn reuse_identifier(&self) -> &str {
        match self {
            Self::Class(class) | Self::Template { class, .. } => &**class,
        }
    }

    /// The template name, for template-based renderers.
    pub fn template_name(&self) -> Option<&str> {
        match self {
            Self::Class(_) => None,
            Self::Template { template, .. } => Some(&**template),
        }
    }
}

/// A rendered cell owned by the widget.
///
/// Cell objects receive `&mut dyn CellView` during configuration and display
/// callbacks and downcast it to the concrete cell type they declared.
pub trait CellView: Any + Send + 'static {
    /// The reuse identifier this cell was dequeued under.
    fn reuse_identifier(&self) -> &str;
}

impl dyn CellView {
    /// Downcast to the concrete cell type.
    pub fn downcast_ref<T: CellView>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Downcast to the concrete cell type, mutably.
    pub fn downcast_mut<T: CellView>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// Produces a size given the space available to the item.
pub trait Sizeable: Send + Sync {
    /// Returns the item size. `available` is the container bounds minus the
    /// section inset.
    fn size_for(&self, available: Size) -> Size;
}

/// Reacts to selection of the item.
pub trait SelectHandler: Send + Sync {
    /// Whether the item may be selected.
    fn should_select(&self) -> bool {
        true
    }

    /// Called when the item is selected.
    fn did_select(&self) {}

    /// Called when the item is deselected.
    fn did_deselect(&self) {}
}

/// Reacts to the item entering and leaving the visible range.
pub trait DisplayLifecycle: Send + Sync {
    /// Called just before the cell becomes visible.
    fn will_display(&self, _cell: &mut dyn CellView) {}

    /// Called just after the cell left the visible range.
    fn did_end_displaying(&self, _cell: &mut dyn CellView) {}
}

/// The trait implemented by every item of a collection.
///
/// Only [`renderer`](CellObject::renderer) is required. Capabilities are
/// exposed through the accessor methods; returning `None` means the item does
/// not have that capability.
///
/// ```
/// use cellobject::model::{CellObject, CellView, Renderer, Sizeable};
/// use cellobject::Size;
///
/// struct Divider;
///
/// impl Sizeable for Divider {
///     fn size_for(&self, available: Size) -> Size {
///         Size::new(available.width, 1.0)
///     }
/// }
///
/// impl CellObject for Divider {
///     fn renderer(&self) -> Renderer {
///         Renderer::class("DividerCell")
///     }
///
///     fn sizing(&self) -> Option<&dyn Sizeable> {
///         Some(self)
///     }
/// }
/// ```
pub trait CellObject: Any + Send + Sync {
    /// The renderer that draws this item.
    fn renderer(&self) -> Renderer;

    /// Configures a freshly dequeued cell for this item.
    fn configure(&self, _cell: &mut dyn CellView) {}

    /// The sizing capability, if any.
    fn sizing(&self) -> Option<&dyn Sizeable> {
        None
    }

    /// The selection capability, if any.
    fn selection(&self) -> Option<&dyn SelectHandler> {
        None
    }

    /// The display lifecycle capability, if any.
    fn display(&self) -> Option<&dyn DisplayLifecycle> {
        None
    }
}

/// An item handle with identity.
///
/// Cloning a `Cell` is cheap and keeps its identity. Two handles created by
/// separate [`Cell::new`] calls are different items, even for equal objects.
#[derive(Clone)]
pub struct Cell {
    id: CellId,
    object: Arc<dyn CellObject>,
}

impl Cell {
    /// Wraps an object in a new identity.
    pub fn new<T: CellObject>(object: T) -> Self {
        Self::from_arc(Arc::new(object))
    }

    /// Wraps a shared object in a new identity.
    pub fn from_arc(object: Arc<dyn CellObject>) -> Self {
        Self {
            id: CellId::next(),
            object,
        }
    }

    /// The identity of this item.
    #[inline]
    pub fn id(&self) -> CellId {
        self.id
    }

    /// The wrapped object.
    pub fn object(&self) -> &dyn CellObject {
        self.object.as_ref()
    }

    /// Downcast the wrapped object to its concrete type.
    pub fn downcast_ref<T: CellObject>(&self) -> Option<&T> {
        (self.object.as_ref() as &dyn Any).downcast_ref::<T>()
    }

    /// Whether both handles name the same item.
    #[inline]
    pub fn is_same(&self, other: &Cell) -> bool {
        self.id == other.id
    }

    // =========================================================================
    // Capability dispatch with defaults
    // =========================================================================

    /// The renderer for this item.
    pub fn renderer(&self) -> Renderer {
        self.object.renderer()
    }

    /// Configures `cell` for this item.
    pub fn configure(&self, cell: &mut dyn CellView) {
        self.object.configure(cell);
    }

    /// The item size, or [`Size::ZERO`] without a sizing capability.
    pub fn size_for(&self, available: Size) -> Size {
        self.object
            .sizing()
            .map_or(Size::ZERO, |sizing| sizing.size_for(available))
    }

    /// Whether the item may be selected; `true` without a selection capability.
    pub fn should_select(&self) -> bool {
        self.object
            .selection()
            .is_none_or(|selection| selection.should_select())
    }

    /// Forwards a selection.
    pub fn did_select(&self) {
        if let Some(selection) = self.object.selection() {
            selection.did_select();
        }
    }

    /// Forwards a deselection.
    pub fn did_deselect(&self) {
        if let Some(selection) = self.object.selection() {
            selection.did_deselect();
        }
    }

    /// Forwards the display-begin hook.
    pub fn will_display(&self, cell: &mut dyn CellView) {
        if let Some(display) = self.object.display() {
            display.will_display(cell);
        }
    }

    /// Forwards the display-end hook.
    pub fn did_end_displaying(&self, cell: &mut dyn CellView) {
        if let Some(display) = self.object.display() {
            display.did_end_displaying(cell);
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other)
    }
}

impl Eq for Cell {}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id)
            .field("renderer", &self.object.renderer().reuse_identifier())
            .finish()
    }
}

// =============================================================================
// Closure-based cell objects
// =============================================================================

type ConfigureFn = Box<dyn Fn(&mut dyn CellView) + Send + Sync>;
type SizeFn = Box<dyn Fn(Size) -> Size + Send + Sync>;
type PredicateFn = Box<dyn Fn() -> bool + Send + Sync>;
type ActionFn = Box<dyn Fn() + Send + Sync>;
type DisplayFn = Box<dyn Fn(&mut dyn CellView) + Send + Sync>;

struct SizeBlock(SizeFn);

impl Sizeable for SizeBlock {
    fn size_for(&self, available: Size) -> Size {
        (self.0)(available)
    }
}

#[derive(Default)]
struct SelectBlocks {
    should_select: Option<PredicateFn>,
    select: Option<ActionFn>,
    deselect: Option<ActionFn>,
}

impl SelectHandler for SelectBlocks {
    fn should_select(&self) -> bool {
        self.should_select.as_ref().is_none_or(|f| f())
    }

    fn did_select(&self) {
        if let Some(f) = &self.select {
            f();
        }
    }

    fn did_deselect(&self) {
        if let Some(f) = &self.deselect {
            f();
        }
    }
}

#[derive(Default)]
struct DisplayBlocks {
    will_display: Option<DisplayFn>,
    did_end_displaying: Option<DisplayFn>,
}

impl DisplayLifecycle for DisplayBlocks {
    fn will_display(&self, cell: &mut dyn CellView) {
        if let Some(f) = &self.will_display {
            f(cell);
        }
    }

    fn did_end_displaying(&self, cell: &mut dyn CellView) {
        if let Some(f) = &self.did_end_displaying {
            f(cell);
        }
    }
}

/// A cell object assembled from closures.
///
/// Each builder method switches on the matching capability; an item built
/// without `with_size` has no sizing capability at all.
pub struct CellComponent {
    renderer: Renderer,
    configure: Option<ConfigureFn>,
    size: Option<SizeBlock>,
    select: Option<SelectBlocks>,
    display: Option<DisplayBlocks>,
}

impl CellComponent {
    /// Creates a component drawn by `renderer` with no capabilities.
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            configure: None,
            size: None,
            select: None,
            display: None,
        }
    }

    /// Sets the configuration closure.
    pub fn on_configure<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn CellView) + Send + Sync + 'static,
    {
        self.configure = Some(Box::new(f));
        self
    }

    /// Sets the sizing closure.
    pub fn with_size<F>(mut self, f: F) -> Self
    where
        F: Fn(Size) -> Size + Send + Sync + 'static,
    {
        self.size = Some(SizeBlock(Box::new(f)));
        self
    }

    /// Sets the selection permit closure.
    pub fn should_select<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.select.get_or_insert_with(Default::default).should_select = Some(Box::new(f));
        self
    }

    /// Sets the selection closure.
    pub fn on_select<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.select.get_or_insert_with(Default::default).select = Some(Box::new(f));
        self
    }

    /// Sets the deselection closure.
    pub fn on_deselect<F>(mut self, f: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.select.get_or_insert_with(Default::default).deselect = Some(Box::new(f));
        self
    }

    /// Sets the display-begin closure.
    pub fn on_will_display<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn CellView) + Send + Sync + 'static,
    {
        self.display.get_or_insert_with(Default::default).will_display = Some(Box::new(f));
        self
    }

    /// Sets the display-end closure.
    pub fn on_did_end_displaying<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut dyn CellView) + Send + Sync + 'static,
    {
        self.display
            .get_or_insert_with(Default::default)
            .did_end_displaying = Some(Box::new(f));
        self
    }

    /// Wraps the component in a new [`Cell`].
    pub fn into_cell(self) -> Cell {
        Cell::new(self)
    }
}

impl CellObject for CellComponent {
    fn renderer(&self) -> Renderer {
        self.renderer.clone()
    }

    fn configure(&self, cell: &mut dyn CellView) {
        if let Some(f) = &self.configure {
            f(cell);
        }
    }

    fn sizing(&self) -> Option<&dyn Sizeable> {
        self.size.as_ref().map(|s| s as &dyn Sizeable)
    }

    fn selection(&self) -> Option<&dyn SelectHandler> {
        self.select.as_ref().map(|s| s as &dyn SelectHandler)
    }

    fn display(&self) -> Option<&dyn DisplayLifecycle> {
        self.display.as_ref().map(|d| d as &dyn DisplayLifecycle)
    }
}

static_assertions::assert_impl_all!(Cell: Send, Sync);
