//! Integration tests for the container adapter.

mod common;

use std::sync::Arc;

use cellobject::model::{
    CellComponent, DataModel, IndexPath, Renderer, Section, SectionLayout, SupplementaryKind,
};
use cellobject::view::{CollectionDataSource, CollectionView};
use cellobject::{CollectionConfig, EdgeInsets, Error, ModelError, RunLoop, Size};
use common::{LabelView, RecordingWidget, WidgetEvent, init_tracing, model, row, rows};
use parking_lot::Mutex;

fn setup(config: CollectionConfig) -> (Arc<RecordingWidget>, RunLoop, CollectionView) {
    init_tracing();
    let widget = RecordingWidget::new(Size::new(300.0, 600.0));
    let run_loop = RunLoop::new();
    let view = CollectionView::with_config(widget.clone(), run_loop.clone(), config);
    (widget, run_loop, view)
}

#[test]
fn capabilities_are_dispatched_with_defaults() {
    let (widget, run_loop, view) = setup(CollectionConfig::default());
    let log = Arc::new(Mutex::new(Vec::new()));

    let l = log.clone();
    let d = log.clone();
    let e = log.clone();
    let full = CellComponent::new(Renderer::class("FullCell"))
        .on_configure(|cell| {
            if let Some(label) = cell.downcast_mut::<LabelView>() {
                label.text = "configured".to_string();
            }
        })
        .with_size(|available| Size::new(available.width, 50.0))
        .should_select(|| false)
        .on_select(move || l.lock().push("select"))
        .on_will_display(move |_| d.lock().push("display"))
        .on_did_end_displaying(move |_| e.lock().push("end"))
        .into_cell();
    let bare = CellComponent::new(Renderer::template("BareCell", "BareCell.layout")).into_cell();

    view.set_data_model(DataModel::single_section(vec![full, bare]).unwrap(), false);
    run_loop.run_pending();

    let first = IndexPath::new(0, 0);
    let second = IndexPath::new(0, 1);

    let mut label = LabelView::default();
    view.configure_cell(first, &mut label).unwrap();
    assert_eq!(label.text, "configured");

    assert_eq!(view.size_for_item(first).unwrap(), Size::new(300.0, 50.0));
    assert_eq!(view.size_for_item(second).unwrap(), Size::ZERO);

    assert!(!view.should_select(first));
    assert!(view.should_select(second));

    view.will_display(first, &mut label);
    view.did_select(first);
    view.did_select(second);
    view.did_end_display(first, &mut label);
    assert_eq!(*log.lock(), vec!["display", "select", "end"]);

    let renderer = view.renderer_for_item(second).unwrap();
    assert_eq!(renderer.template_name(), Some("BareCell.layout"));
    assert!(widget.events().contains(&WidgetEvent::Register("BareCell".to_string())));
}

#[test]
fn index_errors_are_reported() {
    let (_widget, _run_loop, view) = setup(CollectionConfig::default());
    let [a] = rows();
    view.set_data_model(model(&[&[&a]]), true);

    let err = view.number_of_items(3).unwrap_err();
    assert!(matches!(
        err,
        Error::Model(ModelError::SectionOutOfRange { section: 3, count: 1 })
    ));

    let err = view.renderer_for_item(IndexPath::new(0, 5)).unwrap_err();
    assert!(matches!(err, Error::Model(ModelError::PathOutOfRange { .. })));
}

#[test]
fn layout_values_fall_back_to_config() {
    let config = CollectionConfig::new()
        .with_line_spacing(10.0)
        .with_interitem_spacing(4.0)
        .with_section_inset(EdgeInsets::uniform(20.0));
    let (_widget, _run_loop, view) = setup(config);

    let sized = || {
        CellComponent::new(Renderer::class("Tile"))
            .with_size(|available| available)
            .into_cell()
    };
    let model = DataModel::new(vec![
        Section::new(vec![sized()]),
        Section::new(vec![sized()]).with_layout(
            SectionLayout::new()
                .with_interitem_spacing(1.0)
                .with_inset(EdgeInsets::ZERO),
        ),
    ])
    .unwrap();
    view.set_data_model(model, true);

    assert_eq!(view.minimum_line_spacing(0), 10.0);
    assert_eq!(view.minimum_interitem_spacing(0), 4.0);
    assert_eq!(view.inset(0), EdgeInsets::uniform(20.0));
    assert_eq!(view.size_for_item(IndexPath::new(0, 0)).unwrap(), Size::new(260.0, 560.0));

    assert_eq!(view.minimum_line_spacing(1), 10.0);
    assert_eq!(view.minimum_interitem_spacing(1), 1.0);
    assert_eq!(view.size_for_item(IndexPath::new(1, 0)).unwrap(), Size::new(300.0, 600.0));
}

#[test]
fn cell_requests_reach_the_widget() {
    let (widget, _run_loop, view) = setup(CollectionConfig::default());
    let [a, b] = rows();
    view.set_data_model(model(&[&[&a, &b]]), true);
    widget.complete_all();

    assert!(view.reload_cell(&b));
    assert!(view.deselect_cell(&a, true));
    view.cell_size_changed(&a);
    assert!(!view.reload_cell(&row()));

    let events = widget.events();
    assert_eq!(
        &events[events.len() - 3..],
        &[
            WidgetEvent::ReloadItems(vec![IndexPath::new(0, 1)]),
            WidgetEvent::Deselect(IndexPath::new(0, 0), true),
            WidgetEvent::InvalidateLayout,
        ]
    );
}

#[test]
fn delete_cell_builds_on_the_latest_request() {
    let (widget, _run_loop, view) = setup(CollectionConfig::default());
    let [a, b, c] = rows();

    view.set_data_model(model(&[&[&a, &b]]), true);
    view.set_data_model(model(&[&[&a, &b, &c]]), true);
    view.delete_cell(&a, true).unwrap();
    assert_eq!(view.scheduler().pending_count(), 2);

    widget.complete_all();
    let shown = view.data_model();
    assert_eq!(shown.item_count(), 2);
    assert_eq!(shown.path_of(&c), Some(IndexPath::new(0, 1)));

    assert!(matches!(
        view.delete_cell(&a, false),
        Err(Error::Model(ModelError::UnknownCell { .. }))
    ));
}

#[test]
fn visible_cell_lookup_checks_renderer() {
    let (widget, _run_loop, view) = setup(CollectionConfig::default());
    let [a, b] = rows();
    view.set_data_model(model(&[&[&a, &b]]), true);
    widget.complete_all();

    widget.show(IndexPath::new(0, 0), "RowCell");
    widget.show(IndexPath::new(0, 1), "OtherCell");

    assert!(view.with_cell_view(&a, |cell| {
        if let Some(label) = cell.downcast_mut::<LabelView>() {
            label.text = "updated".to_string();
        }
    }));
    assert_eq!(widget.visible_text(IndexPath::new(0, 0)).as_deref(), Some("updated"));

    assert!(!view.with_cell_view(&b, |_| unreachable!()));
}

#[test]
fn supplementary_cells_come_from_the_section() {
    let (_widget, _run_loop, view) = setup(CollectionConfig::default());
    let header = CellComponent::new(Renderer::class("Header")).into_cell();
    let model = DataModel::new(vec![Section::new(vec![row()]).with_header(header.clone())]).unwrap();
    view.set_data_model(model, true);

    assert_eq!(view.supplementary_cell(0, SupplementaryKind::Header), Some(header));
    assert!(view.supplementary_cell(0, SupplementaryKind::Footer).is_none());
    assert!(view.supplementary_cell(4, SupplementaryKind::Header).is_none());
}

#[test]
fn scroll_notifications_are_signals() {
    let (_widget, _run_loop, view) = setup(CollectionConfig::default());
    let counts = Arc::new(Mutex::new((0, 0)));

    let c = counts.clone();
    view.did_scroll().connect(move |_| c.lock().0 += 1);
    let c = counts.clone();
    view.will_begin_dragging().connect(move |_| c.lock().1 += 1);

    view.notify_will_begin_dragging();
    view.notify_did_scroll();
    view.notify_did_scroll();
    assert_eq!(*counts.lock(), (2, 1));
}

#[test]
fn config_policy_reaches_the_scheduler() {
    let config = CollectionConfig::from_toml_str("update_policy = \"coalesce_latest\"").unwrap();
    let (_widget, _run_loop, view) = setup(config);
    assert_eq!(view.scheduler().policy(), cellobject::UpdatePolicy::CoalesceLatest);
}
