use imagemarker_core::scene::{Attr, AttrValue, Mutation, NodeKind};
use imagemarker_core::{
    EditorConfig, EditorError, Geometry, ImageMarker, Mark, MarkData, MarkKey, MarkerHost,
    MemoryImageLoader, MouseButton, PointerInput, ShapeKind, Status, TouchPhase,
};
use kurbo::{Point, Size, Vec2};
use pollster::block_on;

#[derive(Default)]
struct Host {
    created: Vec<Mark>,
    selected: Vec<Option<Mark>>,
}

impl MarkerHost for Host {
    fn on_creation(&mut self, mark: &Mark) {
        self.created.push(mark.clone());
    }

    fn on_selection(&mut self, mark: Option<&Mark>) {
        self.selected.push(mark.cloned());
    }
}

fn editor() -> ImageMarker<Host> {
    ImageMarker::new(EditorConfig::default(), Host::default()).unwrap()
}

fn press(editor: &mut ImageMarker<Host>, x: f64, y: f64) {
    editor.handle_pointer(&PointerInput::MouseDown {
        position: Point::new(x, y),
        button: MouseButton::Left,
    });
}

fn drag_to(editor: &mut ImageMarker<Host>, x: f64, y: f64) {
    editor.handle_pointer(&PointerInput::MouseMove {
        position: Point::new(x, y),
    });
}

fn release(editor: &mut ImageMarker<Host>, x: f64, y: f64) {
    editor.handle_pointer(&PointerInput::MouseUp {
        position: Point::new(x, y),
        button: MouseButton::Left,
    });
}

fn click(editor: &mut ImageMarker<Host>, x: f64, y: f64) {
    press(editor, x, y);
    release(editor, x, y);
}

fn rect_data(key: &str, width: f64) -> MarkData {
    MarkData {
        key: Some(key.into()),
        shape: Some("rectangle".into()),
        pos: Some(Point::new(10.0, 10.0)),
        width: Some(width),
        height: Some(5.0),
        color: Some("#fff".into()),
        selected_color: Some("#000".into()),
        label: Some(String::new()),
        ..MarkData::default()
    }
}

#[test]
fn test_width_change_mutates_only_width() {
    let mut editor = editor();
    editor
        .add_mark_silently(Mark::from_data(rect_data("r1", 5.0)).unwrap())
        .unwrap();
    editor.take_journal();

    editor
        .update_mark(Mark::from_data(rect_data("r1", 50.0)).unwrap())
        .unwrap();

    let shape = editor.scene().group("r1").unwrap().nodes.shape;
    assert_eq!(
        editor.take_journal(),
        vec![Mutation::SetAttr {
            node: shape,
            attr: Attr::Width,
            value: AttrValue::Number(50.0),
        }]
    );
}

#[test]
fn test_unchanged_update_mutates_nothing() {
    let mut editor = editor();
    let mark = Mark::from_data(rect_data("r1", 5.0)).unwrap();
    editor.add_mark_silently(mark.clone()).unwrap();
    editor.take_journal();

    assert!(editor.update_mark(mark).unwrap().is_empty());
    assert!(editor.take_journal().is_empty());
}

#[test]
fn test_circle_draw_new_reports_final_mark() {
    let mut editor = editor();
    press(&mut editor, 100.0, 100.0);
    drag_to(&mut editor, 120.0, 100.0);
    release(&mut editor, 120.0, 100.0);

    let host = editor.host();
    assert_eq!(host.created.len(), 1);
    let created = &host.created[0];
    assert_eq!(created.shape(), ShapeKind::Circle);
    assert_eq!(created.pos, Point::new(120.0, 100.0));
    assert!(created.key.as_str().starts_with("mark"));
    assert_eq!(host.selected, vec![Some(created.clone())]);
    assert_eq!(editor.status(), &Status::Idle);
    assert_eq!(editor.pointer_surface().listener_count(), 0);
}

#[test]
fn test_moves_after_release_are_ignored() {
    let mut editor = editor();
    press(&mut editor, 100.0, 100.0);
    release(&mut editor, 100.0, 100.0);
    drag_to(&mut editor, 400.0, 400.0);

    let key = editor.host().created[0].key.clone();
    assert_eq!(editor.mark(key.as_str()).unwrap().pos, Point::new(100.0, 100.0));
}

#[test]
fn test_polygon_lasso() {
    let mut editor = editor();
    editor.set_default_shape("polygon").unwrap();

    click(&mut editor, 0.0, 0.0);
    let key = match editor.status() {
        Status::NewPolygon { key } => key.clone(),
        other => panic!("unexpected status {other:?}"),
    };
    assert!(editor.scene().close_dot().is_some());

    click(&mut editor, 10.0, 0.0);
    click(&mut editor, 10.0, 10.0);
    assert!(editor.host().created.is_empty());

    click(&mut editor, 1.0, 1.0);

    let host = editor.host();
    assert_eq!(host.created.len(), 1);
    assert_eq!(host.created[0].key, key);
    assert_eq!(
        host.created[0].geometry,
        Geometry::Polygon {
            points: vec![Point::ZERO, Point::new(10.0, 0.0), Point::new(10.0, 10.0)],
        }
    );
    assert_eq!(host.selected.len(), 1);
    assert_eq!(editor.status(), &Status::Idle);
    assert!(editor.scene().close_dot().is_none());

    let polygon = editor.scene().group(key.as_str()).unwrap().nodes.shape;
    assert_eq!(
        editor.scene().tree().attr(polygon, Attr::Points),
        Some(&AttrValue::Points(vec![
            Point::ZERO,
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0)
        ]))
    );
}

#[test]
fn test_shape_change_replaces_only_shape_node() {
    let mut editor = editor();
    let circle = Mark::from_data(MarkData {
        key: Some("m".into()),
        shape: Some("circle".into()),
        label: Some("A".into()),
        ..MarkData::default()
    })
    .unwrap();
    editor.add_mark_silently(circle.clone()).unwrap();
    let before = editor.scene().group("m").unwrap().nodes;

    let rectangle = circle.with_geometry(Geometry::Rectangle {
        width: 4.0,
        height: 3.0,
    });
    editor.update_mark(rectangle).unwrap();
    let after = editor.scene().group("m").unwrap().nodes;

    let tree = editor.scene().tree();
    assert_ne!(before.shape, after.shape);
    assert!(!tree.contains(before.shape));
    assert_eq!(before.label, after.label);
    assert_eq!(before.root, after.root);
    assert_eq!(tree.children(after.root), &[after.shape, after.label]);
    assert_eq!(tree.kind(after.shape), Some(NodeKind::Rect));
    assert_eq!(tree.number(after.shape, Attr::Width), Some(4.0));
    assert_eq!(tree.text(after.label), Some("A"));
}

#[test]
fn test_removing_other_mark_mid_gesture() {
    let mut editor = editor();
    let a = Mark::new(Point::new(50.0, 50.0), ShapeKind::Circle.default_geometry());
    let b = Mark::new(Point::new(200.0, 200.0), ShapeKind::Circle.default_geometry());
    let (a_key, b_key) = (a.key.to_string(), b.key.to_string());
    editor.add_mark_silently(a).unwrap();
    editor.add_mark_silently(b).unwrap();

    press(&mut editor, 50.0, 50.0);
    editor.remove_mark(&b_key).unwrap();
    drag_to(&mut editor, 60.0, 55.0);
    release(&mut editor, 60.0, 55.0);

    assert_eq!(editor.mark(&a_key).unwrap().pos, Point::new(60.0, 55.0));
    assert_eq!(editor.status(), &Status::Idle);
}

#[test]
fn test_removing_dragged_mark_mid_gesture() {
    let mut editor = editor();
    let a = Mark::new(Point::new(50.0, 50.0), ShapeKind::Circle.default_geometry());
    let key = a.key.to_string();
    editor.add_mark_silently(a).unwrap();

    press(&mut editor, 50.0, 50.0);
    assert_eq!(editor.status(), &Status::MoveGroup { key: MarkKey::new(key.clone()) });
    editor.remove_mark(&key).unwrap();
    drag_to(&mut editor, 60.0, 55.0);
    release(&mut editor, 60.0, 55.0);

    assert!(editor.mark(&key).is_none());
    assert_eq!(editor.status(), &Status::Idle);
    assert!(editor.host().selected.is_empty());

    // The lock was released, so the next press draws again.
    press(&mut editor, 300.0, 300.0);
    release(&mut editor, 300.0, 300.0);
    assert_eq!(editor.host().created.len(), 1);
}

#[test]
fn test_removing_polygon_mid_lasso() {
    let mut editor = editor();
    editor.set_default_shape("polygon").unwrap();
    click(&mut editor, 0.0, 0.0);
    let key = editor.status().group().unwrap().to_string();

    editor.remove_mark(&key).unwrap();
    assert_eq!(editor.status(), &Status::Idle);
    assert!(editor.scene().close_dot().is_none());
}

fn rect_with_key(key: &str) -> Mark {
    let mut mark = Mark::new(
        Point::new(300.0, 300.0),
        Geometry::Rectangle {
            width: 40.0,
            height: 20.0,
        },
    );
    mark.key = MarkKey::new(key);
    mark
}

#[test]
fn test_drag_does_not_touch_mark_readded_under_same_key() {
    let mut editor = editor();
    let mut circle = Mark::new(Point::new(50.0, 50.0), ShapeKind::Circle.default_geometry());
    circle.key = MarkKey::new("a");
    editor.add_mark_silently(circle).unwrap();

    press(&mut editor, 50.0, 50.0);
    editor.remove_mark("a").unwrap();
    editor.add_mark_silently(rect_with_key("a")).unwrap();
    drag_to(&mut editor, 60.0, 55.0);
    release(&mut editor, 60.0, 55.0);

    assert_eq!(editor.mark("a"), Some(&rect_with_key("a")));
    assert!(editor.host().created.is_empty());
    assert!(editor.host().selected.is_empty());
    assert_eq!(editor.status(), &Status::Idle);
}

#[test]
fn test_draw_new_does_not_report_mark_readded_under_same_key() {
    let mut editor = editor();
    press(&mut editor, 100.0, 100.0);
    let key = editor.status().group().unwrap().to_string();
    editor.remove_mark(&key).unwrap();
    editor.add_mark_silently(rect_with_key(&key)).unwrap();
    drag_to(&mut editor, 120.0, 100.0);
    release(&mut editor, 120.0, 100.0);

    assert_eq!(editor.mark(&key), Some(&rect_with_key(&key)));
    assert!(editor.host().created.is_empty());
    assert!(editor.host().selected.is_empty());
    assert_eq!(editor.status(), &Status::Idle);
}

#[test]
fn test_locked_click_skips_mark_readded_under_same_key() {
    let mut editor = editor();
    let mut locked = rect_with_key("a");
    locked.locked = true;
    editor.add_mark_silently(locked).unwrap();

    press(&mut editor, 310.0, 310.0);
    assert_eq!(editor.status(), &Status::Selecting { key: MarkKey::new("a") });
    editor.remove_mark("a").unwrap();
    editor.add_mark_silently(rect_with_key("a")).unwrap();
    release(&mut editor, 310.0, 310.0);

    assert!(editor.host().selected.is_empty());
    assert_eq!(editor.status(), &Status::Idle);
}

#[test]
fn test_show_page_prefixes_labels_with_page_number() {
    let loader = MemoryImageLoader::new().with_image("p3.png", Size::new(100.0, 100.0));
    let mut editor = editor();
    let mut data = rect_data("a", 5.0);
    data.label = Some("A1".into());
    let marks = vec![Mark::from_data(data).unwrap()];
    block_on(editor.show_page(&loader, Some(3), "p3.png", marks)).unwrap();

    let label = editor.scene().group("a").unwrap().nodes.label;
    assert_eq!(editor.scene().tree().text(label), Some("3.A1"));
    assert_eq!(editor.mark("a").unwrap().label, "A1");

    block_on(editor.show_page(&loader, None, "p3.png", vec![rect_with_key("b")])).unwrap();
    let label = editor.scene().group("b").unwrap().nodes.label;
    assert_eq!(editor.scene().tree().text(label), Some(""));
}

#[test]
fn test_touch_gestures() {
    let mut editor = editor();
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::Start,
        touches: vec![Point::new(40.0, 40.0)],
        changed: vec![Point::new(40.0, 40.0)],
    });
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::Move,
        touches: vec![Point::new(45.0, 40.0)],
        changed: vec![Point::new(45.0, 40.0)],
    });
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::End,
        touches: vec![],
        changed: vec![Point::new(45.0, 40.0)],
    });
    assert_eq!(editor.host().created[0].pos, Point::new(45.0, 40.0));

    let two = |dx: f64| vec![Point::new(500.0 + dx, 500.0), Point::new(520.0 + dx, 500.0)];
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::Start,
        touches: two(0.0),
        changed: vec![Point::new(520.0, 500.0)],
    });
    assert_eq!(editor.status(), &Status::MovingView);
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::Move,
        touches: two(-30.0),
        changed: two(-30.0),
    });
    editor.handle_pointer(&PointerInput::Touch {
        phase: TouchPhase::Cancel,
        touches: vec![Point::new(470.0, 500.0)],
        changed: vec![Point::new(490.0, 500.0)],
    });
    assert_eq!(editor.camera().offset, Vec2::new(-30.0, 0.0));
    assert_eq!(editor.status(), &Status::Idle);
}

#[test]
fn test_show_page_replaces_marks() {
    let loader = MemoryImageLoader::new().with_image("p1.png", Size::new(1600.0, 1200.0));
    let mut editor = editor();
    editor.add_mark_silently(Mark::from_data(rect_data("old", 5.0)).unwrap()).unwrap();
    editor.set_zoom_level(3.0).unwrap();

    let marks = vec![
        Mark::from_data(rect_data("a", 5.0)).unwrap(),
        Mark::from_data(rect_data("b", 6.0)).unwrap(),
    ];
    block_on(editor.show_page(&loader, None, "p1.png", marks)).unwrap();

    let keys: Vec<&str> = editor.marks().map(|m| m.key.as_str()).collect();
    assert_eq!(keys, vec!["a", "b"]);
    assert!((editor.camera().scale - 1.0).abs() < f64::EPSILON);
    assert!(editor.scene().background().is_some());
    assert!(editor.host().created.is_empty());

    editor.fit_to_page();
    assert!((editor.camera().scale - 0.5).abs() < 1e-12);
}

#[test]
fn test_failed_page_load_keeps_editor_usable() {
    let loader = MemoryImageLoader::new();
    let mut editor = editor();
    editor.add_mark_silently(Mark::from_data(rect_data("kept", 5.0)).unwrap()).unwrap();

    let err = block_on(editor.show_page(&loader, None, "missing.png", Vec::new())).unwrap_err();
    assert!(matches!(err, EditorError::ImageLoad { .. }));
    assert!(editor.mark("kept").is_some());

    press(&mut editor, 300.0, 300.0);
    release(&mut editor, 300.0, 300.0);
    assert_eq!(editor.host().created.len(), 1);
}

#[test]
fn test_show_page_rejects_duplicate_keys() {
    let loader = MemoryImageLoader::new().with_image("p.png", Size::new(10.0, 10.0));
    let mut editor = editor();
    let marks = vec![
        Mark::from_data(rect_data("x", 5.0)).unwrap(),
        Mark::from_data(rect_data("x", 6.0)).unwrap(),
    ];
    assert_eq!(
        block_on(editor.show_page(&loader, None, "p.png", marks)),
        Err(EditorError::DuplicateKey("x".into()))
    );
    assert!(editor.page().is_none());
}
