use approx::assert_relative_eq;
use glam::{Vec2, Vec3};
use sk_cad::{CadKernel, MemoryKernel};
use sk_frontend::*;
use sk_renderer::{Camera, ProxyCategory, Scene};
use uuid::Uuid;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Top-down viewport at 20 px per unit, origin at pixel (400, 300)
fn viewport_with(mut kernel: MemoryKernel) -> Viewport<MemoryKernel> {
    init_tracing();
    let root = kernel.root();
    let mut config = EditorConfig::default();
    config.renderer.viewport.width = 800.0;
    config.renderer.viewport.height = 600.0;
    let camera = Camera::top_down(Vec3::ZERO, 15.0, 800.0 / 600.0);
    let scene = Scene::with_camera(&config.renderer, camera);
    Viewport::new(kernel, root, Box::new(scene), config).unwrap()
}

fn viewport() -> Viewport<MemoryKernel> {
    viewport_with(MemoryKernel::new())
}

fn screen(vp: &Viewport<MemoryKernel>, p: Vec3) -> Vec2 {
    vp.sync().renderer().to_screen(p).unwrap()
}

fn down(vp: &mut Viewport<MemoryKernel>, p: Vec3) {
    let s = screen(vp, p);
    vp.mouse_down(p, s).unwrap();
}

fn moved(vp: &mut Viewport<MemoryKernel>, p: Vec3) {
    let s = screen(vp, p);
    vp.mouse_move(p, s).unwrap();
}

fn elements(vp: &Viewport<MemoryKernel>) -> Vec<Uuid> {
    let doc = vp.document();
    let sketch = doc.sketch_of(vp.kernel(), doc.active()).unwrap();
    vp.kernel().get_sketch_elements(sketch).unwrap()
}

fn region_count(vp: &Viewport<MemoryKernel>) -> usize {
    let renderer = vp.sync().renderer();
    renderer
        .proxy_ids()
        .into_iter()
        .filter(|id| {
            renderer
                .get(*id)
                .is_some_and(|p| p.tag.category == ProxyCategory::Region)
        })
        .count()
}

fn curve_owners(vp: &Viewport<MemoryKernel>) -> Vec<Option<Uuid>> {
    let renderer = vp.sync().renderer();
    renderer
        .proxy_ids()
        .into_iter()
        .filter_map(|id| renderer.get(id))
        .filter(|p| p.tag.category == ProxyCategory::Curve)
        .map(|p| p.tag.component)
        .collect()
}

fn v(x: f32, y: f32) -> Vec3 {
    Vec3::new(x, y, 0.0)
}

// ── Drawing ─────────────────────────────────────────────────────────────────

#[test]
fn line_chain_closes_on_start_point() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();

    down(&mut vp, v(0.0, 0.0));
    moved(&mut vp, v(10.0, 0.0));
    down(&mut vp, v(10.0, 0.0));
    down(&mut vp, v(0.0, 0.0));

    assert_eq!(elements(&vp).len(), 2);
    assert_eq!(vp.tool().construction_element(), None);
}

#[test]
fn closed_triangle_becomes_a_region() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    assert_eq!(region_count(&vp), 0);

    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(4.0, 0.0));
    down(&mut vp, v(4.0, 3.0));
    down(&mut vp, v(0.0, 0.0));

    assert_eq!(elements(&vp).len(), 3);
    assert_eq!(region_count(&vp), 1);
}

#[test]
fn arc_resets_after_third_press() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Arc).unwrap();

    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(4.0, 0.0));
    assert!(vp.tool().construction_element().is_some());
    down(&mut vp, v(2.0, 2.0));

    assert_eq!(vp.tool().construction_element(), None);
    let arc = elements(&vp)[0];
    assert_eq!(
        vp.kernel().get_handles(arc).unwrap(),
        vec![v(0.0, 0.0), v(4.0, 0.0), v(2.0, 2.0)]
    );
    assert_relative_eq!(
        vp.kernel().element(arc).unwrap().radius().unwrap(),
        2.0,
        epsilon = 1e-4
    );
}

#[test]
fn switching_tools_discards_unfinished_line() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(3.0, 0.0));
    assert_eq!(elements(&vp).len(), 2);

    vp.select_tool(ToolKind::Circle).unwrap();
    assert_eq!(elements(&vp).len(), 1);
}

// ── Snapping ────────────────────────────────────────────────────────────────

#[test]
fn cursor_aligns_with_remembered_snap_point() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(5.0, 0.0));

    // Pass close to (5, 0) so it is remembered, then move up beside it
    moved(&mut vp, v(5.1, 0.1));
    assert_eq!(vp.snapper().last_snaps(), &[v(5.0, 0.0)]);
    vp.take_events();
    moved(&mut vp, v(5.2, 3.0));

    let line = vp.tool().construction_element().unwrap();
    let end = vp.kernel().get_handles(line).unwrap()[1];
    assert_eq!(end, v(5.0, 3.0));

    let guides = vp.snapper().guides();
    assert_eq!(guides.len(), 1);
    assert_eq!(guides[0].axis, GuideAxis::Vertical);
    assert_eq!(guides[0].id, "v500.0:300.0");
    assert!(vp.snapper().anchor().is_none());

    let reported = vp.take_events().into_iter().any(|e| {
        matches!(e, ViewportEvent::SnapGuidesUpdated { ref guides, .. } if guides.len() == 1)
    });
    assert!(reported);
}

#[test]
fn selection_does_not_snap() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(4.0, 0.0));
    vp.select_tool(ToolKind::Manipulation).unwrap();
    vp.take_events();

    moved(&mut vp, v(4.1, 0.1));
    moved(&mut vp, v(4.2, 3.0));
    assert!(vp.snapper().last_snaps().is_empty());
    let snapped = vp
        .take_events()
        .into_iter()
        .any(|e| matches!(e, ViewportEvent::SnapGuidesUpdated { .. }));
    assert!(!snapped);
}

// ── Chooser ─────────────────────────────────────────────────────────────────

#[test]
fn chooser_times_out() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(-2.0, 0.0));
    down(&mut vp, v(2.0, 0.0));
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, -2.0));
    down(&mut vp, v(0.0, 2.0));
    vp.select_tool(ToolKind::Manipulation).unwrap();
    assert_eq!(elements(&vp).len(), 2);
    vp.take_events();

    down(&mut vp, v(0.0, 0.0));
    assert_eq!(vp.pending_chooser().map(|c| c.candidates.len()), Some(2));

    vp.tick(5.0).unwrap();
    assert!(vp.pending_chooser().is_some());
    vp.tick(10.0).unwrap();
    assert!(vp.pending_chooser().is_none());

    let events = vp.take_events();
    assert!(events.contains(&ViewportEvent::ChooserClosed));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, ViewportEvent::SelectionChanged(Some(_))))
    );
}

#[test]
fn chooser_answer_selects_candidate() {
    let mut vp = viewport();
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(-2.0, 0.0));
    down(&mut vp, v(2.0, 0.0));
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, -2.0));
    down(&mut vp, v(0.0, 2.0));
    vp.select_tool(ToolKind::Manipulation).unwrap();

    down(&mut vp, v(0.0, 0.0));
    let first = vp.pending_chooser().and_then(|c| c.get(0)).unwrap();
    vp.resolve_chooser(Some(0)).unwrap();

    let Picked::Element(element) = first else {
        panic!("expected a curve, got {first:?}");
    };
    assert_eq!(vp.sync().selected_element(), Some(element));
}

// ── Lifecycle ───────────────────────────────────────────────────────────────

#[test]
fn teardown_returns_every_lease() {
    let mut kernel = MemoryKernel::new();
    let root = kernel.root_id();
    kernel.add_box(root, v(-1.0, -1.0), Vec3::new(1.0, 1.0, 1.0)).unwrap();
    let child = kernel.add_component(root).unwrap();
    kernel.add_box(child, v(3.0, 3.0), Vec3::new(4.0, 4.0, 1.0)).unwrap();

    let mut vp = viewport_with(kernel);
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(4.0, 0.0));
    down(&mut vp, v(4.0, 3.0));
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(-3.0, -3.0));
    assert_eq!(region_count(&vp), 1);

    let doc = vp.document();
    let sketch = doc.sketch_of(vp.kernel(), doc.active()).unwrap();

    let kernel = vp.teardown().unwrap();
    assert_eq!(kernel.live_handles(), 0);
    // The half-drawn line went away with the tool
    assert_eq!(kernel.get_sketch_elements(sketch).unwrap().len(), 3);
}

#[test]
fn active_component_switch_reloads_and_resets() {
    let mut kernel = MemoryKernel::new();
    let child = kernel.add_component(kernel.root_id()).unwrap();
    let mut vp = viewport_with(kernel);
    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(1.0, 1.0));

    vp.set_active_component(child).unwrap();
    assert_eq!(vp.document().active(), child);
    assert_eq!(vp.tool().name(), "Select");
    assert!(vp.snapper().guides().is_empty());
    assert!(elements(&vp).is_empty());
}

#[test]
fn component_switch_mid_spline_hides_previous_curves() {
    let mut kernel = MemoryKernel::new();
    let root = kernel.root_id();
    let child = kernel.add_component(root).unwrap();
    let mut vp = viewport_with(kernel);
    vp.select_tool(ToolKind::Spline).unwrap();
    down(&mut vp, v(0.0, 0.0));
    down(&mut vp, v(2.0, 1.0));
    down(&mut vp, v(4.0, 0.0));
    let spline = vp.tool().construction_element().unwrap();

    vp.set_active_component(child).unwrap();
    assert_eq!(vp.document().active(), child);
    assert!(curve_owners(&vp).iter().all(|owner| *owner == Some(child)));
    assert_eq!(vp.sync().element_proxy(spline), None);
    // The spline itself survives without its cursor-following tail
    assert_eq!(
        vp.kernel().get_handles(spline).unwrap(),
        vec![v(0.0, 0.0), v(2.0, 1.0), v(4.0, 0.0)]
    );

    vp.select_tool(ToolKind::Line).unwrap();
    down(&mut vp, v(1.0, 1.0));
    down(&mut vp, v(3.0, 1.0));
    vp.set_active_component(root).unwrap();
    assert_eq!(curve_owners(&vp), vec![Some(root)]);
    assert!(vp.sync().element_proxy(spline).is_some());
}
