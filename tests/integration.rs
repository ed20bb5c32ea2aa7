//! Integration tests for quill-tui.
//!
//! These tests exercise the public API from outside the crate: components
//! with hooks, reconciliation across renders, painting, and the app shell
//! writing frames into a byte-buffer sink.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use quill_tui::app::{App, AppConfig};
use quill_tui::element::{Element, Props};
use quill_tui::error::RenderError;
use quill_tui::hooks::{use_context, use_effect, use_state, CleanupFn, Dep, StateSetter};
use quill_tui::reconciler::Renderer;
use quill_tui::render::{FrameWriter, WriteMode};
use quill_tui::style::{
    BorderKind, Dimension, FlexDirection, JustifyContent, Style, TextStyle,
};
use quill_tui::text::strip_ansi;

fn plain(renderer: &Renderer) -> String {
    strip_ansi(&renderer.frame())
}

// ---------------------------------------------------------------------------
// Static composition
// ---------------------------------------------------------------------------

#[test]
fn test_bordered_panel_with_styled_text() {
    let mut renderer = Renderer::new(30);
    let panel = Element::container()
        .with_style(
            Style::new()
                .with_width(14.0)
                .with_border(BorderKind::Single)
                .with_background("blue"),
        )
        .with_child(Element::text().with_style(Style {
            color: Some("yellow".to_string()),
            text: TextStyle {
                bold: true,
                ..TextStyle::default()
            },
            ..Style::default()
        }).with_text("status: ok"));
    renderer.render(panel).unwrap();

    assert_eq!(
        plain(&renderer),
        "┌────────────┐\n│status: ok  │\n└────────────┘"
    );
    let frame = renderer.frame();
    assert!(frame.contains("\u{1b}[44m"));
    assert!(frame.contains("\u{1b}[33m"));
    assert!(frame.contains("\u{1b}[1m"));
}

#[test]
fn test_row_layout_with_justify_content() {
    let mut renderer = Renderer::new(11);
    let row = Element::container()
        .with_style(Style {
            width: Dimension::Cells(11.0),
            flex_direction: FlexDirection::Row,
            justify_content: Some(JustifyContent::SpaceBetween),
            ..Style::default()
        })
        .with_child(Element::text().with_text("ab"))
        .with_child(Element::text().with_text("cd"));
    renderer.render(row).unwrap();
    assert_eq!(plain(&renderer), "ab       cd");
}

#[test]
fn test_column_layout_stacks_children() {
    let mut renderer = Renderer::new(10);
    let column = Element::container()
        .with_style(Style::new().with_direction(FlexDirection::Column))
        .with_child(Element::text().with_text("top"))
        .with_child(Element::text().with_text("bottom"));
    renderer.render(column).unwrap();
    assert_eq!(plain(&renderer), "top\nbottom");
}

// ---------------------------------------------------------------------------
// Components and state
// ---------------------------------------------------------------------------

thread_local! {
    static SETTER: RefCell<Option<StateSetter<i64>>> = const { RefCell::new(None) };
}

fn counter(props: &Props) -> Result<Element, RenderError> {
    let start = props.get_int("start").unwrap_or(0);
    let (count, set) = use_state(move || start)?;
    SETTER.with(|s| *s.borrow_mut() = Some(set));
    Ok(Element::text().with_text(format!("count: {count}")))
}

#[test]
fn test_state_update_rerenders_through_the_app() {
    let mut app = App::with_sink(AppConfig::new().with_width(20), Vec::new());
    app.render(Element::component("Counter", counter).with_prop("start", 4))
        .unwrap();
    assert_eq!(strip_ansi(&app.frame()), "count: 4");

    let set = SETTER.with(|s| s.borrow().clone().unwrap());
    set.update(|n| n + 1);
    assert_eq!(strip_ansi(&app.frame()), "count: 5");
}

#[test]
fn test_batched_updates_commit_once() {
    let mut renderer = Renderer::new(20);
    let commits = Rc::new(RefCell::new(0usize));
    let seen = commits.clone();
    renderer.on_commit(move |_, _| *seen.borrow_mut() += 1);

    renderer
        .render(Element::component("Counter", counter))
        .unwrap();
    let before = *commits.borrow();

    let set = SETTER.with(|s| s.borrow().clone().unwrap());
    renderer.batch(|| {
        set.set(10);
        set.update(|n| n * 2);
        set.update(|n| n + 1);
    });
    assert_eq!(*commits.borrow(), before + 1);
    assert_eq!(plain(&renderer), "count: 21");
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

thread_local! {
    static LABEL: quill_tui::context::Context<String> =
        quill_tui::context::Context::new("anonymous".to_string());
}

fn greeter(_: &Props) -> Result<Element, RenderError> {
    let label = LABEL.with(use_context)?;
    Ok(Element::text().with_text(format!("hi {label}")))
}

#[test]
fn test_context_provider_feeds_descendants() {
    let mut renderer = Renderer::new(20);
    let tree = LABEL
        .with(|ctx| Element::provider(ctx, "ada".to_string()))
        .with_child(Element::container().with_child(Element::component("Greeter", greeter)));
    renderer.render(tree).unwrap();
    assert_eq!(plain(&renderer), "hi ada");
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

fn ticker(props: &Props) -> Result<Element, RenderError> {
    let tick = props.get_int("tick").unwrap_or(0);
    use_effect(
        move || {
            LOG.with(|l| l.borrow_mut().push(format!("start {tick}")));
            Some(Box::new(move || {
                LOG.with(|l| l.borrow_mut().push(format!("stop {tick}")));
            }) as CleanupFn)
        },
        Some(vec![Dep::Int(tick)]),
    )?;
    Ok(Element::text().with_text(tick.to_string()))
}

#[test]
fn test_effect_lifecycle_across_renders_and_unmount() {
    LOG.with(|l| l.borrow_mut().clear());
    let mut app = App::with_sink(AppConfig::new().with_width(10), Vec::new());
    let tree = |tick: i64| Element::component("Ticker", ticker).with_prop("tick", tick);

    app.render(tree(1)).unwrap();
    app.render(tree(1)).unwrap();
    app.render(tree(2)).unwrap();
    app.unmount().unwrap();

    LOG.with(|l| {
        assert_eq!(
            *l.borrow(),
            vec!["start 1", "stop 1", "start 2", "stop 2"]
        );
    });
}

// ---------------------------------------------------------------------------
// Error boundaries
// ---------------------------------------------------------------------------

fn broken(_: &Props) -> Result<Element, RenderError> {
    Err(RenderError::component("Broken", "no data"))
}

#[test]
fn test_error_boundary_renders_fallback() {
    let mut renderer = Renderer::new(60);
    let tree = Element::container()
        .with_fallback(|err| Element::text().with_text(format!("recovered: {err}")))
        .with_child(Element::component("Broken", broken));
    renderer.render(tree).unwrap();
    assert!(plain(&renderer).contains("recovered:"));
    assert!(plain(&renderer).contains("no data"));
}

#[test]
fn test_uncaught_error_preserves_last_frame() {
    let mut renderer = Renderer::new(20);
    renderer.render(Element::text().with_text("stable")).unwrap();
    assert!(renderer
        .render(Element::component("Broken", broken))
        .is_err());
    assert_eq!(plain(&renderer), "stable");
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

thread_local! {
    static FIELD_SETTERS: RefCell<Vec<(String, StateSetter<String>)>> =
        const { RefCell::new(Vec::new()) };
}

fn field(props: &Props) -> Result<Element, RenderError> {
    let name = props.get_str("name").unwrap_or_default().to_string();
    let initial = name.clone();
    let (value, set) = use_state(move || initial)?;
    FIELD_SETTERS.with(|s| s.borrow_mut().push((name, set)));
    Ok(Element::text().with_text(value))
}

fn form(order: &[&str]) -> Element {
    Element::container()
        .with_style(Style::new().with_direction(FlexDirection::Column))
        .with_children(order.iter().map(|name| {
            Element::component("Field", field)
                .with_key(*name)
                .with_prop("name", *name)
        }))
}

#[test]
fn test_keyed_children_keep_state_across_reorder() {
    let mut renderer = Renderer::new(20);
    renderer.render(form(&["user", "mail"])).unwrap();

    let set = FIELD_SETTERS.with(|s| {
        s.borrow()
            .iter()
            .find(|(name, _)| name == "user")
            .map(|(_, set)| set.clone())
            .unwrap()
    });
    set.set("edited".to_string());
    assert_eq!(plain(&renderer), "edited\nmail");

    renderer.render(form(&["mail", "user"])).unwrap();
    assert_eq!(plain(&renderer), "mail\nedited");
}

// ---------------------------------------------------------------------------
// Writer behavior through the app
// ---------------------------------------------------------------------------

#[test]
fn test_identical_frames_write_no_bytes() {
    let mut renderer = Renderer::new(10);
    let mut writer = FrameWriter::new(Vec::new(), WriteMode::Incremental);

    renderer.render(Element::text().with_text("same")).unwrap();
    writer.render(&renderer.frame()).unwrap();
    let before = writer.sink().len();

    // Re-rendering an identical tree commits an identical frame, and an
    // identical frame reaches the sink as zero bytes.
    renderer.render(Element::text().with_text("same")).unwrap();
    writer.render(&renderer.frame()).unwrap();
    assert_eq!(writer.sink().len(), before);
}

#[test]
fn test_throttled_app_flushes_on_tick() {
    let config = AppConfig::new()
        .with_width(10)
        .with_throttle(Duration::from_secs(30));
    let mut app = App::with_sink(config, Vec::new());

    app.render(Element::text().with_text("first")).unwrap();
    app.render(Element::text().with_text("second")).unwrap();
    assert_eq!(strip_ansi(&app.frame()), "second");

    app.tick(Instant::now() + Duration::from_secs(31)).unwrap();
    app.unmount().unwrap();
}
