use std::cell::Cell;

use super::*;
use crate::model::Widget;

#[derive(Default)]
struct Ctx {
    loads: Cell<u32>,
}

fn state() -> WidgetState {
    let mut s = WidgetState::new();
    s.register(
        Param::Dataset,
        Widget::Select {
            label: "Cell Type".into(),
            options: vec!["a".into(), "b".into()],
        },
        "a".into(),
    )
    .unwrap();
    s.register(
        Param::CircleSize,
        Widget::FloatSlider {
            label: "Size".into(),
            start: 10.0,
            end: 100.0,
        },
        20.0.into(),
    )
    .unwrap();
    s.register(
        Param::GeneCount,
        Widget::IntSlider {
            label: "Number of Genes".into(),
            start: 1,
            end: 50,
        },
        Value::Int(20),
    )
    .unwrap();
    s
}

fn binder(ctx: &Ctx) -> Binder<Ctx> {
    let mut b = Binder::new(state());
    b.bind(ctx, "heading", &[Param::Dataset], |_, s| {
        Ok(PaneContent::Markdown(format!(
            "# General property of {}",
            s.str(Param::Dataset)?
        )))
    });
    b.bind(
        ctx,
        "scatter",
        &[Param::Dataset, Param::CircleSize],
        |c: &Ctx, s| {
            c.loads.set(c.loads.get() + 1);
            Ok(PaneContent::Markdown(format!(
                "{}@{}",
                s.str(Param::Dataset)?,
                s.float(Param::CircleSize)?
            )))
        },
    );
    b.bind(ctx, "heatmap", &[Param::GeneCount, Param::Dataset], |_, s| {
        if s.int(Param::GeneCount)? > 40 {
            return Err(ChartError::InvalidParameter {
                name: "gene count",
                reason: "too many".into(),
            }
            .into());
        }
        Ok(PaneContent::Placeholder("heatmap".into()))
    });
    b
}

#[test]
fn test_bind_computes_initial_content() {
    let ctx = Ctx::default();
    let b = binder(&ctx);
    assert_eq!(
        b.content("heading"),
        Some(&PaneContent::Markdown("# General property of a".into()))
    );
    assert_eq!(b.recomputations("scatter"), 1);
    assert_eq!(ctx.loads.get(), 1);
}

#[test]
fn test_only_dependents_recompute() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    let refreshed = b.set(&ctx, Param::CircleSize, 40.0.into()).unwrap();
    assert_eq!(refreshed, vec!["scatter"]);
    assert_eq!(b.recomputations("heading"), 1);
    assert_eq!(b.recomputations("heatmap"), 1);
    assert_eq!(b.recomputations("scatter"), 2);
    assert_eq!(
        b.content("scatter"),
        Some(&PaneContent::Markdown("a@40".into()))
    );
}

#[test]
fn test_shared_dependency_refreshes_in_registration_order() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    let refreshed = b.set(&ctx, Param::Dataset, "b".into()).unwrap();
    assert_eq!(refreshed, vec!["heading", "scatter", "heatmap"]);
    assert_eq!(b.dependents(Param::GeneCount), vec!["heatmap"]);
}

#[test]
fn test_unchanged_value_is_not_an_event() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    assert!(b.set(&ctx, Param::Dataset, "a".into()).unwrap().is_empty());
    assert_eq!(b.recomputations("heading"), 1);
}

#[test]
fn test_failure_is_isolated_to_one_pane() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    b.set(&ctx, Param::GeneCount, Value::Int(45)).unwrap();
    assert!(b.content("heatmap").unwrap().is_error());
    assert!(!b.content("scatter").unwrap().is_error());
    assert!(!b.content("heading").unwrap().is_error());

    b.set(&ctx, Param::GeneCount, Value::Int(10)).unwrap();
    assert_eq!(
        b.content("heatmap"),
        Some(&PaneContent::Placeholder("heatmap".into()))
    );
}

#[test]
fn test_invalid_value_leaves_state_alone() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    assert!(b.set(&ctx, Param::Dataset, "zzz".into()).is_err());
    assert_eq!(b.state().str(Param::Dataset).unwrap(), "a");
    assert_eq!(b.recomputations("heading"), 1);
}

#[test]
fn test_refresh_reruns_single_pane() {
    let ctx = Ctx::default();
    let mut b = binder(&ctx);
    assert!(b.refresh(&ctx, "heading"));
    assert!(!b.refresh(&ctx, "missing"));
    assert_eq!(b.recomputations("heading"), 2);
    assert_eq!(b.recomputations("scatter"), 1);
}
