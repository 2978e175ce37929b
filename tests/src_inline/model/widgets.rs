use super::*;

fn state() -> WidgetState {
    let mut s = WidgetState::new();
    s.register(
        Param::Dataset,
        Widget::Select {
            label: "Cell Type".into(),
            options: vec!["healthy_day1".into(), "γδTCells".into()],
        },
        "γδTCells".into(),
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
        20i64.into(),
    )
    .unwrap();
    s.register(
        Param::Gene,
        Widget::Autocomplete {
            label: "Selected Gene".into(),
            options: vec!["CD3E".into(), "Gzmb".into(), "CD3D".into()],
            case_sensitive: false,
        },
        "".into(),
    )
    .unwrap();
    s
}

#[test]
fn test_set_reports_change_only_when_value_differs() {
    let mut s = state();
    assert!(s.set(Param::CircleSize, 40.0.into()).unwrap());
    assert!(!s.set(Param::CircleSize, 40.0.into()).unwrap());
    assert!(!s.set(Param::CircleSize, Value::Int(40)).unwrap());
    assert_eq!(s.float(Param::CircleSize).unwrap(), 40.0);
}

#[test]
fn test_sliders_clamp() {
    let mut s = state();
    s.set(Param::CircleSize, 500.0.into()).unwrap();
    assert_eq!(s.float(Param::CircleSize).unwrap(), 100.0);
    s.set(Param::GeneCount, Value::Int(0)).unwrap();
    assert_eq!(s.int(Param::GeneCount).unwrap(), 1);
}

#[test]
fn test_select_rejects_unknown_option() {
    let mut s = state();
    let err = s.set(Param::Dataset, "missing".into()).unwrap_err();
    assert!(matches!(err, WidgetError::NotAnOption { .. }));
    assert_eq!(s.str(Param::Dataset).unwrap(), "γδTCells");
}

#[test]
fn test_type_mismatch() {
    let mut s = state();
    let err = s.set(Param::GeneCount, "many".into()).unwrap_err();
    assert!(matches!(err, WidgetError::TypeMismatch { .. }));
}

#[test]
fn test_autocomplete_resolves_case_insensitively() {
    let mut s = state();
    s.set(Param::Gene, "gzmb".into()).unwrap();
    assert_eq!(s.str(Param::Gene).unwrap(), "Gzmb");
    assert!(s.set(Param::Gene, "nope".into()).is_err());
    s.set(Param::Gene, "".into()).unwrap();
    assert_eq!(s.str(Param::Gene).unwrap(), "");
}

#[test]
fn test_suggest_includes_strategy() {
    let s = state();
    let widget = s.widget(Param::Gene).unwrap();
    assert_eq!(widget.suggest("cd3"), vec!["CD3E", "CD3D"]);
    assert_eq!(widget.suggest("ZM"), vec!["Gzmb"]);
}

#[test]
fn test_param_parse_and_deserialize() {
    assert_eq!("gene_count".parse::<Param>().unwrap(), Param::GeneCount);
    assert!("size".parse::<Param>().is_err());
    let p: Param = serde_json::from_str("\"circle_size\"").unwrap();
    assert_eq!(p, Param::CircleSize);
    let v: Value = serde_json::from_str("40").unwrap();
    assert_eq!(v, Value::Int(40));
    let v: Value = serde_json::from_str("0.5").unwrap();
    assert_eq!(v, Value::Float(0.5));
}
