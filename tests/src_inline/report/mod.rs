use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::config::DashboardConfig;
use crate::model::Param;

static DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let id = DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    dir.push(format!("kira_scdash_report_test_{}_{}", std::process::id(), id));
    fs::create_dir_all(&dir).unwrap();
    dir
}

const GLOBAL_WITH_MARKUP: &str =
    "CD3E\tcondition\ttime\n0.1\thealthy\tday0\n</script>\tmild\tday1\n";

const GLOBAL_NUMERIC: &str = "CD3E\tcondition\ttime\n0.1\thealthy\tday0\n0.9\tmild\tday1\n1.7\tsevere\tday3\n";

fn dashboard() -> (Dashboard, PathBuf) {
    dashboard_with(GLOBAL_WITH_MARKUP)
}

fn dashboard_with(global_table: &str) -> (Dashboard, PathBuf) {
    let root = make_temp_dir();
    let single = root.join("single_level");
    let heat = root.join("heatmap");
    fs::create_dir_all(&single).unwrap();
    fs::create_dir_all(&heat).unwrap();
    fs::write(
        single.join("healthy_day1.tsv"),
        "PC_condition\tPC_Time\tCondition\tTime\n0.1\t0.2\thealthy\tday1\n0.3\t0.4\tmild\tday3\n",
    )
    .unwrap();
    fs::write(
        heat.join("healthy_day1.tsv"),
        "condition\tG1\tG2\nhealthy\t0.1\t0.2\nmild\t0.3\t0.4\n",
    )
    .unwrap();
    let global = root.join("test.tsv");
    fs::write(&global, global_table).unwrap();
    let dash = Dashboard::open(&DashboardConfig::new(single, heat, global)).unwrap();
    (dash, root.join("out"))
}

#[test]
fn test_write_outputs() {
    let (dash, out) = dashboard();
    let written = write_outputs(&dash, &out, &PageOptions::default()).unwrap();
    assert!(out.join(PAGE_FILE).is_file());
    assert!(out.join(STATE_FILE).is_file());
    assert!(out.join("specs/scatter.json").is_file());
    assert!(out.join("specs/heatmap.json").is_file());
    assert!(!out.join("specs/ticks.json").exists());
    assert_eq!(written.len(), 4);

    let state: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join(STATE_FILE)).unwrap()).unwrap();
    assert_eq!(state["widgets"]["dataset"], "healthy_day1");
    assert_eq!(state["widgets"]["gene_count"], 20);
    assert_eq!(state["panes"]["scatter"]["kind"], "chart");
    assert_eq!(state["panes"]["filtered"]["text"], "## No selection");
    assert_eq!(
        state["dependencies"]["dataset"],
        serde_json::json!(["heading", "scatter", "heatmap"])
    );
    assert_eq!(
        state["dependencies"]["gene"],
        serde_json::json!(["ticks", "filtered"])
    );
}

#[test]
fn test_page_layout() {
    let (mut dash, _) = dashboard();
    // CD3E is categorical here (one cell is not a number), so no gene options.
    assert!(dash.set_widget(Param::Gene, "CD3E".into()).is_err());
    let page = html::render_page(&dash, None);
    assert!(page.contains("<title>Visualizing Single-Cell Data in Traumatic Brain Injury</title>"));
    assert!(page.contains("#f2505d"));
    assert!(page.contains("<h1>General property of healthy_day1</h1>"));
    assert!(page.contains("<h1>Gene expression exploration</h1>"));
    assert!(page.contains("vegaEmbed('#pane-scatter'"));
    assert!(page.contains("vegaEmbed('#pane-heatmap'"));
    assert!(!page.contains("vegaEmbed('#pane-ticks'"));
    assert!(page.contains("<h2>No selection</h2>"));
    assert!(!page.contains("sidebar-image"));
}

#[test]
fn test_page_controls_reflect_state() {
    let (dash, _) = dashboard();
    let page = html::render_page(&dash, None);
    assert!(page.contains("<select id=\"ctl-dataset\" data-flag=\"--dataset\">"));
    assert!(page.contains("<option value=\"healthy_day1\" selected>healthy_day1</option>"));
    assert!(page.contains(
        "<input type=\"range\" id=\"ctl-circle_size\" data-flag=\"--size\" min=\"10\" max=\"100\""
    ));
    assert!(page.contains("id=\"ctl-gene_count\" data-flag=\"--genes\" min=\"1\" max=\"50\" step=\"1\" value=\"20\""));
    assert!(page.contains("list=\"ctl-gene-options\""));
    assert!(page.contains("id=\"rerun\""));
}

#[test]
fn test_page_links_brush_to_filtered_view() {
    let (mut dash, out) = dashboard_with(GLOBAL_NUMERIC);
    dash.set_widget(Param::Gene, "CD3E".into()).unwrap();
    let page = html::render_page(&dash, None);
    assert!(page.contains("<option value=\"CD3E\">"));
    assert!(page.contains("vegaEmbed('#pane-ticks'"));
    assert!(!page.contains("vegaEmbed('#pane-filtered'"));
    assert!(!page.contains("id=\"pane-filtered\""));
    assert!(page.contains("\"vconcat\""));
    assert!(
        page.contains("\"filter\":{\"empty\":false,\"param\":\"brush\"}")
            || page.contains("\"filter\":{\"param\":\"brush\",\"empty\":false}")
    );

    let written = write_outputs(&dash, &out, &PageOptions::default()).unwrap();
    let linked: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.join("specs/ticks_linked.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(
        linked["vconcat"][1]["transform"][0]["filter"]["param"],
        "brush"
    );
    assert_eq!(linked["vconcat"][0]["params"][0]["name"], "brush");
    assert!(written.contains(&out.join("specs/ticks_linked.json")));
}

#[test]
fn test_sidebar_image_copied_and_shown() {
    let (dash, out) = dashboard();
    let image = out.parent().unwrap().join("injury.png");
    fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();
    let options = PageOptions {
        sidebar_image: Some(image),
    };
    let written = write_outputs(&dash, &out, &options).unwrap();
    assert!(out.join("injury.png").is_file());
    assert!(written.contains(&out.join("injury.png")));
    let page = fs::read_to_string(out.join(PAGE_FILE)).unwrap();
    assert!(page.contains("<img class=\"sidebar-image\" src=\"injury.png\" alt=\"\">"));
}

#[test]
fn test_missing_sidebar_image_is_skipped() {
    let (dash, out) = dashboard();
    let options = PageOptions {
        sidebar_image: Some(out.join("nope.png")),
    };
    write_outputs(&dash, &out, &options).unwrap();
    let page = fs::read_to_string(out.join(PAGE_FILE)).unwrap();
    assert!(!page.contains("sidebar-image"));
}
