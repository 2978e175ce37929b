use std::fmt::Write;

use pulldown_cmark::{Parser, html};

use crate::charts::ChartSpec;
use crate::dashboard::{
    Dashboard, EXPLORATION_HEADING, FILTERED, HEADING, HEATMAP, INSTRUCTION, SCATTER, TICKS, TITLE,
};
use crate::model::{Param, Widget};
use crate::reactive::{PaneContent, PaneId};

const HEADER_BACKGROUND: &str = "#f2505d";

const VEGA_SCRIPTS: &[&str] = &[
    "https://cdn.jsdelivr.net/npm/vega@5",
    "https://cdn.jsdelivr.net/npm/vega-lite@5",
    "https://cdn.jsdelivr.net/npm/vega-embed@6",
];

pub fn markdown_to_html(text: &str) -> String {
    let mut out = String::new();
    html::push_html(&mut out, Parser::new(text));
    out
}

/// The dashboard as one self-contained page. `sidebar_image` is a path
/// relative to the page.
pub fn render_page(dash: &Dashboard, sidebar_image: Option<&str>) -> String {
    let linked = dash.linked_ticks();
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    let _ = writeln!(out, "<title>{}</title>", escape_html(TITLE));
    for src in VEGA_SCRIPTS {
        let _ = writeln!(out, "<script src=\"{src}\"></script>");
    }
    let _ = writeln!(
        out,
        "<style>\n\
body {{ margin: 0; font-family: Arial, sans-serif; }}\n\
header {{ background: {HEADER_BACKGROUND}; color: white; padding: 1rem 2rem; }}\n\
.layout {{ display: flex; }}\n\
aside {{ width: 320px; padding: 1rem; border-right: 1px solid #ddd; }}\n\
aside img {{ max-width: 100%; }}\n\
main {{ flex: 1; padding: 1rem 2rem; }}\n\
.row {{ display: flex; gap: 2rem; align-items: flex-start; }}\n\
.control {{ margin: 0.75rem 0; }}\n\
.control label {{ display: block; font-weight: bold; }}\n\
.placeholder {{ color: #777; }}\n\
.pane-error {{ color: #b00020; }}\n\
</style>"
    );
    out.push_str("</head>\n<body>\n");
    let _ = writeln!(out, "<header><h1>{}</h1></header>", escape_html(TITLE));
    out.push_str("<div class=\"layout\">\n<aside>\n");
    out.push_str(&markdown_to_html(INSTRUCTION));
    if let Some(src) = sidebar_image {
        let _ = writeln!(
            out,
            "<img class=\"sidebar-image\" src=\"{}\" alt=\"\">",
            escape_html(src)
        );
    }
    render_controls(&mut out, dash, &[Param::Dataset, Param::CircleSize, Param::Opacity, Param::GeneCount]);
    out.push_str("<p class=\"placeholder\">Render again with:</p>\n<pre><code id=\"rerun\"></code></pre>\n");
    out.push_str("</aside>\n<main>\n");

    out.push_str("<section>\n");
    render_pane(&mut out, dash, HEADING);
    render_pane(&mut out, dash, SCATTER);
    out.push_str("</section>\n<section>\n");
    out.push_str(&markdown_to_html(EXPLORATION_HEADING));
    out.push_str("<div class=\"row\">\n");
    render_pane(&mut out, dash, HEATMAP);
    out.push_str("<div>\n");
    render_controls(&mut out, dash, &[Param::Gene]);
    render_pane(&mut out, dash, TICKS);
    // The linked view already draws the filtered ticks under the brush.
    if linked.is_none() {
        render_pane(&mut out, dash, FILTERED);
    }
    out.push_str("</div>\n</div>\n</section>\n");

    out.push_str("</main>\n</div>\n");
    render_embeds(&mut out, dash, linked.as_ref());
    out.push_str("</body>\n</html>\n");
    out
}

/// Command-line flag that sets `param` on the next render.
fn cli_flag(param: Param) -> &'static str {
    match param {
        Param::Dataset => "--dataset",
        Param::CircleSize => "--size",
        Param::Opacity => "--opacity",
        Param::GeneCount => "--genes",
        Param::Gene => "--gene",
    }
}

fn render_controls(out: &mut String, dash: &Dashboard, params: &[Param]) {
    for &param in params {
        let (Some(widget), Some(value)) = (dash.state().widget(param), dash.state().get(param))
        else {
            continue;
        };
        let id = format!("ctl-{param}");
        let current = escape_html(&value.to_string());
        let flag = cli_flag(param);
        let _ = write!(
            out,
            "<div class=\"control\"><label for=\"{id}\">{}</label>",
            escape_html(widget.label())
        );
        match widget {
            Widget::Select { options, .. } => {
                let _ = write!(out, "<select id=\"{id}\" data-flag=\"{flag}\">");
                for option in options {
                    let selected = if value.as_str() == Some(option.as_str()) {
                        " selected"
                    } else {
                        ""
                    };
                    let option = escape_html(option);
                    let _ = write!(out, "<option value=\"{option}\"{selected}>{option}</option>");
                }
                out.push_str("</select>");
            }
            Widget::FloatSlider { start, end, .. } => {
                let _ = write!(
                    out,
                    "<input type=\"range\" id=\"{id}\" data-flag=\"{flag}\" min=\"{start}\" max=\"{end}\" step=\"0.1\" value=\"{current}\">\
<output for=\"{id}\">{current}</output>"
                );
            }
            Widget::IntSlider { start, end, .. } => {
                let _ = write!(
                    out,
                    "<input type=\"range\" id=\"{id}\" data-flag=\"{flag}\" min=\"{start}\" max=\"{end}\" step=\"1\" value=\"{current}\">\
<output for=\"{id}\">{current}</output>"
                );
            }
            Widget::Autocomplete { .. } => {
                let _ = write!(
                    out,
                    "<input type=\"text\" id=\"{id}\" data-flag=\"{flag}\" list=\"{id}-options\" value=\"{current}\" placeholder=\"Enter a gene\"><datalist id=\"{id}-options\">"
                );
                for gene in dash.suggest_genes("") {
                    let _ = write!(out, "<option value=\"{}\">", escape_html(gene));
                }
                out.push_str("</datalist>");
            }
        }
        out.push_str("</div>\n");
    }
}

fn render_pane(out: &mut String, dash: &Dashboard, pane: PaneId) {
    let _ = write!(out, "<div id=\"pane-{pane}\">");
    match dash.pane(pane) {
        Some(PaneContent::Markdown(text)) => out.push_str(&markdown_to_html(text)),
        Some(PaneContent::Placeholder(text)) => {
            let _ = write!(
                out,
                "<div class=\"placeholder\">{}</div>",
                markdown_to_html(text)
            );
        }
        Some(PaneContent::Error(message)) => {
            let _ = write!(
                out,
                "<div class=\"pane-error\">Unavailable: {}</div>",
                escape_html(message)
            );
        }
        Some(PaneContent::Chart(_)) | None => {}
    }
    out.push_str("</div>\n");
}

// Keeps the "render again" line in step with the controls.
const CONTROLS_SCRIPT: &str = r#"const controls = Array.from(document.querySelectorAll('[data-flag]'));
function updateRerun() {
  const flags = controls
    .filter((c) => c.value !== '')
    .map((c) => c.dataset.flag + ' ' + JSON.stringify(c.value));
  document.getElementById('rerun').textContent = 'kira-scdash render ... ' + flags.join(' ');
  for (const c of controls) {
    const shown = document.querySelector('output[for="' + c.id + '"]');
    if (shown) shown.value = c.value;
  }
}
controls.forEach((c) => c.addEventListener('input', updateRerun));
updateRerun();
"#;

fn render_embeds(out: &mut String, dash: &Dashboard, linked: Option<&ChartSpec>) {
    out.push_str("<script>\n");
    for (pane, content) in dash.panes() {
        if linked.is_some() && (pane == TICKS || pane == FILTERED) {
            continue;
        }
        if let PaneContent::Chart(spec) = content {
            embed(out, pane, spec);
        }
    }
    if let Some(spec) = linked {
        embed(out, TICKS, spec);
    }
    out.push_str(CONTROLS_SCRIPT);
    out.push_str("</script>\n");
}

fn embed(out: &mut String, pane: PaneId, spec: &ChartSpec) {
    let json = serde_json::to_string(spec.as_json()).unwrap_or_else(|_| "{}".to_string());
    let _ = writeln!(
        out,
        "vegaEmbed('#pane-{pane}', {}, {{\"actions\": false}});",
        escape_script(&json)
    );
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

// Keeps inline JSON from closing the surrounding <script> element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}
