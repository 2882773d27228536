use notion2hugo_common::TextRun;

/// Render a rich text sequence as inline Markdown.
///
/// Runs are rendered independently and concatenated; adjacent runs with the
/// same styling are not merged. Bold wraps first, then the code span, and a
/// link always ends up outermost. Italic, strikethrough and underline are
/// carried in the data but not rendered.
pub fn render_inline(runs: &[TextRun]) -> String {
    let mut md = String::new();
    for run in runs {
        md.push_str(&render_run(run));
    }
    md
}

fn render_run(run: &TextRun) -> String {
    let mut text = run.plain_text.clone();
    if run.annotations.bold {
        text = format!("**{text}**");
    }
    if run.annotations.code {
        text = format!("`{text}`");
    }
    match run.href.as_deref() {
        Some(href) if !href.is_empty() => format!("[{text}]({href})"),
        _ => text,
    }
}
