//! Server-side HTML for the dashboard and the source viewer.
//!
//! Pages are single-file HTML with inline CSS; controls are plain GET forms
//! so the dashboard works without a script bundle.

use strum::IntoEnumIterator;

use crate::market::{Currency, SortOrder};
use crate::table::{Cell, PageItem, PaginationControl, TableSnapshot};
use crate::utils::escape_html;
use crate::viewer::{SourceFile, SourceViewer};

/// Seconds between reloads while a fetch is in flight.
const LOADING_REFRESH_SECS: u32 = 1;

const STYLE: &str = r#"
      * { box-sizing: border-box; }
      body { margin: 0; font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; color: #1f1f1f; background: #f5f5f5; }
      .wrap { max-width: 1080px; margin: 0 auto; padding: 24px 18px 42px; display: flex; flex-direction: column; gap: 24px; }
      h1 { font-size: 24px; font-weight: 400; margin: 0; }
      .controls { display: flex; gap: 24px; flex-wrap: wrap; }
      select { width: 200px; padding: 6px 8px; border: 1px solid #d9d9d9; border-radius: 6px; background: #fff; }
      .notice { padding: 10px 14px; border-radius: 8px; font-size: 14px; }
      .notice.error { background: #fff2f0; border: 1px solid #ffccc7; color: #a8071a; }
      .notice.loading { background: #e6f4ff; border: 1px solid #91caff; color: #0958d9; }
      table.markets { width: 100%; border-collapse: collapse; background: #fff; border-radius: 8px; overflow: hidden; }
      table.markets th, table.markets td { padding: 12px 16px; text-align: left; border-bottom: 1px solid #f0f0f0; font-size: 14px; }
      table.markets th { background: #fafafa; font-weight: 600; }
      .name { display: flex; gap: 16px; align-items: center; }
      .empty { text-align: center; color: #8c8c8c; }
      .pager { display: flex; gap: 8px; align-items: center; justify-content: flex-end; flex-wrap: wrap; }
      .pager a, .pager span { min-width: 32px; padding: 4px 8px; text-align: center; border-radius: 6px; text-decoration: none; color: inherit; }
      .pager .current { border: 1px solid #1677ff; color: #1677ff; }
      .pager .disabled { color: #bfbfbf; }
      .pager select { width: auto; }
      table.code { border-collapse: collapse; font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; background: #fff; width: 100%; }
      table.code td { padding: 0 10px; white-space: pre; vertical-align: top; }
      table.code td.ln { color: #8c8c8c; text-align: right; user-select: none; border-right: 1px solid #f0f0f0; }
      .files { display: flex; gap: 12px; flex-wrap: wrap; font-size: 13px; }
      .files a.current { font-weight: 700; }
      .tok-keyword { color: #cf222e; }
      .tok-string { color: #0a3069; }
      .tok-comment { color: #6e7781; font-style: italic; }
      .tok-number { color: #0550ae; }
      .tok-lifetime { color: #8250df; }
      @media (max-width: 767px) {
        .name img { width: 24px; }
        table.markets th, table.markets td { font-size: 12px; }
      }
"#;

/// Render the dashboard page for a table snapshot.
pub fn render_dashboard(snapshot: &TableSnapshot) -> String {
    let refresh = if snapshot.fetch.loading {
        format!(
            r#"<meta http-equiv="refresh" content="{}" />"#,
            LOADING_REFRESH_SECS
        )
    } else {
        String::new()
    };

    let mut notices = String::new();
    if let Some(error) = &snapshot.fetch.error {
        notices.push_str(&format!(
            r#"<div class="notice error" role="alert">Failed to load markets ({}): {}</div>"#,
            error.kind,
            escape_html(&error.message)
        ));
    }
    if snapshot.fetch.loading {
        notices.push_str(r#"<div class="notice loading">Loading...</div>"#);
    }

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    {refresh}
    <title>Coins &amp; Markets</title>
    <style>{style}</style>
  </head>
  <body>
    <div class="wrap">
      <h1>Coins &amp; Markets</h1>
      <div class="controls">
        {currency}
        {order}
      </div>
      {notices}
      {table}
      {pager}
      <a href="/source">App source code</a>
    </div>
  </body>
</html>
"#,
        refresh = refresh,
        style = STYLE,
        currency = currency_selector(snapshot.query.currency),
        order = order_selector(snapshot.query.sort_order),
        notices = notices,
        table = render_table(snapshot),
        pager = render_pagination(&snapshot.pagination),
    )
}

fn currency_selector(selected: Currency) -> String {
    let options: String = Currency::iter()
        .map(|currency| {
            option(
                currency.code(),
                currency.label(),
                currency == selected,
            )
        })
        .collect();
    select_form("/table/currency", "value", "Currency", &options)
}

fn order_selector(selected: SortOrder) -> String {
    let options: String = SortOrder::iter()
        .map(|order| option(&order.to_string(), order.label(), order == selected))
        .collect();
    select_form("/table/order", "value", "Sort order", &options)
}

fn select_form(action: &str, name: &str, label: &str, options: &str) -> String {
    format!(
        r#"<form method="get" action="{action}"><select name="{name}" aria-label="{label}" onchange="this.form.submit()">{options}</select><noscript><button type="submit">Apply</button></noscript></form>"#,
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

fn render_table(snapshot: &TableSnapshot) -> String {
    let head: String = snapshot
        .columns
        .iter()
        .map(|column| format!("<th>{}</th>", escape_html(column.title)))
        .collect();

    let rows = snapshot.rendered_rows();
    let body: String = if rows.is_empty() {
        format!(
            r#"<tr><td class="empty" colspan="{}">No data</td></tr>"#,
            snapshot.columns.len()
        )
    } else {
        snapshot
            .fetch
            .rows
            .iter()
            .zip(rows.iter())
            .map(|(row, cells)| {
                let tds: String = cells.iter().map(render_cell).collect();
                format!(r#"<tr data-key="{}">{}</tr>"#, escape_html(&row.key), tds)
            })
            .collect()
    };

    format!(
        r#"<table class="markets"><thead><tr>{}</tr></thead><tbody>{}</tbody></table>"#,
        head, body
    )
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::IconLabel {
            icon_url,
            label,
            icon_width,
        } => format!(
            r#"<td><div class="name"><img src="{}" alt="{}" width="{}" /><span>{}</span></div></td>"#,
            escape_html(icon_url),
            escape_html(label),
            icon_width,
            escape_html(label)
        ),
        Cell::Text(text) => format!("<td>{}</td>", escape_html(text)),
    }
}

fn page_link(page: u32, size: u32, label: &str) -> String {
    format!(
        r#"<a href="/table/page?page={}&amp;page_size={}">{}</a>"#,
        page, size, label
    )
}

fn render_pagination(control: &PaginationControl) -> String {
    let size = control.page_size.get();
    let mut html = String::from(r#"<nav class="pager" aria-label="Pagination">"#);
    html.push_str(&format!(
        r#"<span class="total">Total {}</span>"#,
        control.total
    ));

    if control.has_prev() {
        html.push_str(&page_link(control.current - 1, size, "&lt;"));
    } else {
        html.push_str(r#"<span class="disabled">&lt;</span>"#);
    }

    for item in control.items() {
        match item {
            PageItem::Page(page) if page == control.current => {
                html.push_str(&format!(r#"<span class="current">{}</span>"#, page));
            }
            PageItem::Page(page) => html.push_str(&page_link(page, size, &page.to_string())),
            PageItem::Ellipsis => html.push_str("<span>...</span>"),
        }
    }

    if control.has_next() {
        html.push_str(&page_link(control.current + 1, size, "&gt;"));
    } else {
        html.push_str(r#"<span class="disabled">&gt;</span>"#);
    }

    let options: String = control
        .page_size_options
        .iter()
        .map(|option_size| {
            option(
                &option_size.get().to_string(),
                &format!("{} / page", option_size),
                *option_size == control.page_size,
            )
        })
        .collect();
    html.push_str(&format!(
        r#"<form method="get" action="/table/page"><input type="hidden" name="page" value="{}" /><select name="page_size" aria-label="Page size" onchange="this.form.submit()">{}</select><noscript><button type="submit">Apply</button></noscript></form>"#,
        control.current, options
    ));

    html.push_str("</nav>");
    html
}

/// Render the source viewer page for one file.
pub fn render_source_page(viewer: &SourceViewer, file: &SourceFile) -> String {
    let nav: String = viewer
        .files()
        .iter()
        .map(|f| {
            format!(
                r#"<a href="/source?file={}"{}>{}</a>"#,
                escape_html(f.path),
                if f.path == file.path { r#" class="current""# } else { "" },
                escape_html(f.path)
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>App source code</title>
    <style>{style}</style>
  </head>
  <body>
    <div class="wrap">
      <h1>App source code</h1>
      <a href="/">Back to markets</a>
      <div class="files">{nav}</div>
      {code}
    </div>
  </body>
</html>
"#,
        style = STYLE,
        nav = nav,
        code = viewer.render_html(file),
    )
}
