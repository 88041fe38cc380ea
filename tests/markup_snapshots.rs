//! Snapshot tests for row markup
//!
//! Uses insta inline snapshots to pin the default CDR row renderer and the row
//! elements the scroller materialises. Markup is split one cell per line to
//! keep diffs readable.

use cdrscroll::dom::{Dom, MemoryDom};
use cdrscroll::model::{sample_hierarchy, CdrRow, RowKind};
use cdrscroll::{ScrollerOptions, VirtualScroller};

// ===== Test Helpers =====

/// Put every cell (and the closing row tag) on its own line.
fn one_cell_per_line(markup: &str) -> String {
    markup
        .replace("<td ", "\n<td ")
        .replace("</tr>", "\n</tr>")
        .trim_start()
        .to_string()
}

/// Scroller over `rows`, initialised and rendered.
fn rendered(rows: Vec<CdrRow>) -> VirtualScroller<MemoryDom, CdrRow> {
    let (dom, handles) = MemoryDom::table_fixture(600.0);
    let mut scroller = VirtualScroller::new(dom, ScrollerOptions::for_cdr_rows(handles)).unwrap();
    scroller.initialize().unwrap();
    scroller.set_data(rows);
    scroller
}

// ===== Default Row Renderer =====

#[test]
fn snapshot_main_row_markup() {
    let row = &sample_hierarchy(1)[0];
    insta::assert_snapshot!(one_cell_per_line(&row.default_markup()), @r#"
    <td class="main-cell" data-filter-value="Customer 0000" data-full-text="Customer 0000">Customer 0000</td>
    <td class="peer-cell" data-filter-value="" data-full-text=""></td>
    <td class="destination-cell" data-filter-value="All" data-full-text="All">All</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell">3</td>
    <td class="metric-cell">1</td>
    <td class="metric-cell">33.3</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell" data-pdd="0">0</td>
    <td class="metric-cell" data-atime="0">0</td>
    "#);
}

#[test]
fn snapshot_hourly_row_markup() {
    let row = &sample_hierarchy(3)[2];
    insta::assert_snapshot!(one_cell_per_line(&row.default_markup()), @r#"
    <td class="main-cell" data-filter-value="Customer 0000" data-full-text="Customer 0000">Customer 0000</td>
    <td class="peer-cell" data-filter-value="Carrier 0" data-full-text="Carrier 0">Carrier 0</td>
    <td class="hour-datetime" data-filter-value="2024-01-01 00:00" data-full-text="2024-01-01 00:00">2024-01-01 00:00</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell">3</td>
    <td class="metric-cell">1</td>
    <td class="metric-cell">33.3</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell" data-pdd="0">0</td>
    <td class="metric-cell" data-atime="0">0</td>
    "#);
}

#[test]
fn snapshot_escaped_names() {
    let row = CdrRow {
        kind: Some(RowKind::Main),
        main: r#"Acme & "Co" <eu>"#.into(),
        ..CdrRow::default()
    };
    let markup = row.default_markup();
    let first_cell = one_cell_per_line(&markup);
    let first_cell = first_cell.lines().next().unwrap_or_default();
    insta::assert_snapshot!(first_cell, @r#"<td class="main-cell" data-filter-value="Acme &amp; &quot;Co&quot; <eu>" data-full-text="Acme &amp; &quot;Co&quot; <eu>">Acme &amp; "Co" &lt;eu&gt;</td>"#);
}

// ===== Materialised Rows =====

#[test]
fn snapshot_first_materialised_row() {
    let scroller = rendered(sample_hierarchy(3));
    let row = scroller.pool_slots()[0].row;
    insta::assert_snapshot!(one_cell_per_line(&scroller.dom().outer_html(row)), @r#"
    <tr class="main-row" role="row" data-key="main:0" data-virtual-index="0" data-group="">
    <td class="main-cell" data-filter-value="Customer 0000" data-full-text="Customer 0000">Customer 0000</td>
    <td class="peer-cell" data-filter-value="" data-full-text=""></td>
    <td class="destination-cell" data-filter-value="All" data-full-text="All">All</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell">3</td>
    <td class="metric-cell">1</td>
    <td class="metric-cell">33.3</td>
    <td class="metric-cell">2.5</td>
    <td class="metric-cell" data-pdd="0">0</td>
    <td class="metric-cell" data-atime="0">0</td>
    </tr>
    "#);
}

#[test]
fn snapshot_row_hierarchy_attributes() {
    let scroller = rendered(sample_hierarchy(7));
    let dom = scroller.dom();
    let summary: Vec<String> = scroller
        .pool_slots()
        .iter()
        .map(|slot| {
            let attr = |name| dom.attribute(&slot.row, name).unwrap_or_default();
            format!(
                "{} {} key={} group={}",
                attr("data-virtual-index"),
                dom.class_name(&slot.row),
                attr("data-key"),
                attr("data-group"),
            )
        })
        .collect();

    insta::assert_snapshot!(summary.join("\n"), @r"
    0 main-row key=main:0 group=
    1 peer-row key=main:0:peer:0 group=main:0
    2 hour-row key=main:0:peer:0:hour:0 group=main:0:peer:0
    3 hour-row key=main:0:peer:0:hour:1 group=main:0:peer:0
    4 peer-row key=main:0:peer:1 group=main:0
    5 hour-row key=main:0:peer:1:hour:0 group=main:0:peer:1
    6 hour-row key=main:0:peer:1:hour:1 group=main:0:peer:1
    ");
}
