//! Call-metrics (CDR) table rows and their default markup.

use super::row::{RowKind, RowRecord};
use crate::dom::markup::{escape_attr, escape_text};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Number of columns every CDR row renders.
pub const CDR_COLUMN_COUNT: usize = 10;

/// One row of the hierarchical CDR metrics table.
///
/// Main rows aggregate a customer, peer rows break a main row down by
/// supplier, and hourly rows break a peer row down by hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CdrRow {
    /// Row type.
    #[serde(rename = "type", default)]
    pub kind: Option<RowKind>,
    /// Hierarchy level.
    #[serde(default)]
    pub level: Option<u8>,
    /// Stable key of the logical row.
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,
    /// Key of the parent row.
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
    /// Customer (main) name.
    #[serde(default)]
    pub main: String,
    /// Supplier (peer) name.
    #[serde(default)]
    pub peer: String,
    /// Destination name.
    #[serde(default)]
    pub destination: String,
    /// Hour bucket for hourly rows.
    #[serde(default)]
    pub hour: Option<DateTime<Utc>>,
    /// Billed minutes.
    #[serde(rename = "Min", default)]
    pub minutes: f64,
    /// Total call attempts.
    #[serde(rename = "TCall", default)]
    pub total_calls: f64,
    /// Successful calls.
    #[serde(rename = "SCall", default)]
    pub successful_calls: f64,
    /// Answer-seizure ratio, percent.
    #[serde(rename = "ASR", default)]
    pub asr: f64,
    /// Average call duration, minutes.
    #[serde(rename = "ACD", default)]
    pub acd: f64,
    /// Post-dial delay, seconds.
    #[serde(rename = "PDD", default)]
    pub pdd: f64,
    /// Average answer time, seconds.
    #[serde(rename = "ATime", default)]
    pub atime: f64,
}

impl RowRecord for CdrRow {
    fn kind(&self) -> Option<RowKind> {
        self.kind
    }

    fn level(&self) -> Option<u8> {
        self.level
    }

    fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

impl CdrRow {
    /// Default ten-column markup for the metrics table.
    ///
    /// Name columns are filter cells carrying `data-filter-value` and
    /// `data-full-text`; hourly rows show their hour bucket in the destination
    /// column. PDD and ATime cells carry their raw value for hover details.
    pub fn default_markup(&self) -> String {
        let mut out = String::with_capacity(512);
        filter_cell(&mut out, "main-cell", &self.main);
        filter_cell(&mut out, "peer-cell", &self.peer);
        match (self.kind, self.hour) {
            (Some(RowKind::Hourly), Some(hour)) => {
                let label = hour.format("%Y-%m-%d %H:00").to_string();
                filter_cell(&mut out, "hour-datetime", &label);
            }
            _ => filter_cell(&mut out, "destination-cell", &self.destination),
        }
        metric_cell(&mut out, self.minutes, None);
        metric_cell(&mut out, self.total_calls, None);
        metric_cell(&mut out, self.successful_calls, None);
        metric_cell(&mut out, self.asr, None);
        metric_cell(&mut out, self.acd, None);
        metric_cell(&mut out, self.pdd, Some("data-pdd"));
        metric_cell(&mut out, self.atime, Some("data-atime"));
        out
    }
}

fn filter_cell(out: &mut String, class: &str, value: &str) {
    let attr = escape_attr(value);
    let _ = write!(
        out,
        r#"<td class="{}" data-filter-value="{}" data-full-text="{}">{}</td>"#,
        class,
        attr,
        attr,
        escape_text(value)
    );
}

fn metric_cell(out: &mut String, value: f64, hover_attr: Option<&str>) {
    let text = format_metric(value);
    match hover_attr {
        Some(name) => {
            let _ = write!(
                out,
                r#"<td class="metric-cell" {}="{}">{}</td>"#,
                name, text, text
            );
        }
        None => {
            let _ = write!(out, r#"<td class="metric-cell">{}</td>"#, text);
        }
    }
}

/// Whole numbers without decimals, everything else with one decimal place.
pub fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

/// 2024-01-01T00:00:00Z, first hour bucket of [`sample_hierarchy`].
const SAMPLE_EPOCH_SECS: i64 = 1_704_067_200;

/// Deterministic main → peer → hourly rows, `count` rows in total.
///
/// Each customer gets three suppliers with two hourly rows each; the last
/// customer is cut short when `count` runs out.
pub fn sample_hierarchy(count: usize) -> Vec<CdrRow> {
    let mut rows = Vec::with_capacity(count);
    let mut customer = 0usize;

    while rows.len() < count {
        let main_id = format!("main:{customer}");
        let main = format!("Customer {customer:04}");
        rows.push(CdrRow {
            kind: Some(RowKind::Main),
            level: Some(0),
            group_id: Some(main_id.clone()),
            main: main.clone(),
            destination: "All".into(),
            ..sample_metrics(customer)
        });

        for supplier in 0..3 {
            let peer_id = format!("{main_id}:peer:{supplier}");
            let peer = format!("Carrier {supplier}");
            rows.push(CdrRow {
                kind: Some(RowKind::Peer),
                level: Some(1),
                group_id: Some(peer_id.clone()),
                parent_id: Some(main_id.clone()),
                main: main.clone(),
                peer: peer.clone(),
                destination: "All".into(),
                ..sample_metrics(customer + supplier)
            });

            for hour in 0..2 {
                rows.push(CdrRow {
                    kind: Some(RowKind::Hourly),
                    level: Some(2),
                    group_id: Some(format!("{peer_id}:hour:{hour}")),
                    parent_id: Some(peer_id.clone()),
                    main: main.clone(),
                    peer: peer.clone(),
                    hour: DateTime::from_timestamp(SAMPLE_EPOCH_SECS + hour * 3600, 0),
                    ..sample_metrics(customer + supplier + hour as usize)
                });
            }
        }
        customer += 1;
    }

    rows.truncate(count);
    rows
}

fn sample_metrics(seed: usize) -> CdrRow {
    let calls = (seed % 97 + 3) as f64;
    let answered = (calls * 0.45).floor();
    CdrRow {
        minutes: answered * 2.5,
        total_calls: calls,
        successful_calls: answered,
        asr: (answered / calls * 1000.0).round() / 10.0,
        acd: 2.5,
        pdd: (seed % 7) as f64 * 0.5,
        atime: (seed % 5) as f64,
        ..CdrRow::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::markup::parse_cells;
    use chrono::TimeZone;

    fn main_row() -> CdrRow {
        CdrRow {
            kind: Some(RowKind::Main),
            level: Some(0),
            group_id: Some("main:acme".into()),
            main: "Acme & Co".into(),
            destination: "Germany".into(),
            minutes: 120.0,
            total_calls: 40.0,
            successful_calls: 18.0,
            asr: 45.0,
            acd: 6.7,
            pdd: 2.5,
            atime: 3.0,
            ..CdrRow::default()
        }
    }

    #[test]
    fn default_markup_has_fixed_column_count() {
        let cells = parse_cells(&main_row().default_markup());
        assert_eq!(cells.len(), CDR_COLUMN_COUNT);

        let hourly = CdrRow {
            kind: Some(RowKind::Hourly),
            hour: Some(Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap()),
            ..CdrRow::default()
        };
        assert_eq!(parse_cells(&hourly.default_markup()).len(), CDR_COLUMN_COUNT);
    }

    #[test]
    fn filter_cells_carry_filter_attributes() {
        let cells = parse_cells(&main_row().default_markup());
        assert_eq!(cells[0].class_name(), "main-cell");
        assert_eq!(cells[0].attr("data-filter-value"), Some("Acme & Co"));
        assert_eq!(cells[0].attr("data-full-text"), Some("Acme & Co"));
        assert_eq!(cells[0].text_content(), "Acme & Co");
        assert_eq!(cells[2].class_name(), "destination-cell");
    }

    #[test]
    fn hover_cells_carry_raw_values() {
        let cells = parse_cells(&main_row().default_markup());
        assert_eq!(cells[8].attr("data-pdd"), Some("2.5"));
        assert_eq!(cells[9].attr("data-atime"), Some("3"));
    }

    #[test]
    fn hourly_rows_show_hour_bucket() {
        let row = CdrRow {
            kind: Some(RowKind::Hourly),
            level: Some(2),
            hour: Some(Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap()),
            ..CdrRow::default()
        };
        let cells = parse_cells(&row.default_markup());
        assert_eq!(cells[2].class_name(), "hour-datetime");
        assert_eq!(cells[2].text_content(), "2024-03-01 13:00");
    }

    #[test]
    fn format_metric_trims_whole_numbers() {
        assert_eq!(format_metric(12.0), "12");
        assert_eq!(format_metric(6.66), "6.7");
        assert_eq!(format_metric(0.0), "0");
    }

    #[test]
    fn deserializes_dashboard_field_names() {
        let json = r#"{
            "type": "peer",
            "level": 1,
            "groupId": "peer:acme:carrier",
            "parentId": "main:acme",
            "main": "Acme",
            "peer": "Carrier",
            "Min": 12.5,
            "TCall": 10,
            "PDD": 1.5
        }"#;
        let row: CdrRow = serde_json::from_str(json).unwrap();
        assert_eq!(row.kind, Some(RowKind::Peer));
        assert_eq!(row.group_id(), Some("peer:acme:carrier"));
        assert_eq!(row.parent_id(), Some("main:acme"));
        assert_eq!(row.minutes, 12.5);
        assert_eq!(row.total_calls, 10.0);
        assert_eq!(row.asr, 0.0);
    }

    mod sample {
        use super::*;
        use crate::model::row_class;

        #[test]
        fn yields_exactly_count_rows() {
            assert_eq!(sample_hierarchy(0).len(), 0);
            assert_eq!(sample_hierarchy(5).len(), 5);
            assert_eq!(sample_hierarchy(1000).len(), 1000);
        }

        #[test]
        fn nests_main_peer_hourly() {
            let rows = sample_hierarchy(10);
            let classes: Vec<_> = rows.iter().map(row_class).collect();
            assert_eq!(
                classes,
                [
                    "main-row", "peer-row", "hour-row", "hour-row", "peer-row", "hour-row",
                    "hour-row", "peer-row", "hour-row", "hour-row",
                ]
            );
            assert_eq!(rows[1].parent_id(), rows[0].group_id());
            assert_eq!(rows[2].parent_id(), rows[1].group_id());
        }

        #[test]
        fn hourly_rows_render_their_bucket() {
            let rows = sample_hierarchy(4);
            let cells = parse_cells(&rows[3].default_markup());
            assert_eq!(cells[2].text_content(), "2024-01-01 01:00");
        }
    }
}
