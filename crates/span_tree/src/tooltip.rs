//! Tooltip / details content for a node

use std::fmt;
use crate::tree::RenderNode;

/// Shown in place of absent metadata
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub rows: Vec<TooltipRow>,
}

impl Tooltip {
    pub fn for_node(node: &RenderNode) -> Self {
        let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| PLACEHOLDER.to_string());

        let rows = vec![
            TooltipRow { label: "id", value: node.id.to_string() },
            TooltipRow { label: "name", value: node.name.clone() },
            TooltipRow { label: "duration", value: node.value.to_string() },
            TooltipRow { label: "service label", value: optional(&node.service_label) },
            TooltipRow { label: "endpoint label", value: optional(&node.endpoint_label) },
            TooltipRow { label: "endpoint type", value: optional(&node.endpoint_type) },
        ];
        Self { rows }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    pub fn to_html(&self) -> String {
        self.rows
            .iter()
            .map(|row| format!("<b>{}</b>: {}", row.label, escape_html(&row.value)))
            .collect::<Vec<_>>()
            .join("<br>")
    }
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{:>14}: {}", row.label, row.value)?;
        }
        Ok(())
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SpanId;

    fn node() -> RenderNode {
        RenderNode {
            id: SpanId::text("abc"),
            name: "select <users>".to_string(),
            value: 12.5,
            service_label: Some("postgres".to_string()),
            endpoint_label: None,
            endpoint_type: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn test_absent_labels_use_placeholder() {
        let tooltip = Tooltip::for_node(&node());
        assert_eq!(tooltip.value("service label"), Some("postgres"));
        assert_eq!(tooltip.value("endpoint label"), Some("-"));
        assert_eq!(tooltip.value("endpoint type"), Some("-"));
        assert_eq!(tooltip.value("duration"), Some("12.5"));
    }

    #[test]
    fn test_html_rows_are_escaped() {
        let html = Tooltip::for_node(&node()).to_html();
        assert!(html.starts_with("<b>id</b>: abc<br><b>name</b>: select &lt;users&gt;"));
        assert!(html.ends_with("<b>endpoint type</b>: -"));
    }
}
