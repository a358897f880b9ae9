//! Parsing of `show services rpm probe-results` XML output.
//!
//! Elements are matched on their local name, so namespace prefixes and
//! attributes in the device output are ignored.

use crate::error::{DeviceError, RecordError};
use crate::models::ProbeRecord;
use roxmltree::{Document, Node};

/// Parsed probe results: good records plus the elements that were rejected.
#[derive(Debug, Default)]
pub struct ParsedResults {
    pub records: Vec<ProbeRecord>,
    pub rejected: Vec<RecordError>,
}

/// Parse probe results for `owner` from the device XML.
///
/// Only `probe-test-results` elements whose `owner` child equals `owner` are
/// considered, in document order.
pub fn parse_probe_results(xml: &str, owner: &str) -> Result<ParsedResults, DeviceError> {
    let doc = Document::parse(xml)?;
    let mut parsed = ParsedResults::default();

    let results = doc
        .descendants()
        .filter(|n| is_element(n, "probe-test-results"))
        .filter(|n| child_text(n, "owner") == Some(owner));

    for node in results {
        match parse_record(&node) {
            Ok(record) => parsed.records.push(record),
            Err(e) => parsed.rejected.push(e),
        }
    }

    Ok(parsed)
}

fn parse_record(node: &Node<'_, '_>) -> Result<ProbeRecord, RecordError> {
    let status_text = node
        .descendants()
        .filter(|n| is_element(n, "probe-single-results"))
        .find_map(|n| child_text(&n, "probe-status"))
        .ok_or(RecordError::MissingField("probe-status"))?;

    Ok(ProbeRecord {
        owner: required(node, "owner")?,
        test_name: required(node, "test-name")?,
        target_address: required(node, "target-address")?,
        routing_instance: required(node, "routing-instance-name")?,
        status_text: status_text.to_string(),
    })
}

fn required(node: &Node<'_, '_>, name: &'static str) -> Result<String, RecordError> {
    child_text(node, name)
        .map(str::to_string)
        .ok_or(RecordError::MissingField(name))
}

fn is_element(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

/// Trimmed, non-empty text of the first child element named `name`.
fn child_text<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.children()
        .find(|c| is_element(c, name))
        .and_then(|c| c.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
