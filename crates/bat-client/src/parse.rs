//! Parsers for the line-oriented text ciao-cli prints.
//!
//! Record output follows one shape: a header line starting with the entity
//! keyword, then a fixed number of field lines in a fixed order. Field
//! values are the token between the first and second `:` (so a MAC address
//! comes back truncated at its first octet — a long-standing artifact of
//! the format that callers depend on), trimmed of surrounding whitespace.
//! Tenant fields are whitespace-delimited instead. Node status is
//! positional rather than header-based.
//!
//! A header followed by too few field lines, or a field line without its
//! delimiter, is a [`ParseError`]; records are never partially filled.

use bat_core::{Cnci, Instance, NodeStatus, Tenant, Workload};

use crate::error::ParseError;

const WORKLOAD_HEADER: &str = "Workload";
const TENANT_HEADER: &str = "Tenant";
const INSTANCE_HEADER: &str = "Instance";
const CNCI_HEADER: &str = "CNCI";

pub fn parse_workloads(lines: &[&str]) -> Result<Vec<Workload>, ParseError> {
    let mut workloads = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if lines[index].starts_with(WORKLOAD_HEADER) {
            let fields = colon_fields("workload", lines, index + 1, 5)?;
            workloads.push(Workload {
                name: fields[0].to_string(),
                uuid: fields[1].to_string(),
                image_uuid: fields[2].to_string(),
                cpus: fields[3].to_string(),
                mem: fields[4].to_string(),
            });
            index += 6;
        } else {
            index += 1;
        }
    }
    Ok(workloads)
}

pub fn parse_tenants(lines: &[&str]) -> Result<Vec<Tenant>, ParseError> {
    let mut tenants = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if lines[index].starts_with(TENANT_HEADER) {
            let fields = token_fields("tenant", lines, index + 1, 2)?;
            tenants.push(Tenant {
                uuid: fields[0].to_string(),
                name: fields[1].to_string(),
            });
            index += 3;
        } else {
            index += 1;
        }
    }
    Ok(tenants)
}

pub fn parse_instances(lines: &[&str]) -> Result<Vec<Instance>, ParseError> {
    let mut instances = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if lines[index].starts_with(INSTANCE_HEADER) {
            let fields = colon_fields("instance", lines, index + 1, 7)?;
            instances.push(Instance {
                uuid: fields[0].to_string(),
                status: fields[1].to_string(),
                ip: fields[2].to_string(),
                mac: fields[3].to_string(),
                node_uuid: fields[4].to_string(),
                image_uuid: fields[5].to_string(),
                tenant_uuid: fields[6].to_string(),
            });
            index += 8;
        } else {
            index += 1;
        }
    }
    Ok(instances)
}

pub fn parse_cncis(lines: &[&str]) -> Result<Vec<Cnci>, ParseError> {
    let mut cncis = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        if lines[index].starts_with(CNCI_HEADER) {
            let fields = colon_fields("cnci", lines, index + 1, 3)?;
            cncis.push(Cnci {
                uuid: fields[0].to_string(),
                tenant_uuid: fields[1].to_string(),
                ip: fields[2].to_string(),
            });
            index += 4;
        } else {
            index += 1;
        }
    }
    Ok(cncis)
}

/// Positional parse of `node status` output: the third whitespace token of
/// line 0 is the total node count, the second token of line 1 the ready
/// count. Both stay raw strings; readiness is their opaque comparison.
pub fn parse_node_status(lines: &[&str]) -> Result<NodeStatus, ParseError> {
    if lines.len() < 2 {
        return Err(ParseError {
            entity: "node status",
            line: lines.len(),
            detail: format!("expected 2 lines, found {}", lines.len()),
        });
    }

    let total = lines[0]
        .split_whitespace()
        .nth(2)
        .ok_or_else(|| ParseError {
            entity: "node status",
            line: 1,
            detail: format!("missing total count token in {:?}", lines[0]),
        })?;
    let ready = lines[1]
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| ParseError {
            entity: "node status",
            line: 2,
            detail: format!("missing ready count token in {:?}", lines[1]),
        })?;

    Ok(NodeStatus {
        total: total.to_string(),
        ready: ready.to_string(),
    })
}

/// UUIDs of freshly created instances, one per non-blank line of
/// `instance add` output.
pub fn parse_created_uuids(lines: &[&str]) -> Result<Vec<String>, ParseError> {
    let mut uuids = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let uuid = colon_value(line).ok_or_else(|| ParseError {
            entity: "created instance",
            line: index + 1,
            detail: format!("missing ':' delimiter in {line:?}"),
        })?;
        uuids.push(uuid.to_string());
    }
    Ok(uuids)
}

/// The trimmed token between the first and second `:` of a field line.
fn colon_value(line: &str) -> Option<&str> {
    line.split(':').nth(1).map(str::trim)
}

fn colon_fields<'a>(
    entity: &'static str,
    lines: &[&'a str],
    start: usize,
    count: usize,
) -> Result<Vec<&'a str>, ParseError> {
    check_block_length(entity, lines, start, count)?;
    (0..count)
        .map(|offset| {
            let line_index = start + offset;
            colon_value(lines[line_index]).ok_or_else(|| ParseError {
                entity,
                line: line_index + 1,
                detail: format!("missing ':' delimiter in {:?}", lines[line_index]),
            })
        })
        .collect()
}

fn token_fields<'a>(
    entity: &'static str,
    lines: &[&'a str],
    start: usize,
    count: usize,
) -> Result<Vec<&'a str>, ParseError> {
    check_block_length(entity, lines, start, count)?;
    (0..count)
        .map(|offset| {
            let line_index = start + offset;
            lines[line_index]
                .split_whitespace()
                .nth(1)
                .ok_or_else(|| ParseError {
                    entity,
                    line: line_index + 1,
                    detail: format!("missing second token in {:?}", lines[line_index]),
                })
        })
        .collect()
}

fn check_block_length(
    entity: &'static str,
    lines: &[&str],
    start: usize,
    count: usize,
) -> Result<(), ParseError> {
    if start + count > lines.len() {
        return Err(ParseError {
            entity,
            line: lines.len(),
            detail: format!(
                "expected {count} field lines after header, found {}",
                lines.len() - start
            ),
        });
    }
    Ok(())
}
