//! Shortest path from a device to the nearest uplink.

use crate::model::{Connection, ConnectionId, Device, DeviceId, Diagram};
use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// One hop of a resolved path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathSegment {
    pub device_id: DeviceId,
    pub out_port: Option<String>,
    pub connection_id: ConnectionId,
    pub next_device_id: DeviceId,
    pub next_port: Option<String>,
    pub cable_type: Option<String>,
    pub cable_length: Option<f64>,
    pub speed: Option<String>,
}

impl PathSegment {
    /// Build the hop leaving `current` over `connection`.
    fn hop(current: &str, connection: &Connection) -> Self {
        let (out_port, next_device_id, next_port) = if connection.from == current {
            (connection.from_port.clone(), connection.to.clone(), connection.to_port.clone())
        } else {
            (connection.to_port.clone(), connection.from.clone(), connection.from_port.clone())
        };
        Self {
            device_id: current.to_string(),
            out_port,
            connection_id: connection.id.clone(),
            next_device_id,
            next_port,
            cable_type: connection.cable_type.clone(),
            cable_length: connection.cable_length,
            speed: connection.speed.clone(),
        }
    }
}

/// Why no path was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathFailure {
    /// The start id is not in the diagram.
    UnknownDevice,
    /// No uplink device exists anywhere.
    NoUplink,
    /// The start device is itself an uplink.
    IsUplink,
    /// The start device has no connections.
    Disconnected,
    /// Connected, but no uplink is reachable.
    NoPath,
}

/// Outcome of an uplink path query.
///
/// Serializes as `{"found": true, "path", "uplinkDevice"}` or
/// `{"found": false, "reason"}`.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    Found { path: Vec<PathSegment>, uplink_device: Device },
    NotFound { reason: PathFailure },
}

impl Serialize for PathResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PathResult::Found { path, uplink_device } => {
                let mut state = serializer.serialize_struct("PathResult", 3)?;
                state.serialize_field("found", &true)?;
                state.serialize_field("path", path)?;
                state.serialize_field("uplinkDevice", uplink_device)?;
                state.end()
            }
            PathResult::NotFound { reason } => {
                let mut state = serializer.serialize_struct("PathResult", 2)?;
                state.serialize_field("found", &false)?;
                state.serialize_field("reason", reason)?;
                state.end()
            }
        }
    }
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found { .. })
    }

    pub fn failure(&self) -> Option<PathFailure> {
        match self {
            PathResult::NotFound { reason } => Some(*reason),
            PathResult::Found { .. } => None,
        }
    }

    fn not_found(reason: PathFailure) -> Self {
        PathResult::NotFound { reason }
    }
}

/// Undirected adjacency: device id -> connections touching it, in connection id order.
fn adjacency(diagram: &Diagram) -> BTreeMap<&str, Vec<&Connection>> {
    let mut adjacency: BTreeMap<&str, Vec<&Connection>> = BTreeMap::new();
    for connection in diagram.connections.values() {
        adjacency.entry(connection.from.as_str()).or_default().push(connection);
        if connection.to != connection.from {
            adjacency.entry(connection.to.as_str()).or_default().push(connection);
        }
    }
    adjacency
}

/// Breadth-first search from `start` to the closest uplink device (by hop count).
pub fn find_path_to_uplink(diagram: &Diagram, start: &str) -> PathResult {
    let Some(start_device) = diagram.device(start) else {
        return PathResult::not_found(PathFailure::UnknownDevice);
    };
    if !diagram.devices.values().any(|d| d.kind.is_uplink()) {
        return PathResult::not_found(PathFailure::NoUplink);
    }
    if start_device.kind.is_uplink() {
        return PathResult::not_found(PathFailure::IsUplink);
    }
    if diagram.degree(start) == 0 {
        return PathResult::not_found(PathFailure::Disconnected);
    }

    let adjacency = adjacency(diagram);
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut queue: VecDeque<(&str, Vec<PathSegment>)> = VecDeque::from([(start, Vec::new())]);

    while let Some((current, path)) = queue.pop_front() {
        let Some(edges) = adjacency.get(current) else {
            continue;
        };
        for connection in edges {
            let neighbor = if connection.from == current {
                connection.to.as_str()
            } else {
                connection.from.as_str()
            };
            if !visited.insert(neighbor) {
                continue;
            }
            // dangling connection endpoints are not traversable
            let Some(device) = diagram.device(neighbor) else {
                continue;
            };

            let mut next_path = path.clone();
            next_path.push(PathSegment::hop(current, connection));

            if device.kind.is_uplink() {
                log::debug!("Uplink {} reached from {} in {} hops", device.id, start, next_path.len());
                return PathResult::Found {
                    path: next_path,
                    uplink_device: device.clone(),
                };
            }
            queue.push_back((neighbor, next_path));
        }
    }

    PathResult::not_found(PathFailure::NoPath)
}
