//! On-disk fixtures: service tag documents and file-backend route tables.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use udr_core::Route;

/// A service tag document in the published schema.
///
/// `tags` holds `(name, change_number, prefixes)` triples.
pub fn service_tags_document(cloud: &str, change_number: u64, tags: &[(&str, u64, &[&str])]) -> Value {
    let values: Vec<Value> = tags
        .iter()
        .map(|(name, change, prefixes)| {
            json!({
                "name": name,
                "id": name,
                "properties": {
                    "changeNumber": change,
                    "region": "",
                    "platform": "Azure",
                    "systemService": "",
                    "addressPrefixes": prefixes,
                    "networkFeatures": ["API", "NSG", "UDR", "FW"]
                }
            })
        })
        .collect();

    json!({
        "changeNumber": change_number,
        "cloud": cloud,
        "values": values
    })
}

/// Writes `document` as `ServiceTags_<cloud>.json` under `dir`.
pub fn write_document(dir: &Path, document: &Value) -> PathBuf {
    let cloud = document["cloud"].as_str().unwrap_or("Public");
    let path = dir.join(format!("ServiceTags_{cloud}.json"));
    fs::write(&path, serde_json::to_vec_pretty(document).unwrap())
        .unwrap_or_else(|e| panic!("write_document: {e}"));
    path
}

/// A route table document as the cloud CLI prints it.
pub fn route_table_document(resource_group: &str, name: &str, routes: &[Route]) -> Value {
    let routes: Vec<Value> = routes
        .iter()
        .map(|route| {
            let mut value = serde_json::to_value(route).unwrap();
            value["provisioningState"] = json!("Succeeded");
            value
        })
        .collect();

    json!({
        "name": name,
        "resourceGroup": resource_group,
        "location": "westeurope",
        "disableBgpRoutePropagation": false,
        "routes": routes
    })
}

/// Writes a route table where the file backend looks for it:
/// `<dir>/<resource_group>/<name>.json`.
pub fn write_route_table(dir: &Path, resource_group: &str, name: &str, routes: &[Route]) -> PathBuf {
    let group_dir = dir.join(resource_group);
    fs::create_dir_all(&group_dir).unwrap_or_else(|e| panic!("write_route_table: {e}"));
    let path = group_dir.join(format!("{name}.json"));
    let document = route_table_document(resource_group, name, routes);
    fs::write(&path, serde_json::to_vec_pretty(&document).unwrap())
        .unwrap_or_else(|e| panic!("write_route_table: {e}"));
    path
}

/// Reads back the route names of a file-backend table.
pub fn read_route_names(path: &Path) -> Vec<String> {
    let content = fs::read_to_string(path).unwrap_or_else(|e| panic!("read_route_names: {e}"));
    let value: Value = serde_json::from_str(&content).unwrap();
    value["routes"]
        .as_array()
        .map(|routes| {
            routes
                .iter()
                .filter_map(|r| r["name"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
