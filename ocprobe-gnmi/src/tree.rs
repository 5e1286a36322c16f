//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

//! Helpers to navigate and edit JSON_IETF data trees.
//!
//! List entries are matched on their key leaves. In OpenConfig every leaf
//! that sits directly under a list entry (next to the `config` and `state`
//! containers) is a key, so scalar members of an entry identify it.

use std::collections::BTreeMap;

use ocprobe_openconfig::PathElem;
use ocprobe_utils::yang::strip_module_prefix;
use serde_json::{Map, Value};

// Returns the node at the given path.
pub(crate) fn lookup<'a>(
    mut node: &'a Value,
    elems: &[PathElem],
) -> Option<&'a Value> {
    for elem in elems {
        node = child(node, &elem.name)?;
        if !elem.keys.is_empty() {
            node = node
                .as_array()?
                .iter()
                .find(|entry| key_matches(entry, &elem.keys))?;
        }
    }
    Some(node)
}

// Returns the node at the given path, creating all missing ancestors.
pub(crate) fn lookup_mut<'a>(
    mut node: &'a mut Value,
    elems: &[PathElem],
) -> &'a mut Value {
    for elem in elems {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = match node {
            Value::Object(map) => {
                map.entry(elem.name.clone()).or_insert(Value::Null)
            }
            _ => unreachable!(),
        };

        if !elem.keys.is_empty() {
            if !node.is_array() {
                *node = Value::Array(vec![]);
            }
            let entries = match node {
                Value::Array(entries) => entries,
                _ => unreachable!(),
            };
            let pos = match entries
                .iter()
                .position(|entry| key_matches(entry, &elem.keys))
            {
                Some(pos) => pos,
                None => {
                    entries.push(new_entry(&elem.keys));
                    entries.len() - 1
                }
            };
            node = &mut entries[pos];
        }
    }
    node
}

// Removes the node at the given path. Returns whether anything was removed.
pub(crate) fn remove(root: &mut Value, elems: &[PathElem]) -> bool {
    let Some((last, parents)) = elems.split_last() else {
        let removed = !root.is_null();
        *root = Value::Null;
        return removed;
    };

    let Some(parent) = lookup_existing_mut(root, parents) else {
        return false;
    };
    let Some(map) = parent.as_object_mut() else {
        return false;
    };
    if last.keys.is_empty() {
        return map.remove(&last.name).is_some();
    }
    let Some(entries) = map.get_mut(&last.name).and_then(Value::as_array_mut)
    else {
        return false;
    };
    let len = entries.len();
    entries.retain(|entry| !key_matches(entry, &last.keys));
    entries.len() != len
}

// Merges `src` into `dst` with gNMI update semantics. Containers are merged
// recursively, list entries are merged by key and leaf-lists are replaced.
pub(crate) fn merge(dst: &mut Value, src: Value) {
    match (dst, src) {
        (Value::Object(dst), Value::Object(src)) => {
            for (name, value) in src {
                match dst.get_mut(&name) {
                    Some(node) => merge(node, value),
                    None => {
                        dst.insert(name, value);
                    }
                }
            }
        }
        (Value::Array(dst), Value::Array(src)) if is_list(&src) => {
            for entry in src {
                let keys = entry_keys(&entry);
                match dst.iter_mut().find(|node| entry_keys(node) == keys) {
                    Some(node) => merge(node, entry),
                    None => dst.push(entry),
                }
            }
        }
        (dst, src) => *dst = src,
    }
}

// Returns whether the list entry has the given key values. Identity values
// are compared without their module prefix.
pub(crate) fn key_matches(
    entry: &Value,
    keys: &BTreeMap<String, String>,
) -> bool {
    keys.iter().all(|(key, value)| {
        entry
            .get(key)
            .map(scalar_to_string)
            .is_some_and(|entry_value| {
                strip_module_prefix(&entry_value) == strip_module_prefix(value)
            })
    })
}

// Strips the module-qualified wrapper some targets put around the returned
// node, e.g. `{"openconfig-network-instance:config": {...}}`.
pub(crate) fn unwrap_container(value: Value, name: &str) -> Value {
    match value {
        Value::Object(map)
            if map.len() == 1
                && map
                    .keys()
                    .next()
                    .is_some_and(|key| strip_module_prefix(key) == name) =>
        {
            map.into_iter()
                .next()
                .map(|(_, inner)| inner)
                .unwrap_or_default()
        }
        value => value,
    }
}

// ===== helper functions =====

fn child<'a>(node: &'a Value, name: &str) -> Option<&'a Value> {
    let map = node.as_object()?;
    map.get(name).or_else(|| {
        map.iter()
            .find(|(key, _)| strip_module_prefix(key) == name)
            .map(|(_, value)| value)
    })
}

fn lookup_existing_mut<'a>(
    mut node: &'a mut Value,
    elems: &[PathElem],
) -> Option<&'a mut Value> {
    for elem in elems {
        node = node.as_object_mut()?.get_mut(&elem.name)?;
        if !elem.keys.is_empty() {
            node = node
                .as_array_mut()?
                .iter_mut()
                .find(|entry| key_matches(entry, &elem.keys))?;
        }
    }
    Some(node)
}

fn new_entry(keys: &BTreeMap<String, String>) -> Value {
    let map = keys
        .iter()
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    Value::Object(map)
}

fn is_list(entries: &[Value]) -> bool {
    !entries.is_empty() && entries.iter().all(Value::is_object)
}

fn entry_keys(entry: &Value) -> BTreeMap<String, String> {
    entry
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(_, value)| !value.is_object() && !value.is_array())
        .map(|(key, value)| {
            let value = scalar_to_string(value);
            (key.clone(), strip_module_prefix(&value).to_owned())
        })
        .collect()
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        value => value.to_string(),
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use maplit::btreemap;
    use ocprobe_openconfig::Path;
    use serde_json::json;

    use super::*;

    fn elems(path: &str) -> Vec<PathElem> {
        path.parse::<Path>().unwrap().elems
    }

    #[test]
    fn lookup_keyed() {
        let tree = json!({
            "table-connections": {
                "table-connection": [{
                    "src-protocol": "openconfig-policy-types:STATIC",
                    "address-family": "openconfig-types:IPV6",
                    "config": { "import-policy": ["b"] }
                }, {
                    "src-protocol": "openconfig-policy-types:STATIC",
                    "address-family": "openconfig-types:IPV4",
                    "config": { "import-policy": ["a"] }
                }]
            }
        });
        let node = lookup(
            &tree,
            &elems("/table-connections/table-connection[src-protocol=STATIC][address-family=IPV4]/config/import-policy"),
        );
        assert_eq!(node, Some(&json!(["a"])));
        assert!(lookup(&tree, &elems("/table-connections/x")).is_none());
    }

    #[test]
    fn merge_lists() {
        let mut tree = json!({
            "policy-definition": [{ "name": "a", "config": { "name": "a" } }],
            "tag-value": [1, 2]
        });
        merge(
            &mut tree,
            json!({
                "policy-definition": [
                    { "name": "a", "config": { "x": 1 } },
                    { "name": "b", "config": { "name": "b" } }
                ],
                "tag-value": [3]
            }),
        );
        assert_eq!(
            tree,
            json!({
                "policy-definition": [
                    { "name": "a", "config": { "name": "a", "x": 1 } },
                    { "name": "b", "config": { "name": "b" } }
                ],
                "tag-value": [3]
            })
        );
    }

    #[test]
    fn create_and_remove() {
        let mut tree = Value::Null;
        let path = elems("/a/b[name=x]/config");
        *lookup_mut(&mut tree, &path) = json!({ "enabled": true });
        assert_eq!(
            tree,
            json!({ "a": { "b": [{ "name": "x", "config": { "enabled": true } }] } })
        );
        assert!(remove(&mut tree, &elems("/a/b[name=x]")));
        assert!(!remove(&mut tree, &elems("/a/b[name=x]")));
        assert_eq!(tree, json!({ "a": { "b": [] } }));
    }

    #[test]
    fn key_match_identities() {
        let entry = json!({ "identifier": "openconfig-policy-types:ISIS", "level": 2 });
        assert!(key_matches(&entry, &btreemap! {
            "identifier".to_owned() => "ISIS".to_owned(),
            "level".to_owned() => "2".to_owned(),
        }));
        assert!(!key_matches(&entry, &btreemap! {
            "identifier".to_owned() => "STATIC".to_owned(),
        }));
    }

    #[test]
    fn unwrap_qualified() {
        let value = json!({ "openconfig-network-instance:config": { "a": 1 } });
        assert_eq!(unwrap_container(value, "config"), json!({ "a": 1 }));
        let value = json!({ "a": 1 });
        assert_eq!(unwrap_container(value.clone(), "config"), value);
    }
}
