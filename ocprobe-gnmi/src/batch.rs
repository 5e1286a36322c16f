//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use enum_as_inner::EnumAsInner;
use ocprobe_openconfig::Path;
use serde::Serialize;

use crate::error::Error;

// Set of operations transmitted to the target in a single atomic Set()
// request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SetBatch {
    operations: Vec<SetOperation>,
}

#[derive(Clone, Debug, EnumAsInner, PartialEq)]
pub enum SetOperation {
    Delete(Path),
    Replace(Path, serde_json::Value),
    Update(Path, serde_json::Value),
}

// ===== impl SetBatch =====

impl SetBatch {
    pub fn new() -> SetBatch {
        SetBatch::default()
    }

    // Queues a merge of the given value at the given path.
    pub fn update<T>(&mut self, path: Path, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let value = encode(&path, value)?;
        self.operations.push(SetOperation::Update(path, value));
        Ok(())
    }

    // Queues a replacement of the subtree at the given path.
    pub fn replace<T>(&mut self, path: Path, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let value = encode(&path, value)?;
        self.operations.push(SetOperation::Replace(path, value));
        Ok(())
    }

    pub fn delete(&mut self, path: Path) {
        self.operations.push(SetOperation::Delete(path));
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SetOperation> {
        self.operations.iter()
    }

    // Returns the paths to delete, the replacements and the updates, in the
    // order the target must apply them.
    pub(crate) fn split(
        &self,
    ) -> (
        Vec<&Path>,
        Vec<(&Path, &serde_json::Value)>,
        Vec<(&Path, &serde_json::Value)>,
    ) {
        let mut deletes = vec![];
        let mut replaces = vec![];
        let mut updates = vec![];
        for op in &self.operations {
            match op {
                SetOperation::Delete(path) => deletes.push(path),
                SetOperation::Replace(path, value) => {
                    replaces.push((path, value))
                }
                SetOperation::Update(path, value) => {
                    updates.push((path, value))
                }
            }
        }
        (deletes, replaces, updates)
    }
}

impl<'a> IntoIterator for &'a SetBatch {
    type Item = &'a SetOperation;
    type IntoIter = std::slice::Iter<'a, SetOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

// ===== impl SetOperation =====

impl SetOperation {
    pub fn path(&self) -> &Path {
        match self {
            SetOperation::Delete(path)
            | SetOperation::Replace(path, _)
            | SetOperation::Update(path, _) => path,
        }
    }
}

// ===== helper functions =====

fn encode<T>(path: &Path, value: &T) -> Result<serde_json::Value, Error>
where
    T: Serialize + ?Sized,
{
    serde_json::to_value(value)
        .map_err(|error| Error::Encode(path.clone(), error))
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn split_order() {
        let mut batch = SetBatch::new();
        batch.update(Path::root().elem("b"), &json!({"x": 1})).unwrap();
        batch.delete(Path::root().elem("a"));
        batch.replace(Path::root().elem("c"), &json!(2)).unwrap();
        assert_eq!(batch.len(), 3);

        let (deletes, replaces, updates) = batch.split();
        assert_eq!(deletes[0].to_string(), "/a");
        assert_eq!(replaces[0].0.to_string(), "/c");
        assert_eq!(updates[0].1, &json!({"x": 1}));
        assert!(batch.iter().next().unwrap().is_update());
    }
}
