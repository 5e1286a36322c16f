//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use ocprobe_openconfig::{Path, PathElem};
use serde_json::Value;

use crate::batch::SetBatch;
use crate::client::{Capabilities, DataType, Target, Update};
use crate::error::Error;
use crate::tree;

// In-memory gNMI target.
//
// Configuration is kept as a single JSON_IETF tree edited with gNMI
// semantics. State reads are served from the operational tree first, then
// from the configuration, with every `state` container mirroring its
// sibling `config` container.
#[derive(Debug, Default)]
pub struct MemoryTarget {
    // Running configuration.
    pub config: Value,
    // Operational-only data (e.g. adjacencies).
    pub state: Value,
    // Every Set() request received, in order.
    pub set_requests: Vec<SetBatch>,
    // Every Get() request received, in order.
    pub get_requests: Vec<(Path, DataType)>,
    // Error returned by the next Set() request.
    pub set_error: Option<tonic::Status>,
}

// ===== impl MemoryTarget =====

impl MemoryTarget {
    pub fn new() -> MemoryTarget {
        MemoryTarget::default()
    }

    // Stores operational data at the given path.
    pub fn set_state(&mut self, path: &Path, value: Value) {
        *tree::lookup_mut(&mut self.state, &path.elems) = value;
    }

    fn read(&self, path: &Path, data_type: DataType) -> Option<&Value> {
        match data_type {
            DataType::Config => tree::lookup(&self.config, &path.elems),
            DataType::All | DataType::State | DataType::Operational => {
                tree::lookup(&self.state, &path.elems).or_else(|| {
                    let elems = path
                        .elems
                        .iter()
                        .map(|elem| match elem.name.as_str() {
                            "state" => PathElem::new("config"),
                            _ => elem.clone(),
                        })
                        .collect::<Vec<_>>();
                    tree::lookup(&self.config, &elems)
                })
            }
        }
    }
}

impl Target for MemoryTarget {
    fn capabilities(&mut self) -> Result<Capabilities, Error> {
        Ok(Capabilities {
            version: "0.10.0".to_owned(),
            models: vec![],
            json_ietf: true,
        })
    }

    fn get(
        &mut self,
        path: &Path,
        data_type: DataType,
    ) -> Result<Vec<Update>, Error> {
        self.get_requests.push((path.clone(), data_type));

        match self.read(path, data_type) {
            Some(value) => Ok(vec![Update {
                path: path.clone(),
                value: value.clone(),
            }]),
            None => Err(Error::Rpc(tonic::Status::not_found(format!(
                "no data at {path}"
            )))),
        }
    }

    fn set(&mut self, batch: &SetBatch) -> Result<(), Error> {
        self.set_requests.push(batch.clone());
        if let Some(status) = self.set_error.take() {
            return Err(Error::Rpc(status));
        }

        let (deletes, replaces, updates) = batch.split();
        for path in deletes {
            tree::remove(&mut self.config, &path.elems);
        }
        for (path, value) in replaces {
            *tree::lookup_mut(&mut self.config, &path.elems) = value.clone();
        }
        for (path, value) in updates {
            let node = tree::lookup_mut(&mut self.config, &path.elems);
            tree::merge(node, value.clone());
        }

        Ok(())
    }
}
