//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::time::Duration;

use ocprobe_openconfig::{Path, PathElem};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tonic::metadata::AsciiMetadataValue;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, debug_span, trace};

use crate::batch::SetBatch;
use crate::error::Error;
use crate::tree;

pub(crate) mod proto {
    #![allow(clippy::all)]
    tonic::include_proto!("gnmi");
    pub use g_nmi_client::GNmiClient;
}

pub(crate) mod gnmi_ext {
    #![allow(clippy::all)]
    tonic::include_proto!("gnmi_ext");
}

// Kind of data requested by a Get() operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DataType {
    All,
    Config,
    State,
    Operational,
}

// Decoded update received in a Get() response.
#[derive(Clone, Debug, PartialEq)]
pub struct Update {
    pub path: Path,
    pub value: serde_json::Value,
}

#[derive(Clone, Debug, Default)]
pub struct Capabilities {
    pub version: String,
    pub models: Vec<ModelData>,
    pub json_ietf: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ModelData {
    pub name: String,
    pub organization: String,
    pub version: String,
}

// Management interface of a gNMI target.
pub trait Target {
    // Retrieves the models and encodings supported by the target.
    fn capabilities(&mut self) -> Result<Capabilities, Error>;

    // Retrieves the data at the given path, encoded as JSON_IETF.
    fn get(
        &mut self,
        path: &Path,
        data_type: DataType,
    ) -> Result<Vec<Update>, Error>;

    // Applies all operations of the batch in a single transaction.
    fn set(&mut self, batch: &SetBatch) -> Result<(), Error>;
}

// Typed helpers on top of `Target`.
pub trait TargetExt: Target {
    // Reads and decodes the configuration at the given path.
    fn get_config<T>(&mut self, path: &Path) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        self.lookup_config(path)?
            .ok_or_else(|| Error::NotFound(path.clone()))
    }

    // Reads and decodes the state at the given path.
    fn get_state<T>(&mut self, path: &Path) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        self.lookup_state(path)?
            .ok_or_else(|| Error::NotFound(path.clone()))
    }

    fn lookup_config<T>(&mut self, path: &Path) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.lookup(path, DataType::Config)
    }

    fn lookup_state<T>(&mut self, path: &Path) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        self.lookup(path, DataType::State)
    }

    // Reads and decodes the data at the given path. Returns `None` when the
    // target has no data there.
    fn lookup<T>(
        &mut self,
        path: &Path,
        data_type: DataType,
    ) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
    {
        let updates = match self.get(path, data_type) {
            Ok(updates) => updates,
            Err(error) if error.is_not_found() => return Ok(None),
            Err(error) => return Err(error),
        };
        let Some(value) = assemble(path, updates) else {
            return Ok(None);
        };

        serde_json::from_value(value)
            .map(Some)
            .map_err(|error| Error::Decode(path.clone(), error))
    }

    // Merges a single value into the target.
    fn update<T>(&mut self, path: Path, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let mut batch = SetBatch::new();
        batch.update(path, value)?;
        self.set(&batch)
    }

    // Replaces a single subtree of the target.
    fn replace<T>(&mut self, path: Path, value: &T) -> Result<(), Error>
    where
        T: Serialize + ?Sized,
    {
        let mut batch = SetBatch::new();
        batch.replace(path, value)?;
        self.set(&batch)
    }
}

impl<T: Target + ?Sized> TargetExt for T {}

// Options used to reach a gNMI target.
#[derive(Clone, Debug, Default)]
pub struct ConnectOptions {
    pub tls: Option<TlsOptions>,
    pub credentials: Option<Credentials>,
    pub timeout: Option<Duration>,
}

#[derive(Clone, Debug, Default)]
pub struct TlsOptions {
    // PEM file of the CA that signed the target certificate.
    pub ca_certificate: Option<String>,
    // Name to verify the target certificate against.
    pub domain_name: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

// Blocking gNMI client.
//
// The order of the fields in this struct is important. They must be ordered
// such that when `GnmiClient` is dropped the client is dropped before the
// runtime. Not doing this will result in a deadlock when dropped. Rust drops
// struct fields in declaration order.
#[derive(Debug)]
pub struct GnmiClient {
    address: String,
    client: proto::GNmiClient<Channel>,
    credentials: Option<(AsciiMetadataValue, AsciiMetadataValue)>,
    runtime: tokio::runtime::Runtime,
}

// ===== impl GnmiClient =====

impl GnmiClient {
    pub fn connect(
        address: &str,
        options: &ConnectOptions,
    ) -> Result<GnmiClient, Error> {
        // Initialize tokio runtime.
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        let mut endpoint = Endpoint::from_shared(address.to_owned())
            .map_err(|_| Error::InvalidAddress(address.to_owned()))?;
        if let Some(timeout) = options.timeout {
            endpoint = endpoint.timeout(timeout).connect_timeout(timeout);
        }
        if let Some(tls) = &options.tls {
            let mut tls_config = ClientTlsConfig::new();
            if let Some(file) = &tls.ca_certificate {
                let pem = std::fs::read(file).map_err(|error| {
                    Error::TlsCertificate(file.clone(), error)
                })?;
                tls_config =
                    tls_config.ca_certificate(Certificate::from_pem(pem));
            }
            if let Some(domain_name) = &tls.domain_name {
                tls_config = tls_config.domain_name(domain_name.clone());
            }
            endpoint =
                endpoint.tls_config(tls_config).map_err(Error::Connect)?;
        }

        let credentials = options
            .credentials
            .as_ref()
            .map(|credentials| {
                let username = credentials.username.parse();
                let password = credentials.password.parse();
                match (username, password) {
                    (Ok(username), Ok(password)) => Ok((username, password)),
                    _ => Err(Error::InvalidCredentials),
                }
            })
            .transpose()?;

        // Connect to the target.
        debug!(%address, "connecting to gNMI target");
        let channel = runtime
            .block_on(endpoint.connect())
            .map_err(Error::Connect)?;
        let client = proto::GNmiClient::new(channel);

        Ok(GnmiClient {
            address: address.to_owned(),
            client,
            credentials,
            runtime,
        })
    }

    fn request<T>(&self, message: T) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        if let Some((username, password)) = &self.credentials {
            let metadata = request.metadata_mut();
            metadata.insert("username", username.clone());
            metadata.insert("password", password.clone());
        }
        request
    }

    fn rpc_sync_capabilities(
        &mut self,
    ) -> Result<tonic::Response<proto::CapabilityResponse>, tonic::Status>
    {
        let request = self.request(proto::CapabilityRequest::default());
        self.runtime.block_on(self.client.capabilities(request))
    }

    fn rpc_sync_get(
        &mut self,
        request: proto::GetRequest,
    ) -> Result<tonic::Response<proto::GetResponse>, tonic::Status> {
        let request = self.request(request);
        self.runtime.block_on(self.client.get(request))
    }

    fn rpc_sync_set(
        &mut self,
        request: proto::SetRequest,
    ) -> Result<tonic::Response<proto::SetResponse>, tonic::Status> {
        let request = self.request(request);
        self.runtime.block_on(self.client.set(request))
    }
}

impl Target for GnmiClient {
    fn capabilities(&mut self) -> Result<Capabilities, Error> {
        debug_span!("gnmi", address = %self.address).in_scope(|| {
            debug!("sending Capabilities() request");
        });

        let response = self.rpc_sync_capabilities()?.into_inner();
        let json_ietf = response
            .supported_encodings
            .contains(&(proto::Encoding::JsonIetf as i32));
        let models = response
            .supported_models
            .into_iter()
            .map(|model| ModelData {
                name: model.name,
                organization: model.organization,
                version: model.version,
            })
            .collect();

        Ok(Capabilities {
            version: response.g_nmi_version,
            models,
            json_ietf,
        })
    }

    fn get(
        &mut self,
        path: &Path,
        data_type: DataType,
    ) -> Result<Vec<Update>, Error> {
        let span = debug_span!("gnmi", address = %self.address);
        let _span_guard = span.enter();

        let request = proto::GetRequest {
            prefix: None,
            path: vec![proto::Path::from(path)],
            r#type: proto::get_request::DataType::from(data_type) as i32,
            encoding: proto::Encoding::JsonIetf as i32,
            use_models: vec![],
            extension: vec![],
        };
        debug!(%path, ?data_type, "sending Get() request");
        trace!("{:?}", request);

        let response = self.rpc_sync_get(request)?.into_inner();
        trace!("{:?}", response);

        let mut updates = vec![];
        for notification in response.notification {
            let prefix =
                notification.prefix.map(Path::from).unwrap_or_default();
            for update in notification.update {
                let path = match update.path {
                    Some(path) => prefix.clone().join(&Path::from(path)),
                    None => prefix.clone(),
                };
                let value = match update.val {
                    Some(val) => decode_value(&path, val)?,
                    None => serde_json::Value::Null,
                };
                updates.push(Update { path, value });
            }
        }

        Ok(updates)
    }

    fn set(&mut self, batch: &SetBatch) -> Result<(), Error> {
        let span = debug_span!("gnmi", address = %self.address);
        let _span_guard = span.enter();

        let (deletes, replaces, updates) = batch.split();
        let request = proto::SetRequest {
            prefix: None,
            delete: deletes.into_iter().map(proto::Path::from).collect(),
            replace: replaces
                .into_iter()
                .map(|(path, value)| encode_update(path, value))
                .collect::<Result<_, _>>()?,
            update: updates
                .into_iter()
                .map(|(path, value)| encode_update(path, value))
                .collect::<Result<_, _>>()?,
            extension: vec![],
            union_replace: vec![],
        };
        debug!(operations = batch.len(), "sending Set() request");
        for operation in batch {
            debug!(path = %operation.path(), "{}", operation_name(operation));
        }
        trace!("{:?}", request);

        let response = self.rpc_sync_set(request)?.into_inner();
        trace!("{:?}", response);

        Ok(())
    }
}

// ===== From/TryFrom conversion methods =====

impl From<DataType> for proto::get_request::DataType {
    fn from(data_type: DataType) -> proto::get_request::DataType {
        match data_type {
            DataType::All => proto::get_request::DataType::All,
            DataType::Config => proto::get_request::DataType::Config,
            DataType::State => proto::get_request::DataType::State,
            DataType::Operational => {
                proto::get_request::DataType::Operational
            }
        }
    }
}

impl From<&Path> for proto::Path {
    fn from(path: &Path) -> proto::Path {
        proto::Path {
            origin: path.origin.clone().unwrap_or_default(),
            elem: path
                .elems
                .iter()
                .map(|elem| proto::PathElem {
                    name: elem.name.clone(),
                    key: elem
                        .keys
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                })
                .collect(),
            target: String::new(),
        }
    }
}

impl From<proto::Path> for Path {
    fn from(path: proto::Path) -> Path {
        Path {
            origin: (!path.origin.is_empty()).then_some(path.origin),
            elems: path
                .elem
                .into_iter()
                .map(|elem| PathElem {
                    name: elem.name,
                    keys: elem.key.into_iter().collect(),
                })
                .collect(),
        }
    }
}

// ===== helper functions =====

fn operation_name(operation: &crate::batch::SetOperation) -> &'static str {
    use crate::batch::SetOperation;

    match operation {
        SetOperation::Delete(..) => "delete",
        SetOperation::Replace(..) => "replace",
        SetOperation::Update(..) => "update",
    }
}

fn encode_update(
    path: &Path,
    value: &serde_json::Value,
) -> Result<proto::Update, Error> {
    let json = serde_json::to_vec(value)
        .map_err(|error| Error::Encode(path.clone(), error))?;

    Ok(proto::Update {
        path: Some(proto::Path::from(path)),
        val: Some(proto::TypedValue {
            value: Some(proto::typed_value::Value::JsonIetfVal(json)),
        }),
        duplicates: 0,
    })
}

fn decode_value(
    path: &Path,
    val: proto::TypedValue,
) -> Result<serde_json::Value, Error> {
    use proto::typed_value::Value;

    let Some(value) = val.value else {
        return Ok(serde_json::Value::Null);
    };
    match value {
        Value::JsonIetfVal(json) | Value::JsonVal(json) => {
            serde_json::from_slice(&json)
                .map_err(|error| Error::Decode(path.clone(), error))
        }
        Value::StringVal(value) | Value::AsciiVal(value) => {
            Ok(serde_json::Value::String(value))
        }
        Value::IntVal(value) => Ok(value.into()),
        Value::UintVal(value) => Ok(value.into()),
        Value::BoolVal(value) => Ok(value.into()),
        Value::DoubleVal(value) => serde_json::Number::from_f64(value)
            .map(serde_json::Value::Number)
            .ok_or_else(|| Error::UnsupportedValue(path.clone())),
        Value::LeaflistVal(array) => array
            .element
            .into_iter()
            .map(|element| decode_value(path, element))
            .collect::<Result<Vec<_>, _>>()
            .map(serde_json::Value::Array),
        Value::BytesVal(..) | Value::ProtoBytes(..) => {
            Err(Error::UnsupportedValue(path.clone()))
        }
    }
}

// Builds the value rooted at the requested path out of the received
// updates. Targets may answer with a single update holding the whole
// subtree, or with one update per descendant node.
pub(crate) fn assemble(
    path: &Path,
    updates: Vec<Update>,
) -> Option<serde_json::Value> {
    let name = path.last_name().unwrap_or_default();
    let mut root = None;
    for update in updates {
        let relative = update
            .path
            .elems
            .strip_prefix(path.elems.as_slice())
            .unwrap_or_default();
        let value = if relative.is_empty() {
            tree::unwrap_container(update.value, name)
        } else {
            update.value
        };

        let root = root.get_or_insert(serde_json::Value::Null);
        tree::merge(tree::lookup_mut(root, relative), value);
    }
    root
}

// ===== unit tests =====
