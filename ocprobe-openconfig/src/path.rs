//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use itertools::join;

use crate::error::Error;

// Schema path to a data node, as carried by gNMI requests.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Path {
    pub origin: Option<String>,
    pub elems: Vec<PathElem>,
}

// Single element of a schema path, with the keys of a list entry.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct PathElem {
    pub name: String,
    pub keys: BTreeMap<String, String>,
}

// ===== impl Path =====

impl Path {
    pub fn root() -> Path {
        Path::default()
    }

    // Appends a container or leaf element.
    #[must_use]
    pub fn elem(mut self, name: &str) -> Path {
        self.elems.push(PathElem::new(name));
        self
    }

    // Appends a list entry element.
    #[must_use]
    pub fn keyed<'a, I>(mut self, name: &str, keys: I) -> Path
    where
        I: IntoIterator<Item = (&'a str, String)>,
    {
        let mut elem = PathElem::new(name);
        elem.keys.extend(
            keys.into_iter()
                .map(|(key, value)| (key.to_owned(), value)),
        );
        self.elems.push(elem);
        self
    }

    // Appends all elements of the given relative path.
    #[must_use]
    pub fn join(mut self, other: &Path) -> Path {
        self.elems.extend(other.elems.iter().cloned());
        self
    }

    pub fn is_root(&self) -> bool {
        self.elems.is_empty()
    }

    // Returns the name of the last element.
    pub fn last_name(&self) -> Option<&str> {
        self.elems.last().map(|elem| elem.name.as_str())
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(origin) = &self.origin {
            write!(f, "{origin}:")?;
        }
        write!(f, "/{}", join(self.elems.iter(), "/"))
    }
}

impl std::str::FromStr for Path {
    type Err = Error;

    // Parses the "/a/b[k=v]/c" textual form. Slashes inside key values are
    // allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut elems = vec![];
        let mut current = String::new();
        let mut depth = 0;
        for c in s.chars() {
            match c {
                '[' => depth += 1,
                ']' if depth == 0 => {
                    return Err(Error::InvalidPath(s.to_owned()));
                }
                ']' => depth -= 1,
                '/' if depth == 0 => {
                    if !current.is_empty() {
                        elems.push(PathElem::parse(&current, s)?);
                        current.clear();
                    }
                    continue;
                }
                _ => (),
            }
            current.push(c);
        }
        if depth != 0 {
            return Err(Error::InvalidPath(s.to_owned()));
        }
        if !current.is_empty() {
            elems.push(PathElem::parse(&current, s)?);
        }

        Ok(Path {
            origin: None,
            elems,
        })
    }
}

// ===== impl PathElem =====

impl PathElem {
    pub fn new(name: &str) -> PathElem {
        PathElem {
            name: name.to_owned(),
            keys: Default::default(),
        }
    }

    fn parse(elem: &str, path: &str) -> Result<PathElem, Error> {
        let invalid = || Error::InvalidPath(path.to_owned());

        let (name, mut rest) = match elem.find('[') {
            Some(pos) => elem.split_at(pos),
            None => (elem, ""),
        };
        if name.is_empty() {
            return Err(invalid());
        }

        let mut keys = BTreeMap::new();
        while !rest.is_empty() {
            let end = rest.find(']').ok_or_else(invalid)?;
            let (key, value) =
                rest[1..end].split_once('=').ok_or_else(invalid)?;
            keys.insert(key.to_owned(), value.to_owned());
            rest = &rest[end + 1..];
            if !rest.is_empty() && !rest.starts_with('[') {
                return Err(invalid());
            }
        }

        Ok(PathElem {
            name: name.to_owned(),
            keys,
        })
    }
}

impl std::fmt::Display for PathElem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.keys {
            write!(f, "[{key}={value}]")?;
        }
        Ok(())
    }
}

// ===== global functions =====

// Path of a network instance.
pub fn network_instance(name: &str) -> Path {
    Path::root()
        .elem("network-instances")
        .keyed("network-instance", [("name", name.to_owned())])
}

// ===== unit tests =====
