//
// Copyright (c) The ocprobe Contributors
//
// SPDX-License-Identifier: MIT
//

use std::borrow::Cow;

//
// OpenConfig conversion traits.
//

pub trait ToYang {
    // Return the module-qualified textual representation of the value, as
    // encoded in RFC 7951 JSON.
    fn to_yang(&self) -> Cow<'static, str>;

    // Return the unqualified representation, as used in gNMI path keys.
    fn to_yang_key(&self) -> Cow<'static, str> {
        match self.to_yang() {
            Cow::Borrowed(value) => Cow::Borrowed(strip_module_prefix(value)),
            Cow::Owned(value) => {
                Cow::Owned(strip_module_prefix(&value).to_owned())
            }
        }
    }
}

pub trait TryFromYang: Sized {
    // Construct value from an identity or enum value. Both the qualified and
    // unqualified forms are accepted.
    fn try_from_yang(identity: &str) -> Option<Self>;
}

// Removes the "module:" prefix of an identityref value, if any.
pub fn strip_module_prefix(value: &str) -> &str {
    match value.split_once(':') {
        Some((_, name)) => name,
        None => value,
    }
}

// Serde adapter for identityref leaves, encoded in their module-qualified
// form and decoded from either form.
pub mod identity {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{ToYang, TryFromYang};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: ToYang,
        S: Serializer,
    {
        serializer.serialize_str(&value.to_yang())
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: TryFromYang,
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        T::try_from_yang(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("unknown identity: {value}"))
        })
    }
}

// ===== unit tests =====
