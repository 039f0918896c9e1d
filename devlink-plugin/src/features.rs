//! Members plugins contribute to the client's surface.
//!
//! A plugin contributes named members (plain values or callable methods)
//! and typed extensions looked up by type. Contributions from all activated
//! plugins are merged into a single [`Surface`] in activation order, so a
//! later plugin shadows an earlier one on a name or type collision.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{PluginError, Result};
use crate::plugin::PluginContext;

/// Signature of a method contributed by a plugin.
pub type MethodFn = dyn Fn(&PluginContext, &[Value]) -> Result<Value> + Send + Sync;

type Extension = Arc<dyn Any + Send + Sync>;

/// A single named member of the surface.
#[derive(Clone)]
pub enum Feature {
    Value(Value),
    Method(Arc<MethodFn>),
}

impl Feature {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Feature::Value(v) => Some(v),
            Feature::Method(_) => None,
        }
    }

    pub fn is_method(&self) -> bool {
        matches!(self, Feature::Method(_))
    }
}

impl fmt::Debug for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Feature::Method(_) => f.write_str("Method(..)"),
        }
    }
}

/// What one plugin contributes on activation.
#[derive(Clone, Default)]
pub struct Features {
    members: BTreeMap<String, Feature>,
    extensions: HashMap<TypeId, Extension>,
}

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members.insert(name.into(), Feature::Value(value.into()));
        self
    }

    pub fn with_method<F>(mut self, name: &str, method: F) -> Self
    where
        F: Fn(&PluginContext, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.members
            .insert(name.into(), Feature::Method(Arc::new(method)));
        self
    }

    /// Contribute a typed extension. The plugin usually keeps a clone of the
    /// same `Arc` to update shared state.
    pub fn with_extension<T: Any + Send + Sync>(mut self, extension: Arc<T>) -> Self {
        self.extensions.insert(TypeId::of::<T>(), extension);
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty() && self.extensions.is_empty()
    }
}

/// The merged surface of every activated plugin.
#[derive(Default)]
pub struct Surface {
    members: BTreeMap<String, Feature>,
    extensions: HashMap<TypeId, Extension>,
}

impl Surface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a plugin's contribution. Returns the member names that were
    /// shadowed by it.
    pub fn merge(&mut self, features: Features) -> Vec<String> {
        let mut shadowed = Vec::new();
        for (name, feature) in features.members {
            if self.members.insert(name.clone(), feature).is_some() {
                shadowed.push(name);
            }
        }
        self.extensions.extend(features.extensions);
        shadowed
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.members.get(name)
    }

    pub fn extension<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.extensions
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|ext| ext.downcast::<T>().ok())
    }

    pub fn names(&self) -> Vec<String> {
        self.members.keys().cloned().collect()
    }

    /// Resolve a method by name: `None` for unknown names, `NotAMethod` for
    /// plain values.
    pub fn method(&self, name: &str) -> Option<Result<Arc<MethodFn>>> {
        self.members.get(name).map(|feature| match feature {
            Feature::Method(m) => Ok(Arc::clone(m)),
            Feature::Value(_) => Err(PluginError::NotAMethod(name.into())),
        })
    }
}

/// Fetch a string argument for a contributed method.
pub fn arg_str<'a>(args: &'a [Value], index: usize, method: &str) -> Result<&'a str> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| PluginError::BadArguments {
            method: method.into(),
            reason: format!("argument {index} must be a string"),
        })
}
