//! Default values for Options fields.
//!
//! A default is either omitted, a static [`FlagSet`], or a resolver evaluated
//! once per create with the write context. Resolvers may be asynchronous; the
//! caller awaits them and no timeout is applied.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::types::FlagSet;

pub type DefaultFuture = Pin<Box<dyn Future<Output = FlagSet> + Send>>;
pub type DefaultResolver = Arc<dyn Fn(DefaultContext) -> DefaultFuture + Send + Sync>;

/// Everything a default resolver may look at.
#[derive(Debug, Clone, Default)]
pub struct DefaultContext {
    /// Opaque request context supplied by the host.
    pub context: JsonValue,
    /// The create input as received, before any field resolved it.
    pub original_input: JsonMap<String, JsonValue>,
    /// Pending mutation actions, opaque to this crate.
    pub actions: JsonValue,
}

impl DefaultContext {
    pub fn new(context: JsonValue, original_input: JsonMap<String, JsonValue>) -> Self {
        Self {
            context,
            original_input,
            actions: JsonValue::Null,
        }
    }

    pub fn with_actions(mut self, actions: JsonValue) -> Self {
        self.actions = actions;
        self
    }
}

#[derive(Clone, Default)]
pub enum DefaultSpec {
    #[default]
    Omitted,
    Static(FlagSet),
    Resolver(DefaultResolver),
}

impl DefaultSpec {
    /// Wraps a synchronous function.
    pub fn from_fn<F>(resolver: F) -> Self
    where
        F: Fn(&DefaultContext) -> FlagSet + Send + Sync + 'static,
    {
        DefaultSpec::Resolver(Arc::new(move |ctx: DefaultContext| -> DefaultFuture {
            let flags = resolver(&ctx);
            Box::pin(std::future::ready(flags))
        }))
    }

    /// Wraps an asynchronous function.
    pub fn from_async<F, Fut>(resolver: F) -> Self
    where
        F: Fn(DefaultContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = FlagSet> + Send + 'static,
    {
        DefaultSpec::Resolver(Arc::new(move |ctx: DefaultContext| -> DefaultFuture {
            Box::pin(resolver(ctx))
        }))
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, DefaultSpec::Omitted)
    }
}

impl From<FlagSet> for DefaultSpec {
    fn from(flags: FlagSet) -> Self {
        DefaultSpec::Static(flags)
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultSpec::Omitted => f.write_str("Omitted"),
            DefaultSpec::Static(flags) => f.debug_tuple("Static").field(flags).finish(),
            DefaultSpec::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}
