//! Identity-preserving proxies for host-side template invocations.
//!
//! The host never hands out references, only numeric identifiers. A
//! [`FrameCache`] memoizes the proxy built for each identifier so that
//! two round trips returning "the same" invocation yield the same local
//! object, preserving reference-equality expectations in script code.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::rc::Rc;

use serde_json::{Value, json};

use scriptbox_proto::{Namespace, Payload};

use crate::bridge::Bridge;
use crate::error::{Error, Result};

/// Proxy for a host-side template invocation.
///
/// Holds only the host-assigned identifier plus immutable seed state;
/// every operation on the underlying invocation is a remote call.
#[derive(Debug)]
pub struct Frame {
    /// Host-assigned identifier.
    id: i64,
    /// Title of the page being invoked, as seeded at first resolution.
    title: String,
}

impl Frame {
    /// The host-assigned identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// The invocation's page title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fetches the parent invocation (the template's caller), if any.
    pub fn parent<R: BufRead, W: Write>(
        &self,
        bridge: &mut Bridge<R, W>,
        cache: &mut FrameCache,
    ) -> Result<Option<Rc<Self>>> {
        let reply = expect_value(bridge.call(
            Namespace::Wiki,
            "frame_getParent",
            vec![json!(self.id)],
        )?)?;
        if reply.is_null() {
            return Ok(None);
        }
        cache.rehydrate(&reply).map(Some)
    }

    /// Creates a child invocation with the given arguments.
    pub fn new_child<R: BufRead, W: Write>(
        &self,
        bridge: &mut Bridge<R, W>,
        cache: &mut FrameCache,
        args: Value,
    ) -> Result<Rc<Self>> {
        let reply = expect_value(bridge.call(
            Namespace::Wiki,
            "frame_newChild",
            vec![json!(self.id), args],
        )?)?;
        cache.rehydrate(&reply)
    }
}

/// Process-lifetime table of frame proxies, keyed by host identifier.
///
/// Unbounded by design: handles are an identifier plus a title, and the
/// number of distinct invocations one script run touches is bounded by
/// call volume, not data size. Single-threaded, so no locking.
#[derive(Debug, Default)]
pub struct FrameCache {
    /// All handles ever resolved, owned for the process lifetime.
    handles: HashMap<i64, Rc<Frame>>,
}

impl FrameCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the one handle for `id`, constructing it on first sight.
    ///
    /// On a hit the existing handle is returned unconditionally and the
    /// seed `title` is ignored: identity wins over freshness. At most one
    /// live handle exists per identifier.
    pub fn resolve(&mut self, id: i64, title: &str) -> Rc<Frame> {
        Rc::clone(self.handles.entry(id).or_insert_with(|| {
            Rc::new(Frame {
                id,
                title: title.to_owned(),
            })
        }))
    }

    /// Turns a host reply mapping (`{"id":...,"title":...}`) into a handle.
    fn rehydrate(&mut self, reply: &Value) -> Result<Rc<Frame>> {
        let rec = reply
            .as_object()
            .ok_or_else(|| Error::Type("frame reply is not a mapping".to_owned()))?;
        let id = rec
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| Error::Key("id".to_owned()))?;
        let title = rec.get("title").and_then(Value::as_str).unwrap_or_default();
        Ok(self.resolve(id, title))
    }
}

/// Fetches the current template invocation and resolves it to its handle.
pub fn current_frame<R: BufRead, W: Write>(
    bridge: &mut Bridge<R, W>,
    cache: &mut FrameCache,
) -> Result<Rc<Frame>> {
    let reply = expect_value(bridge.call(Namespace::Wiki, "getCurrentFrame", Vec::new())?)?;
    cache.rehydrate(&reply)
}

/// Unwraps a payload that must be a JSON value, not binary content.
fn expect_value(payload: Payload) -> Result<Value> {
    match payload {
        Payload::Value(value) => Ok(value),
        _ => Err(Error::Type("expected a value, got binary data".to_owned())),
    }
}
