//! Scripted in-memory transport for tests and offline demos.
//!
//! Replies are keyed by method name, or by `method:event` for calls carrying
//! an `event` parameter (subscriptions). Long-poll calls without a scripted
//! reply stay pending until one is pushed, the way the plugin holds a
//! subscription open until the player changes.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

use super::{RpcCall, RpcTransport, TransportError};

type Handler = Box<dyn Fn(&Value) -> Result<Value, TransportError> + Send + Sync>;

struct Scripted {
    delay: Option<Duration>,
    reply: Result<Value, TransportError>,
}

#[derive(Default)]
struct Script {
    queued: HashMap<String, VecDeque<Scripted>>,
    handlers: HashMap<String, Handler>,
}

#[derive(Default)]
struct Activity {
    calls: Vec<RpcCall>,
    in_flight: HashMap<String, usize>,
    max_in_flight: HashMap<String, usize>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<Script>,
    activity: Mutex<Activity>,
    script_changed: Notify,
    call_made: Notify,
}

impl std::fmt::Debug for ScriptedTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedTransport")
            .field("calls", &self.calls().len())
            .finish()
    }
}

/// Key a call is scripted under.
pub fn call_key(call: &RpcCall) -> String {
    match call.params.get("event").and_then(Value::as_str) {
        Some(event) => format!("{}:{}", call.method, event),
        None => call.method.clone(),
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, key: &str, value: Value) -> Self {
        self.push(key, None, Ok(value));
        self
    }

    pub fn with_fault(self, key: &str, code: i64, message: &str) -> Self {
        self.push(key, None, Err(TransportError::fault(code, message)));
        self
    }

    pub fn with_delayed_reply(self, key: &str, delay: Duration, value: Value) -> Self {
        self.push(key, Some(delay), Ok(value));
        self
    }

    /// Answer every call to `key` through `handler`; queued replies win.
    pub fn with_handler<F>(self, key: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, TransportError> + Send + Sync + 'static,
    {
        if let Ok(mut script) = self.script.lock() {
            script.handlers.insert(key.to_string(), Box::new(handler));
        }
        self
    }

    /// Queue a reply while calls may already be waiting for it.
    pub fn push_reply(&self, key: &str, reply: Result<Value, TransportError>) {
        self.push(key, None, reply);
    }

    fn push(&self, key: &str, delay: Option<Duration>, reply: Result<Value, TransportError>) {
        if let Ok(mut script) = self.script.lock() {
            script
                .queued
                .entry(key.to_string())
                .or_default()
                .push_back(Scripted { delay, reply });
        }
        self.script_changed.notify_waiters();
    }

    fn take(&self, key: &str, params: &Value) -> Option<Scripted> {
        let mut script = self.script.lock().ok()?;
        if let Some(scripted) = script.queued.get_mut(key).and_then(VecDeque::pop_front) {
            return Some(scripted);
        }
        script.handlers.get(key).map(|handler| Scripted {
            delay: None,
            reply: handler(params),
        })
    }

    pub fn calls(&self) -> Vec<RpcCall> {
        self.activity
            .lock()
            .map(|activity| activity.calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self, key: &str) -> usize {
        self.calls().iter().filter(|call| call_key(call) == key).count()
    }

    /// Highest number of simultaneously outstanding calls seen for `key`.
    pub fn max_in_flight(&self, key: &str) -> usize {
        self.activity
            .lock()
            .ok()
            .and_then(|activity| activity.max_in_flight.get(key).copied())
            .unwrap_or(0)
    }

    pub fn in_flight(&self, key: &str) -> usize {
        self.activity
            .lock()
            .ok()
            .and_then(|activity| activity.in_flight.get(key).copied())
            .unwrap_or(0)
    }

    /// Wait until at least `count` calls for `key` were made.
    pub async fn wait_for_calls(&self, key: &str, count: usize, timeout: Duration) -> bool {
        let wait = async {
            loop {
                let notified = self.call_made.notified();
                if self.call_count(key) >= count {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(timeout, wait).await.is_ok()
    }

    fn begin(&self, call: &RpcCall, key: &str) {
        if let Ok(mut activity) = self.activity.lock() {
            activity.calls.push(call.clone());
            let current = {
                let entry = activity.in_flight.entry(key.to_string()).or_insert(0);
                *entry += 1;
                *entry
            };
            let max = activity.max_in_flight.entry(key.to_string()).or_insert(0);
            *max = (*max).max(current);
        }
        self.call_made.notify_waiters();
    }

    fn end(&self, key: &str) {
        if let Ok(mut activity) = self.activity.lock() {
            if let Some(count) = activity.in_flight.get_mut(key) {
                *count = count.saturating_sub(1);
            }
        }
    }
}

/// Decrements the in-flight counter even when the call future is dropped.
struct InFlight<'a> {
    transport: &'a ScriptedTransport,
    key: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.transport.end(&self.key);
    }
}

#[async_trait]
impl RpcTransport for ScriptedTransport {
    async fn call(&self, call: RpcCall) -> Result<Value, TransportError> {
        let key = call_key(&call);
        self.begin(&call, &key);
        let _guard = InFlight {
            transport: self,
            key: key.clone(),
        };

        let scripted = loop {
            let notified = self.script_changed.notified();
            if let Some(scripted) = self.take(&key, &call.params) {
                break scripted;
            }
            if !call.long_poll {
                return Err(TransportError::fault(2, format!("Method {} not found", call.method)));
            }
            notified.await;
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        scripted.reply
    }
}
