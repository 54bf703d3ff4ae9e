// Copyright 2026 The notectl Authors.
//
// SPDX-License-Identifier: Apache-2.0
// Please see LICENSE in the repository root for full details.

//! Component K: the plugin host (§4.11, §5).
//!
//! Plugins register commands and middleware against a [`PluginHost`], which
//! owns the live [`EditorState`] and drives the single dispatch path: run
//! the middleware chain, install the resulting state, then notify
//! `onStateChange` observers synchronously in registration order (§5, steps
//! 1-4). A service registry (backed by [`TypedRegistry`]) lets plugins
//! expose APIs to siblings without a global namespace.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::error;

use crate::error::{CoreError, CoreResult};
use crate::state::EditorState;
use crate::transaction::Transaction;
use crate::typed_registry::{ServiceKey, TypedRegistry};

/// A plugin command: a pure `state -> transaction?` function registered
/// under a name so hosts can invoke it from a keymap or toolbar binding.
pub type CommandFn = dyn Fn(&EditorState) -> Option<Transaction> + Send + Sync;

/// Ordered middleware (§4.11). `next` advances the chain; a middleware that
/// never calls it vetoes the transaction. Middleware may transform the
/// transaction before calling `next`, or dispatch follow-up transactions
/// after `next` returns — that's an ordinary call to
/// [`PluginHost::dispatch`] from within the middleware body, which is safe
/// because dispatch only buffers when `applying` is already set (§5).
pub type MiddlewareFn = dyn Fn(Transaction, &EditorState, &mut dyn FnMut(Transaction) -> CoreResult<EditorState>) -> CoreResult<EditorState> + Send + Sync;

/// An `onStateChange` observer (§4.11). Observers must not re-enter the
/// dispatch path synchronously; the host doesn't prevent that call, it
/// only guarantees it is safely buffered rather than re-entrant (§5).
pub type ObserverFn = dyn Fn(&EditorState, &EditorState, &Transaction) + Send + Sync;

/// Owns the live editor state and drives dispatch through an ordered
/// middleware chain and a synchronous observer notification pass (§5).
pub struct PluginHost {
    state: EditorState,
    commands: HashMap<String, Arc<CommandFn>>,
    middleware: Vec<Arc<MiddlewareFn>>,
    observers: Vec<Arc<ObserverFn>>,
    services: TypedRegistry,
    applying: bool,
    pending: VecDeque<Transaction>,
}

impl PluginHost {
    pub fn new(state: EditorState) -> Self {
        Self {
            state,
            commands: HashMap::new(),
            middleware: Vec::new(),
            observers: Vec::new(),
            services: TypedRegistry::new(),
            applying: false,
            pending: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Register a named command so it can be looked up and invoked later,
    /// e.g. from a keymap binding (§4.11).
    pub fn register_command(&mut self, name: impl Into<String>, command: impl Fn(&EditorState) -> Option<Transaction> + Send + Sync + 'static) {
        self.commands.insert(name.into(), Arc::new(command));
    }

    pub fn command(&self, name: &str) -> Option<&Arc<CommandFn>> {
        self.commands.get(name)
    }

    /// Run a registered command against the live state and dispatch the
    /// resulting transaction, if any.
    pub fn run_command(&mut self, name: &str) -> CoreResult<bool> {
        let Some(command) = self.commands.get(name).cloned() else {
            return Ok(false);
        };
        match command(&self.state) {
            Some(tx) => {
                self.dispatch(tx)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Append middleware to the end of the chain (§4.11: "invokes them in
    /// registration order").
    pub fn use_middleware(&mut self, middleware: impl Fn(Transaction, &EditorState, &mut dyn FnMut(Transaction) -> CoreResult<EditorState>) -> CoreResult<EditorState> + Send + Sync + 'static) {
        self.middleware.push(Arc::new(middleware));
    }

    /// Register an `onStateChange` observer (§4.11).
    pub fn on_state_change(&mut self, observer: impl Fn(&EditorState, &EditorState, &Transaction) + Send + Sync + 'static) {
        self.observers.push(Arc::new(observer));
    }

    pub fn services_mut(&mut self) -> &mut TypedRegistry {
        &mut self.services
    }

    pub fn service<T: Send + Sync + 'static>(&self, key: ServiceKey<T>) -> Option<&T> {
        self.services.get(key)
    }

    /// Run `tx` through the middleware chain and install the result (§5:
    /// "1. A command is called. 2. Middleware chain runs to completion. 3.
    /// The new state is installed. 4. Observers are notified synchronously
    /// in registration order.").
    ///
    /// A dispatch invoked while one is already in flight (e.g. from inside
    /// an observer) is buffered and drained once the current dispatch
    /// finishes, rather than re-entering the apply path (§5).
    pub fn dispatch(&mut self, tx: Transaction) -> CoreResult<()> {
        if self.applying {
            self.pending.push_back(tx);
            return Ok(());
        }
        self.applying = true;
        let result = self.run_one(tx);
        self.applying = false;

        // Errors from one buffered transaction don't stop the rest; a
        // plugin's observer has no way to retry a dropped one anyway, and
        // §5 treats each dispatch as an independent state transition.
        while let Some(next) = self.pending.pop_front() {
            self.applying = true;
            let _ = self.run_one(next);
            self.applying = false;
        }
        result
    }

    fn run_one(&mut self, tx: Transaction) -> CoreResult<()> {
        let old_state = self.state.clone();
        let chain = self.middleware.clone();
        let base_state = old_state.clone();
        let new_state = run_chain(&chain, 0, tx.clone(), &base_state)?;
        self.state = new_state.clone();
        for observer in self.observers.clone() {
            // §5: observer panics must not take down the host; §4.11 lists
            // observation as best-effort side effects (announcements,
            // telemetry).
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                observer(&old_state, &new_state, &tx);
            }));
            if result.is_err() {
                error!("onStateChange observer panicked");
            }
        }
        Ok(())
    }
}

fn run_chain(chain: &[Arc<MiddlewareFn>], index: usize, tx: Transaction, state: &EditorState) -> CoreResult<EditorState> {
    match chain.get(index) {
        Some(middleware) => {
            let mut next = |tx: Transaction| run_chain(chain, index + 1, tx, state);
            middleware(tx, state, &mut next)
        }
        None => state.apply(tx),
    }
}

/// A middleware vetoed the transaction by never calling `next` — not
/// itself an error, but [`PluginHost::dispatch`] needs a `CoreResult` to
/// thread through `run_chain`. Middleware that wants to veto should return
/// this rather than applying an empty transaction, so observers correctly
/// see no state change at all.
pub fn vetoed() -> CoreError {
    CoreError::invalid_selection("transaction vetoed by middleware")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::attrs::AttrMap;
    use crate::dom::document::Document;
    use crate::dom::mark::MarkSet;
    use crate::dom::node::{BlockNode, InlineChild, TextNode};
    use crate::dom::path::BlockPos;
    use crate::ids::BlockId;
    use crate::schema::SchemaRegistry;
    use crate::selection::Selection;
    use crate::transaction::TransactionBuilder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn para(id: u64, text: &str) -> BlockNode {
        BlockNode::new_leaf(BlockId::from_raw(id), "paragraph", AttrMap::new(), vec![InlineChild::Text(TextNode::plain(text))])
    }

    fn host() -> PluginHost {
        let doc = Document::new(vec![para(1, "ab")]);
        let sel = Selection::collapsed(BlockPos::new(BlockId::from_raw(1), 2));
        let schema = Arc::new(SchemaRegistry::new());
        PluginHost::new(EditorState::new(doc, sel, schema))
    }

    fn insert_tx(host: &PluginHost, text: &str) -> Transaction {
        let doc = host.state().doc();
        let schema = host.state().schema();
        let mut builder = TransactionBuilder::new(doc, schema, "test");
        builder.insert_text(BlockId::from_raw(1), 2, text, MarkSet::new()).unwrap();
        builder.build()
    }

    /// A `tracing` subscriber so `error!("onStateChange observer panicked")`
    /// below is visible in `cargo test -- --nocapture` output instead of
    /// silently going nowhere.
    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    #[test]
    fn observer_panic_is_caught_and_logged_without_poisoning_dispatch() {
        init_tracing();
        let mut h = host();
        h.on_state_change(|_old, _new, _tx| panic!("observer exploded"));
        let tx = insert_tx(&h, "c");
        h.dispatch(tx).expect("a panicking observer must not fail dispatch itself");
        assert_eq!(h.state().block(BlockId::from_raw(1)).unwrap().text_len(), 3);
    }

    #[test]
    fn dispatch_installs_new_state_and_notifies_observers_in_order() {
        let mut h = host();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let order_a = order.clone();
        let order_b = order.clone();
        h.on_state_change(move |_old, _new, _tx| order_a.lock().unwrap().push("a"));
        h.on_state_change(move |_old, _new, _tx| order_b.lock().unwrap().push("b"));
        let tx = insert_tx(&h, "c");
        h.dispatch(tx).unwrap();
        assert_eq!(h.state().block(BlockId::from_raw(1)).unwrap().text_len(), 3);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn middleware_can_veto_by_not_calling_next() {
        let mut h = host();
        h.use_middleware(|_tx, state, _next| Err(vetoed_for(state)));
        let tx = insert_tx(&h, "c");
        assert!(h.dispatch(tx).is_err());
        assert_eq!(h.state().block(BlockId::from_raw(1)).unwrap().text_len(), 2);
    }

    fn vetoed_for(_state: &EditorState) -> CoreError {
        vetoed()
    }

    #[test]
    fn middleware_runs_in_registration_order_and_can_transform() {
        let mut h = host();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_a = seen.clone();
        h.use_middleware(move |tx, state, next| {
            assert_eq!(seen_a.fetch_add(1, Ordering::SeqCst), 0);
            next(tx).and_then(|s| {
                let _ = state;
                Ok(s)
            })
        });
        let tx = insert_tx(&h, "c");
        h.dispatch(tx).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dispatch_issued_while_already_applying_is_buffered_not_reentered() {
        // §5: "re-entrant dispatches must be queued". A host already mid-
        // dispatch (simulated here directly, since an observer only ever
        // sees state snapshots and has no handle to re-enter through) must
        // queue rather than run a nested dispatch immediately.
        let mut h = host();
        h.applying = true;
        let tx = insert_tx(&h, "c");
        h.dispatch(tx).unwrap();
        assert_eq!(h.pending.len(), 1);
        assert_eq!(h.state().block(BlockId::from_raw(1)).unwrap().text_len(), 2);
    }

    #[test]
    fn registered_command_runs_and_dispatches() {
        let mut h = host();
        h.register_command("insert_c", |state| {
            let doc = state.doc();
            let schema = state.schema();
            let mut builder = TransactionBuilder::new(doc, schema, "command");
            builder.insert_text(BlockId::from_raw(1), 2, "c", MarkSet::new()).ok()?;
            Some(builder.build())
        });
        let ran = h.run_command("insert_c").unwrap();
        assert!(ran);
        assert_eq!(h.state().block(BlockId::from_raw(1)).unwrap().text_len(), 3);
    }

    #[test]
    fn service_registry_round_trips_by_typed_key() {
        const KEY: ServiceKey<String> = ServiceKey::new("upload-service");
        let mut h = host();
        h.services_mut().insert(KEY, "uploader".to_string());
        assert_eq!(h.service(KEY), Some(&"uploader".to_string()));
    }
}
