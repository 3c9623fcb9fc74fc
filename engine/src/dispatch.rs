// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! Action registration and dispatch.
//!
//! Every request goes through [`Engine::dispatch`]: the `Action` name is
//! looked up in the [`ActionRegistry`] and the handler runs to completion
//! against the store while the store lock is held.
//!
//! | Kind | Execution |
//! |------|-----------|
//! | [`ActionKind::Read`] | handler runs directly |
//! | [`ActionKind::Mutate`] | handler runs inside [`ResourceStore::atomically`]; a failure rolls the store back |
//!
//! A mutating request with `DryRun=true` still runs its handler, so
//! validation errors are reported first, then the changes are rolled back
//! and `DryRunOperation` is returned.
//!
//! A mutation that finishes after its deadline is rolled back and reported
//! as `RequestExpired`, so a request the server already gave up on never
//! changes the store.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use serde_json::{Map, Value};

use crate::error::{Ec2Error, Result};
use crate::models::Settings;
use crate::params::QueryParams;
use crate::store::{ResourceStore, panic_message};
use crate::xml;

pub type ResponseBody = Map<String, Value>;

pub type Handler = fn(&mut RequestContext<'_>) -> Result<ResponseBody>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Read,
    Mutate,
}

/// What a handler gets to work with for one request.
pub struct RequestContext<'a> {
    pub params: &'a QueryParams,
    pub store: &'a mut ResourceStore,
    pub settings: &'a Settings,
}

#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, (ActionKind, Handler)>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` under `action`, replacing any earlier registration.
    pub fn register(&mut self, action: &str, kind: ActionKind, handler: Handler) -> &mut Self {
        if self
            .actions
            .insert(action.to_string(), (kind, handler))
            .is_some()
        {
            tracing::warn!("[engine] action {} registered twice", action);
        }
        self
    }

    pub fn get(&self, action: &str) -> Option<(ActionKind, Handler)> {
        self.actions.get(action).copied()
    }

    pub fn contains(&self, action: &str) -> bool {
        self.actions.contains_key(action)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }
}

/// The request/response engine: registry, store and settings of one emulator.
pub struct Engine {
    registry: ActionRegistry,
    store: Mutex<ResourceStore>,
    settings: Settings,
}

impl Engine {
    pub fn new(registry: ActionRegistry, store: ResourceStore, settings: Settings) -> Self {
        tracing::info!("[engine] {} actions registered", registry.len());
        Self {
            registry,
            store: Mutex::new(store),
            settings,
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    fn lock(&self) -> MutexGuard<'_, ResourceStore> {
        // handlers run under catch_unwind, a poisoned lock still holds a consistent store
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read access to the store, mainly for tests and diagnostics.
    pub fn with_store<T>(&self, f: impl FnOnce(&ResourceStore) -> T) -> T {
        f(&self.lock())
    }

    /// Empties the store between test runs.
    pub fn reset(&self) {
        self.lock().clear();
        tracing::info!("[engine] store reset");
    }

    pub fn dispatch(&self, action: &str, params: &QueryParams) -> Result<ResponseBody> {
        self.dispatch_until(action, params, None)
    }

    /// Like [`Engine::dispatch`], but a mutation still running at `deadline`
    /// is rolled back instead of committed.
    #[tracing::instrument(skip(self, params))]
    pub fn dispatch_until(
        &self,
        action: &str,
        params: &QueryParams,
        deadline: Option<Instant>,
    ) -> Result<ResponseBody> {
        let Some((kind, handler)) = self.registry.get(action) else {
            tracing::warn!("[engine] rejected unknown action {}", action);
            return Err(Ec2Error::InvalidAction(action.to_string()));
        };

        let mut store = self.lock();
        let settings = &self.settings;

        let result = match kind {
            ActionKind::Read => {
                let mut ctx = RequestContext {
                    params,
                    store: &mut store,
                    settings,
                };
                catch_unwind(AssertUnwindSafe(|| handler(&mut ctx))).unwrap_or_else(|panic| {
                    Err(Ec2Error::InternalError(panic_message(panic.as_ref())))
                })
            }
            ActionKind::Mutate => {
                let dry_run = params.dry_run();
                store.atomically(|store| {
                    let mut ctx = RequestContext {
                        params,
                        store,
                        settings,
                    };
                    let body = handler(&mut ctx)?;
                    if dry_run {
                        return Err(Ec2Error::DryRunOperation);
                    }
                    if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                        return Err(Ec2Error::RequestExpired);
                    }
                    Ok(body)
                })
            }
        };

        match &result {
            Ok(_) => tracing::debug!("[engine] dispatched {}", action),
            Err(Ec2Error::InternalError(message)) => {
                tracing::error!("[engine] {} failed: {}", action, message)
            }
            Err(err) => tracing::debug!("[engine] {} rejected: {}", action, err.code()),
        }

        result
    }

    /// Dispatches the request's `Action` and renders the XML response.
    pub fn handle(&self, params: &QueryParams, request_id: &str) -> Result<String> {
        self.handle_until(params, request_id, None)
    }

    /// [`Engine::handle`] with a commit deadline, see [`Engine::dispatch_until`].
    pub fn handle_until(
        &self,
        params: &QueryParams,
        request_id: &str,
        deadline: Option<Instant>,
    ) -> Result<String> {
        let action = params.action()?;
        let body = self.dispatch_until(action, params, deadline)?;
        Ok(xml::serialize_response(action, &body, request_id))
    }
}
