// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: MIT-0

//! In-memory resource store.
//!
//! The store maps a resource type (`vpcs`, `vpn_connections`, ...) to the
//! records of that type, keyed and ordered by id. Parent/child relations such
//! as "the endpoints of a VPC" are kept in a separate reference table.
//!
//! The store itself enforces nothing beyond the shape of the maps. Handlers
//! are responsible for id uniqueness and for keeping references in step with
//! the records; [`ResourceStore::atomically`] lets a handler perform a multi
//! step mutation that is undone as a whole when any step fails.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde_json::{Map, Value, json};

use crate::constants::{CROSS_CUTTING_COLLECTIONS, RESOURCES_COLLECTION};
use crate::error::{Ec2Error, Result};
use crate::filters::{Filterable, values_at_path};
use crate::models::Tag;

/// One emulated resource: its id, AWS-named attributes and tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub attributes: Map<String, Value>,
    pub tags: Vec<Tag>,
}

impl Record {
    pub fn new(id: impl Into<String>, attributes: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            attributes,
            tags: Vec::new(),
        }
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.attributes.get(attribute)
    }

    pub fn get_str(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).and_then(Value::as_str)
    }

    pub fn set(&mut self, attribute: &str, value: impl Into<Value>) {
        self.attributes.insert(attribute.to_string(), value.into());
    }

    /// Inserts or overwrites tags by key.
    pub fn put_tags(&mut self, tags: &[Tag]) {
        for tag in tags {
            match self.tags.iter_mut().find(|t| t.key == tag.key) {
                Some(existing) => existing.value = tag.value.clone(),
                None => self.tags.push(tag.clone()),
            }
        }
    }

    /// Removes tags with `key`; when `value` is given only a matching value is removed.
    pub fn remove_tag(&mut self, key: &str, value: Option<&str>) {
        self.tags
            .retain(|t| !(t.key == key && value.is_none_or(|v| v == t.value)));
    }

    /// Plain mapping used by the XML serializer.
    pub fn to_value(&self) -> Value {
        let mut projection = self.attributes.clone();
        if !self.tags.is_empty() {
            let tags: Vec<Value> = self
                .tags
                .iter()
                .map(|t| json!({"key": t.key, "value": t.value}))
                .collect();
            projection.insert("tagSet".to_string(), Value::Array(tags));
        }
        Value::Object(projection)
    }
}

impl Filterable for Record {
    fn tags(&self) -> &[Tag] {
        &self.tags
    }

    fn field_values(&self, path: &str) -> Vec<String> {
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        match self.attributes.get(head) {
            Some(value) => values_at_path(value, rest),
            None => Vec::new(),
        }
    }
}

/// Identifies one reference list: `(parent type, parent id, relation)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ReferenceKey {
    parent_type: String,
    parent_id: String,
    relation: String,
}

impl ReferenceKey {
    fn new(parent_type: &str, parent_id: &str, relation: &str) -> Self {
        Self {
            parent_type: parent_type.to_string(),
            parent_id: parent_id.to_string(),
            relation: relation.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceStore {
    collections: BTreeMap<String, BTreeMap<String, Record>>,
    references: BTreeMap<ReferenceKey, Vec<String>>,
}

impl ResourceStore {
    /// Creates empty collections for `resource_types` and the cross-cutting ones.
    pub fn init(resource_types: &[&str]) -> Self {
        let mut collections = BTreeMap::new();
        for name in CROSS_CUTTING_COLLECTIONS.iter().chain(resource_types) {
            collections.insert(name.to_string(), BTreeMap::new());
        }
        tracing::debug!("[engine] store initialized with {} collections", collections.len());
        Self {
            collections,
            references: BTreeMap::new(),
        }
    }

    /// Empties every collection and reference list, keeping the known types.
    pub fn clear(&mut self) {
        for records in self.collections.values_mut() {
            records.clear();
        }
        self.references.clear();
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    fn collection(&self, resource_type: &str) -> Result<&BTreeMap<String, Record>> {
        self.collections
            .get(resource_type)
            .ok_or_else(|| unknown_type(resource_type))
    }

    fn collection_mut(&mut self, resource_type: &str) -> Result<&mut BTreeMap<String, Record>> {
        self.collections
            .get_mut(resource_type)
            .ok_or_else(|| unknown_type(resource_type))
    }

    /// Inserts or replaces the record stored under `record.id`.
    pub fn insert(&mut self, resource_type: &str, record: Record) -> Result<()> {
        self.collection_mut(resource_type)?
            .insert(record.id.clone(), record);
        Ok(())
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Result<Option<&Record>> {
        Ok(self.collection(resource_type)?.get(id))
    }

    pub fn get_mut(&mut self, resource_type: &str, id: &str) -> Result<Option<&mut Record>> {
        Ok(self.collection_mut(resource_type)?.get_mut(id))
    }

    pub fn contains(&self, resource_type: &str, id: &str) -> Result<bool> {
        Ok(self.collection(resource_type)?.contains_key(id))
    }

    pub fn remove(&mut self, resource_type: &str, id: &str) -> Result<Option<Record>> {
        Ok(self.collection_mut(resource_type)?.remove(id))
    }

    /// Records of one type in id order.
    pub fn records(&self, resource_type: &str) -> Result<Vec<&Record>> {
        Ok(self.collection(resource_type)?.values().collect())
    }

    pub fn collection_len(&self, resource_type: &str) -> Result<usize> {
        Ok(self.collection(resource_type)?.len())
    }

    /// Indexes `id` in the `resources` collection so tag actions can find it.
    pub fn register_resource(&mut self, id: &str, resource_type: &str) -> Result<()> {
        let mut attributes = Map::new();
        attributes.insert("resourceId".to_string(), json!(id));
        attributes.insert("resourceType".to_string(), json!(resource_type));
        self.insert(RESOURCES_COLLECTION, Record::new(id, attributes))
    }

    pub fn unregister_resource(&mut self, id: &str) -> Result<()> {
        self.remove(RESOURCES_COLLECTION, id)?;
        Ok(())
    }

    /// Resource type a registered id belongs to.
    pub fn resource_type_of(&self, id: &str) -> Option<String> {
        self.collections
            .get(RESOURCES_COLLECTION)?
            .get(id)?
            .get_str("resourceType")
            .map(str::to_string)
    }

    /// Appends `child_id` to the parent's `relation` list; linking twice is a no-op.
    pub fn link(&mut self, parent_type: &str, parent_id: &str, relation: &str, child_id: &str) {
        let children = self
            .references
            .entry(ReferenceKey::new(parent_type, parent_id, relation))
            .or_default();
        if !children.iter().any(|c| c == child_id) {
            children.push(child_id.to_string());
        }
    }

    pub fn unlink(&mut self, parent_type: &str, parent_id: &str, relation: &str, child_id: &str) {
        let key = ReferenceKey::new(parent_type, parent_id, relation);
        if let Some(children) = self.references.get_mut(&key) {
            children.retain(|c| c != child_id);
            if children.is_empty() {
                self.references.remove(&key);
            }
        }
    }

    pub fn references(&self, parent_type: &str, parent_id: &str, relation: &str) -> &[String] {
        self.references
            .get(&ReferenceKey::new(parent_type, parent_id, relation))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drops every reference list owned by a parent that is being deleted.
    pub fn drop_references(&mut self, parent_type: &str, parent_id: &str) {
        self.references
            .retain(|key, _| !(key.parent_type == parent_type && key.parent_id == parent_id));
    }

    /// Runs `f` against the store; on error or panic the store is restored
    /// to its state before the call.
    pub fn atomically<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let outcome = catch_unwind(AssertUnwindSafe(|| f(self)));
        match outcome {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                *self = snapshot;
                Err(err)
            }
            Err(panic) => {
                *self = snapshot;
                Err(Ec2Error::InternalError(panic_message(panic.as_ref())))
            }
        }
    }
}

fn unknown_type(resource_type: &str) -> Ec2Error {
    tracing::error!("[engine] unknown resource type '{}'", resource_type);
    Ec2Error::InternalError(format!("unknown resource type '{resource_type}'"))
}

pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}
