//! Shared fixtures for engine integration tests

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use conifer_core::model::{DataNode, InstanceId, QName};
use conifer_core::schema::{SchemaContext, SchemaNode, StaticSchemaProvider};
use conifer_engine::{FileService, RpcRequest, Session};
use conifer_store::{InMemoryDataStore, LockManager};

pub fn q(local: &str) -> QName {
    QName::new("test", local)
}

/// The schema every engine test runs against:
///
/// ```text
/// top {
///   hostname (leaf)
///   users { user[name] { name; type } }
///   server { address (mandatory leaf); port }
///   transport (choice) { tcp (case) { tcp-port }; tls (case) { tls-port } }
/// }
/// ```
pub fn demo_schema() -> SchemaContext {
    let users = SchemaNode::container(q("users")).with_child(
        SchemaNode::list(q("user"), vec![q("name")])
            .with_child(SchemaNode::leaf(q("name")))
            .with_child(SchemaNode::leaf(q("type"))),
    );
    let server = SchemaNode::container(q("server"))
        .with_child(SchemaNode::leaf(q("address")).mandatory())
        .with_child(SchemaNode::leaf(q("port")));
    let transport = SchemaNode::choice(q("transport"))
        .with_child(SchemaNode::case(q("tcp")).with_child(SchemaNode::leaf(q("tcp-port"))))
        .with_child(SchemaNode::case(q("tls")).with_child(SchemaNode::leaf(q("tls-port"))));
    let top = SchemaNode::container(q("top"))
        .with_child(SchemaNode::leaf(q("hostname")))
        .with_child(users)
        .with_child(server)
        .with_child(transport);
    SchemaContext::new(vec![top])
}

/// Shared services plus a session factory
pub struct TestBed {
    pub store: Arc<InMemoryDataStore>,
    pub locks: Arc<LockManager>,
    pub schema: Arc<StaticSchemaProvider>,
    pub files: Arc<FileService>,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_files(FileService::deny_all())
    }

    pub fn with_files(files: FileService) -> Self {
        Self {
            store: Arc::new(InMemoryDataStore::new()),
            locks: Arc::new(LockManager::new()),
            schema: Arc::new(StaticSchemaProvider::new(demo_schema())),
            files: Arc::new(files),
        }
    }

    pub fn session(&self) -> Session {
        Session::new(
            self.store.clone(),
            Arc::clone(&self.locks),
            self.schema.clone(),
            Arc::clone(&self.files),
        )
    }
}

// ========== Request builders ==========

/// An element with children, unqualified (rpc-layer grammar)
pub fn elem(name: &str, children: Vec<DataNode>) -> DataNode {
    let mut node = DataNode::container(QName::unqualified(name));
    for child in children {
        node.push_child(child);
    }
    node
}

/// An unqualified leaf element (rpc-layer grammar)
pub fn leaf_elem(name: &str, value: &str) -> DataNode {
    DataNode::leaf(QName::unqualified(name), value)
}

/// `<target><candidate/></target>`-style datastore clause
pub fn datastore_clause(clause: &str, datastore: &str) -> DataNode {
    elem(clause, vec![elem(datastore, Vec::new())])
}

pub fn keyed(name: &str) -> BTreeMap<QName, String> {
    let mut keys = BTreeMap::new();
    keys.insert(q("name"), name.to_string());
    keys
}

pub fn user_entry(name: &str) -> DataNode {
    DataNode::list_entry(q("user"), keyed(name))
}

/// Payload used across the end-to-end scenarios:
/// `<top><hostname>rt1</hostname><users><user>fred</user></users></top>`
pub fn demo_payload() -> DataNode {
    let mut user_list = DataNode::list(q("user"));
    user_list.entries_mut().unwrap().push(user_entry("fred"));
    let mut users = DataNode::container(q("users"));
    users.push_child(user_list);
    let mut top = DataNode::container(q("top"));
    top.push_child(DataNode::leaf(q("hostname"), "rt1"));
    top.push_child(users);
    top
}

/// An edit-config request with the given target and payload children
pub fn edit_config_request(target: &str, payload: Vec<DataNode>) -> RpcRequest {
    RpcRequest::new(
        "edit-config",
        elem(
            "edit-config",
            vec![
                datastore_clause("target", target),
                elem("config", payload),
            ],
        ),
    )
}

/// A get-config request with the given source and optional filter content
pub fn get_config_request(source: &str, filter: Option<Vec<DataNode>>) -> RpcRequest {
    let mut children = vec![datastore_clause("source", source)];
    if let Some(filter_children) = filter {
        children.push(elem("filter", filter_children));
    }
    RpcRequest::new("get-config", elem("get-config", children))
}

/// Paths used throughout the suites
pub fn hostname_path() -> InstanceId {
    InstanceId::of_nodes(vec![q("top"), q("hostname")])
}

pub fn user_list_path() -> InstanceId {
    InstanceId::of_nodes(vec![q("top"), q("users"), q("user")])
}
