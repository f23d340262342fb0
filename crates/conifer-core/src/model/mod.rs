//! Tree data model: qualified names, instance identifiers, data nodes

pub mod node;
pub mod path;
pub mod qname;

pub use node::DataNode;
pub use path::{InstanceId, PathArgument};
pub use qname::QName;
