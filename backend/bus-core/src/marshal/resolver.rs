use crate::error::MarshalError;

use models::ObjectRef;

/// Seam between marshalling and the connection's object registry.
///
/// Outbound, a live object becomes the path it is exported under. Inbound, a
/// path received from `source` becomes a reference (a local object or a remote
/// proxy) implementing `interface`.
pub trait ObjectResolver {
    fn export_path(&self, object: &ObjectRef) -> Result<String, MarshalError>;

    fn import_object(
        &self,
        source: Option<&str>,
        path: &str,
        interface: &str,
    ) -> Result<ObjectRef, MarshalError>;
}

/// Resolver that takes object references at face value.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathResolver;

impl ObjectResolver for PathResolver {
    fn export_path(&self, object: &ObjectRef) -> Result<String, MarshalError> {
        if !object.path.starts_with('/') {
            return Err(MarshalError::resolver(format!(
                "Object {} is not exported under an absolute path: '{}'",
                object.interface, object.path
            )));
        }
        Ok(object.path.clone())
    }

    fn import_object(
        &self,
        source: Option<&str>,
        path: &str,
        interface: &str,
    ) -> Result<ObjectRef, MarshalError> {
        Ok(ObjectRef {
            interface: interface.to_string(),
            path: path.to_string(),
            source: source.map(str::to_string),
        })
    }
}
