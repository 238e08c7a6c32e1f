pub mod audit;
pub mod auth;
pub mod crm;
pub mod inventory;

use serde_json::Value;

/// O id vive fora do corpo do documento; na hora de gravar, removemos o campo
/// `id` que o serde serializa junto com o resto do modelo.
pub(crate) fn strip_id(mut value: Value) -> Value {
    if let Some(map) = value.as_object_mut() {
        map.remove("id");
    }
    value
}
