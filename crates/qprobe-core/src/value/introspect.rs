//! Contrato mínimo que el motor exige a un valor externo opaco.
//!
//! El prober nunca asume un contrato concreto: sólo consulta presencia de
//! miembros, si son invocables, e invoca con argumentos posicionales/keywords
//! aceptando que la llamada falle con un `Fault` arbitrario.

use std::any::Any;
use std::rc::Rc;

use serde_json::Value;

use super::{CallArgs, Fault, ProbeValue};

/// Referencia compartida a un objeto introspectable. El motor es
/// single-threaded, por eso `Rc` y no `Arc`.
pub type ObjectRef = Rc<dyn Introspect>;

pub trait Introspect {
    /// Nombre del tipo en el runtime externo (`Circuit`, `SLOSBackend`, ...).
    fn type_name(&self) -> String;

    /// ¿Expone el miembro `name`?
    fn has_member(&self, name: &str) -> bool;

    /// ¿El miembro `name` existe y es invocable?
    fn is_callable(&self, name: &str) -> bool;

    /// Miembros públicos enumerables.
    fn members(&self) -> Vec<String>;

    /// Lee un atributo sin invocarlo.
    fn get_member(&self, name: &str) -> Result<ProbeValue, Fault>;

    /// Invoca el miembro `name` con `args`.
    fn invoke(&self, name: &str, args: &CallArgs) -> Result<ProbeValue, Fault>;

    /// Invoca el propio objeto (una clase, una función).
    fn call(&self, _args: &CallArgs) -> Result<ProbeValue, Fault> {
        Err(Fault::not_callable(&self.type_name()))
    }

    /// Vista de datos planos, si el objeto es convertible (dict, list, número...).
    fn to_data(&self) -> Option<Value> {
        None
    }

    /// Elementos del objeto si es iterable, como mucho `limit`.
    fn iterate(&self, _limit: usize) -> Option<Vec<ProbeValue>> {
        None
    }

    /// Representación textual para humanos (`str()` en Python).
    fn repr(&self) -> String {
        format!("<{}>", self.type_name())
    }

    fn as_any(&self) -> &dyn Any;
}
