use std::rc::Rc;

use crate::map::OrderedMap;

use super::{Type, Value};

/// Object fields in insertion order.
pub type Fields = OrderedMap<Rc<str>, Value>;

/// A plain object, or a class instance when `class` is set.
#[derive(Clone, Default)]
pub struct Object {
    pub fields: Fields,
    pub class: Option<Rc<Type>>,
}

impl Object {
    pub fn plain(fields: Fields) -> Self {
        Object {
            fields,
            class: None,
        }
    }

    pub fn instance(class: Rc<Type>) -> Self {
        Object {
            fields: Fields::new(),
            class: Some(class),
        }
    }

    pub fn is_instance(&self) -> bool {
        self.class.is_some()
    }
}
