//! Single-threaded shared mutable storage for runtime values.

use std::cell::{BorrowError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

/// `Rc<RefCell<T>>` behind one constructor.
///
/// Arrays and objects are `Heap` values: cloning a [`Value`](crate::Value) that holds
/// one aliases the same storage, which is what script-level reference semantics need.
#[repr(transparent)]
pub struct Heap<T>(Rc<RefCell<T>>);

impl<T> Heap<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Heap(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn try_borrow(&self) -> Result<Ref<'_, T>, BorrowError> {
        self.0.try_borrow()
    }

    /// Number of handles to the storage.
    pub fn strong_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }

    /// Whether both handles point at the same storage.
    #[inline]
    pub fn ptr_eq(&self, other: &Heap<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the storage, stable while any handle is alive.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn downgrade(&self) -> WeakHeap<T> {
        WeakHeap(Rc::downgrade(&self.0))
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Heap").field(&self.0).finish()
    }
}

/// Non-owning handle to a [`Heap`].
pub struct WeakHeap<T>(Weak<RefCell<T>>);

impl<T> WeakHeap<T> {
    pub fn upgrade(&self) -> Option<Heap<T>> {
        self.0.upgrade().map(Heap)
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }
}

impl<T> Clone for WeakHeap<T> {
    fn clone(&self) -> Self {
        WeakHeap(Weak::clone(&self.0))
    }
}
