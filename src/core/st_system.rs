use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded shared handle to a system.
///
/// Clones share the same boxed value. The renderer, the camera and the face buffer all
/// hold clones of the device, queue and buffer registry handles.
///
/// # Examples
///
/// ```ignore
/// let buffer_state = StSystem::new(Box::new(BufferState::new(device.clone(), queue.clone())));
/// let camera_state = CameraState::new(buffer_state.clone(), &projection, &config);
/// buffer_state.get().get_total_used_memory();
/// ```
///
/// # Panics
/// `get` panics while a `get_mut` guard is alive and vice versa.
pub struct StSystem<T: ?Sized> {
    system: Rc<RefCell<Box<T>>>,
}

impl<T: ?Sized> StSystem<T> {
    /// Wraps a boxed system in a new shared handle.
    pub fn new(system: Box<T>) -> Self {
        Self {
            system: Rc::new(RefCell::new(system)),
        }
    }

    /// Borrows the system immutably.
    pub fn get(&self) -> Ref<'_, Box<T>> {
        self.system.borrow()
    }

    /// Borrows the system mutably.
    pub fn get_mut(&self) -> RefMut<'_, Box<T>> {
        self.system.borrow_mut()
    }
}

impl<T: ?Sized> Clone for StSystem<T> {
    fn clone(&self) -> Self {
        Self {
            system: self.system.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_system() {
        let system = StSystem::new(Box::new(vec![1u32]));
        let clone = system.clone();
        clone.get_mut().push(2);
        assert_eq!(**system.get(), vec![1, 2]);
    }

    #[test]
    #[should_panic]
    fn mutable_borrow_excludes_shared_borrow() {
        let system = StSystem::new(Box::new(0u32));
        let _guard = system.get_mut();
        let _ = system.get();
    }
}
