//! Move-only owning handle for tracked allocations
//!
//! A [`Handle`] is the unit of ownership the registry takes over. It owns one
//! heap value; dropping the handle frees it. Registering consumes the handle,
//! so once an allocation is tracked nothing but the registry can free it.

use core::any::{Any, type_name};
use core::fmt;

/// Owning handle to a heap block of arbitrary `Send` type
///
/// # Examples
///
/// ```
/// use nebula_reclaim::Handle;
///
/// let handle = Handle::new(vec![0u8; 64]);
/// assert!(handle.is::<Vec<u8>>());
///
/// let buffer: Box<Vec<u8>> = handle.downcast().unwrap();
/// assert_eq!(buffer.len(), 64);
/// ```
pub struct Handle {
    value: Box<dyn Any + Send>,
    type_name: &'static str,
    size: usize,
}

impl Handle {
    /// Moves `value` to the heap and takes ownership of it.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self::from_box(Box::new(value))
    }

    /// Takes ownership of an existing heap allocation.
    pub fn from_box<T: Any + Send>(value: Box<T>) -> Self {
        let size = size_of_val(&*value);
        Self {
            value,
            type_name: type_name::<T>(),
            size,
        }
    }

    /// Shallow size of the owned value in bytes.
    ///
    /// Heap memory the value itself points to (a `Vec` buffer, say) is not
    /// included.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Recovers the typed box, or hands the handle back on type mismatch.
    pub fn downcast<T: Any>(self) -> Result<Box<T>, Self> {
        let Self {
            value,
            type_name,
            size,
        } = self;

        value.downcast::<T>().map_err(|value| Self {
            value,
            type_name,
            size,
        })
    }
}

impl<T: Any + Send> From<Box<T>> for Handle {
    fn from(value: Box<T>) -> Self {
        Self::from_box(value)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("type_name", &self.type_name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    struct DropCounter(Arc<AtomicUsize>);

    impl Drop for DropCounter {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dropping_handle_frees_value() {
        let drops = Arc::new(AtomicUsize::new(0));
        let handle = Handle::new(DropCounter(Arc::clone(&drops)));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(handle);
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn records_shallow_size_and_type() {
        let handle = Handle::new([0u64; 4]);
        assert_eq!(handle.size(), 32);
        assert!(handle.type_name().contains("u64"));
    }

    #[test]
    fn downcast_mismatch_returns_handle() {
        let handle = Handle::from(Box::new(String::from("kept")));

        let handle = handle.downcast::<u32>().unwrap_err();
        assert!(handle.is::<String>());
        assert_eq!(handle.downcast_ref::<String>().map(String::as_str), Some("kept"));
    }

    #[test]
    fn downcast_mut_edits_in_place() {
        let mut handle = Handle::new(1_u32);
        *handle.downcast_mut::<u32>().unwrap() += 1;
        assert_eq!(*handle.downcast::<u32>().unwrap(), 2);
    }
}
