use std::fmt;

use crate::allocator::{Allocator, HeapAllocator};
use crate::scalar::Scalar;
use crate::uint128::Uint128;
use crate::vector::{RecordVector, RecordVectorMut, Vector, VectorMut};

/// Base storage object wrapped by every generated table type.
///
/// A record owns a boxed [`Allocator`] holding its binary image and an
/// optional change hook. Setters in generated code call
/// [`notify_changing`](Record::notify_changing) before each mutation; the
/// hook is the only extension point and runs synchronously on the mutating
/// thread. Records are not internally synchronized.
pub struct Record {
    allocator: Box<dyn Allocator>,
    hook: Option<Box<dyn FnMut()>>,
}

impl Record {
    /// Heap-backed record sized to (static size, dynamic count).
    pub fn new(static_size: usize, dynamic_count: usize) -> Self {
        Record::with_allocator(Box::new(HeapAllocator::new(static_size, dynamic_count)))
    }

    /// Wrap existing storage, e.g. a sub-allocator view.
    pub fn with_allocator(allocator: Box<dyn Allocator>) -> Self {
        Record { allocator, hook: None }
    }

    pub fn static_size(&self) -> usize {
        self.allocator.static_size()
    }

    pub fn dynamic_count(&self) -> usize {
        self.allocator.dynamic_count()
    }

    /// Total image length, including the dynamic payload region.
    pub fn len(&self) -> usize {
        self.allocator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allocator.is_empty()
    }

    /// Install the dirty-notification hook. Replaces any previous hook.
    pub fn set_change_hook(&mut self, hook: impl FnMut() + 'static) {
        self.hook = Some(Box::new(hook));
    }

    pub fn clear_change_hook(&mut self) {
        self.hook = None;
    }

    /// Invoke the change hook, if any. Called by generated setters before
    /// storage is touched.
    pub fn notify_changing(&mut self) {
        if let Some(hook) = self.hook.as_mut() {
            hook();
        }
    }

    /// Read a fixed-width value at a byte offset.
    pub fn get<T: Scalar>(&self, offset: usize) -> T {
        let mut buf = [0u8; 16];
        self.allocator.read_bytes(offset, &mut buf[..T::SIZE]);
        T::read_from(&buf[..T::SIZE])
    }

    /// Write a fixed-width value at a byte offset. Does not notify; callers
    /// notify first.
    pub fn set<T: Scalar>(&mut self, offset: usize, value: T) {
        let mut buf = [0u8; 16];
        value.write_to(&mut buf[..T::SIZE]);
        self.allocator.write_bytes(offset, &buf[..T::SIZE]);
    }

    /// Read `count` contiguous values starting at a byte offset.
    pub fn get_array<T: Scalar>(&self, offset: usize, count: usize) -> Vec<T> {
        let mut raw = vec![0u8; count * T::SIZE];
        self.allocator.read_bytes(offset, &mut raw);
        raw.chunks_exact(T::SIZE).map(T::read_from).collect()
    }

    /// Write all of `values` contiguously starting at a byte offset.
    pub fn set_array<T: Scalar>(&mut self, offset: usize, values: &[T]) {
        let mut raw = vec![0u8; values.len() * T::SIZE];
        for (value, chunk) in values.iter().zip(raw.chunks_exact_mut(T::SIZE)) {
            value.write_to(chunk);
        }
        self.allocator.write_bytes(offset, &raw);
    }

    /// Copy a variable collection into a bounded array region of `bound`
    /// elements. A source longer than the bound writes nothing at all.
    pub fn set_bounded<T: Scalar>(&mut self, offset: usize, bound: usize, values: &[T]) {
        if values.len() <= bound {
            self.set_array(offset, values);
        }
    }

    /// Byte-level variant of [`set_bounded`](Record::set_bounded) for string
    /// writes into bounded regions.
    pub fn set_bounded_bytes(&mut self, offset: usize, bound: usize, bytes: &[u8]) {
        if bytes.len() <= bound {
            self.allocator.write_bytes(offset, bytes);
        }
    }

    pub fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        self.allocator.read_bytes(offset, out);
    }

    pub fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.allocator.write_bytes(offset, data);
    }

    pub fn dynamic_len(&self, index: usize) -> usize {
        self.allocator.dynamic_len(index)
    }

    /// Copy of a dynamic slot's payload.
    pub fn dynamic_payload(&self, index: usize) -> Vec<u8> {
        let mut out = vec![0u8; self.allocator.dynamic_len(index)];
        self.allocator.read_dynamic(index, 0, &mut out);
        out
    }

    /// Replace a dynamic slot's payload.
    pub fn set_dynamic(&mut self, index: usize, payload: &[u8]) {
        self.allocator.update_dynamic(index, payload);
    }

    /// Replace a dynamic slot from a scalar slice.
    pub fn set_dynamic_scalars<T: Scalar>(&mut self, index: usize, values: &[T]) {
        let mut raw = vec![0u8; values.len() * T::SIZE];
        for (value, chunk) in values.iter().zip(raw.chunks_exact_mut(T::SIZE)) {
            value.write_to(chunk);
        }
        self.allocator.update_dynamic(index, &raw);
    }

    /// Read-only typed view over a dynamic slot.
    pub fn vector<T: Scalar>(&self, index: usize) -> Vector<'_, T> {
        Vector::new(self.allocator.as_ref(), index)
    }

    /// Read-write typed view over a dynamic slot.
    pub fn vector_mut<T: Scalar>(&mut self, index: usize) -> VectorMut<'_, T> {
        VectorMut::new(self.allocator.as_mut(), index)
    }

    /// Read-only view over a dynamic slot holding fixed-size record images.
    pub fn record_vector(&self, index: usize, elem_size: usize) -> RecordVector<'_> {
        RecordVector::new(self.allocator.as_ref(), index, elem_size)
    }

    /// Read-write view over a dynamic slot holding fixed-size record images.
    pub fn record_vector_mut(&mut self, index: usize, elem_size: usize) -> RecordVectorMut<'_> {
        RecordVectorMut::new(self.allocator.as_mut(), index, elem_size)
    }

    /// Live view of `size` bytes at `offset` as an independent record.
    /// Writes through the view land in this record's storage.
    pub fn sub_record(&self, offset: usize, size: usize) -> Record {
        Record::with_allocator(self.allocator.sub_allocator(offset, size))
    }

    /// Standalone heap-backed copy of this record's image.
    pub fn detach(&self) -> Record {
        let image = self.allocator.snapshot();
        Record::with_allocator(Box::new(HeapAllocator::from_bytes(
            self.allocator.static_size(),
            self.allocator.dynamic_count(),
            image,
        )))
    }

    /// Copy of the full binary image.
    pub fn snapshot(&self) -> Vec<u8> {
        self.allocator.snapshot()
    }

    /// Structural copy: replace this record's image with another's. The two
    /// records must share a layout; generated code guarantees this by
    /// checking identities first where the source type is not known
    /// statically.
    pub fn copy_from(&mut self, other: &Record) {
        self.allocator.restore(&other.snapshot());
    }

    pub fn allocator(&self) -> &dyn Allocator {
        self.allocator.as_ref()
    }

    pub fn allocator_mut(&mut self) -> &mut dyn Allocator {
        self.allocator.as_mut()
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("static_size", &self.static_size())
            .field("dynamic_count", &self.dynamic_count())
            .field("len", &self.len())
            .finish()
    }
}

/// Implemented by every generated table type; the contract generic
/// reflection and conversion code works against.
pub trait TypedRecord {
    /// The 128-bit identity of the value's schema.
    fn type_identity(&self) -> Uint128;

    fn record(&self) -> &Record;

    fn record_mut(&mut self) -> &mut Record;
}
