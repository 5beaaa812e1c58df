use std::marker::PhantomData;

use crate::allocator::Allocator;
use crate::record::Record;
use crate::scalar::Scalar;

fn scalar_at<T: Scalar>(alloc: &dyn Allocator, index: usize, element: usize) -> Option<T> {
    let length = alloc.dynamic_len(index) / T::SIZE;
    if element >= length {
        return None;
    }
    let mut buf = [0u8; 16];
    alloc.read_dynamic(index, element * T::SIZE, &mut buf[..T::SIZE]);
    Some(T::read_from(&buf[..T::SIZE]))
}

fn scalars_to_vec<T: Scalar>(alloc: &dyn Allocator, index: usize) -> Vec<T> {
    let mut raw = vec![0u8; alloc.dynamic_len(index)];
    alloc.read_dynamic(index, 0, &mut raw);
    raw.chunks_exact(T::SIZE).map(T::read_from).collect()
}

/// Read-only typed view over one dynamic slot.
///
/// The element count is derived from the payload length on every call, so a
/// view stays accurate across mutations made through the owning record.
pub struct Vector<'a, T: Scalar> {
    alloc: &'a dyn Allocator,
    index: usize,
    marker: PhantomData<T>,
}

impl<'a, T: Scalar> Vector<'a, T> {
    pub fn new(alloc: &'a dyn Allocator, index: usize) -> Self {
        Vector { alloc, index, marker: PhantomData }
    }

    pub fn len(&self) -> usize {
        self.alloc.dynamic_len(self.index) / T::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, element: usize) -> Option<T> {
        scalar_at(self.alloc, self.index, element)
    }

    /// Materialize the payload as an owned vector.
    pub fn to_vec(&self) -> Vec<T> {
        scalars_to_vec(self.alloc, self.index)
    }
}

/// Read-write typed view over one dynamic slot.
pub struct VectorMut<'a, T: Scalar> {
    alloc: &'a mut dyn Allocator,
    index: usize,
    marker: PhantomData<T>,
}

impl<'a, T: Scalar> VectorMut<'a, T> {
    pub fn new(alloc: &'a mut dyn Allocator, index: usize) -> Self {
        VectorMut { alloc, index, marker: PhantomData }
    }

    pub fn len(&self) -> usize {
        self.alloc.dynamic_len(self.index) / T::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, element: usize) -> Option<T> {
        scalar_at(self.alloc, self.index, element)
    }

    pub fn to_vec(&self) -> Vec<T> {
        scalars_to_vec(self.alloc, self.index)
    }

    /// Overwrite one element in place. Returns false when out of range.
    pub fn set(&mut self, element: usize, value: T) -> bool {
        if element >= self.len() {
            return false;
        }
        let mut buf = [0u8; 16];
        value.write_to(&mut buf[..T::SIZE]);
        self.alloc.write_dynamic(self.index, element * T::SIZE, &buf[..T::SIZE]);
        true
    }

    /// Append one element, growing the payload.
    pub fn push(&mut self, value: T) {
        let mut raw = vec![0u8; self.alloc.dynamic_len(self.index)];
        self.alloc.read_dynamic(self.index, 0, &mut raw);
        let at = raw.len();
        raw.resize(at + T::SIZE, 0);
        value.write_to(&mut raw[at..]);
        self.alloc.update_dynamic(self.index, &raw);
    }

    /// Empty the payload.
    pub fn clear(&mut self) {
        self.alloc.update_dynamic(self.index, &[]);
    }
}

/// Read-only view over a dynamic slot holding fixed-size record images,
/// e.g. a `[Vertex]` field whose elements are embedded table sub-images.
pub struct RecordVector<'a> {
    alloc: &'a dyn Allocator,
    index: usize,
    elem_size: usize,
}

impl<'a> RecordVector<'a> {
    pub fn new(alloc: &'a dyn Allocator, index: usize, elem_size: usize) -> Self {
        RecordVector { alloc, index, elem_size }
    }

    pub fn len(&self) -> usize {
        self.alloc.dynamic_len(self.index) / self.elem_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Detached copy of one element's image.
    pub fn at(&self, element: usize) -> Option<Record> {
        if element >= self.len() {
            return None;
        }
        let mut image = vec![0u8; self.elem_size];
        self.alloc.read_dynamic(self.index, element * self.elem_size, &mut image);
        Some(Record::with_allocator(Box::new(
            crate::allocator::HeapAllocator::from_bytes(self.elem_size, 0, image),
        )))
    }
}

/// Read-write view over a dynamic slot holding fixed-size record images.
pub struct RecordVectorMut<'a> {
    alloc: &'a mut dyn Allocator,
    index: usize,
    elem_size: usize,
}

impl<'a> RecordVectorMut<'a> {
    pub fn new(alloc: &'a mut dyn Allocator, index: usize, elem_size: usize) -> Self {
        RecordVectorMut { alloc, index, elem_size }
    }

    pub fn len(&self) -> usize {
        self.alloc.dynamic_len(self.index) / self.elem_size
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, element: usize) -> Option<Record> {
        if element >= self.len() {
            return None;
        }
        let mut image = vec![0u8; self.elem_size];
        self.alloc.read_dynamic(self.index, element * self.elem_size, &mut image);
        Some(Record::with_allocator(Box::new(
            crate::allocator::HeapAllocator::from_bytes(self.elem_size, 0, image),
        )))
    }

    /// Overwrite one element from a source record's static image. Returns
    /// false when out of range.
    pub fn set(&mut self, element: usize, source: &Record) -> bool {
        if element >= self.len() {
            return false;
        }
        let image = source.snapshot();
        assert_eq!(
            image.len(),
            self.elem_size,
            "element image of {} bytes does not match the {}-byte element size",
            image.len(),
            self.elem_size
        );
        self.alloc.write_dynamic(self.index, element * self.elem_size, &image);
        true
    }

    /// Append a source record's static image, growing the payload.
    pub fn push(&mut self, source: &Record) {
        let image = source.snapshot();
        assert_eq!(
            image.len(),
            self.elem_size,
            "element image of {} bytes does not match the {}-byte element size",
            image.len(),
            self.elem_size
        );
        let mut raw = vec![0u8; self.alloc.dynamic_len(self.index)];
        self.alloc.read_dynamic(self.index, 0, &mut raw);
        raw.extend_from_slice(&image);
        self.alloc.update_dynamic(self.index, &raw);
    }

    pub fn clear(&mut self) {
        self.alloc.update_dynamic(self.index, &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn record_with_one_slot() -> Record {
        Record::new(4 + 16, 1)
    }

    #[test]
    fn vector_reads_track_mutations() {
        let mut record = record_with_one_slot();
        record.set_dynamic_scalars::<u32>(0, &[10, 20, 30]);

        {
            let vec = record.vector::<u32>(0);
            assert_eq!(vec.len(), 3);
            assert_eq!(vec.get(1), Some(20));
            assert_eq!(vec.get(3), None);
            assert_eq!(vec.to_vec(), vec![10, 20, 30]);
        }

        let mut vec = record.vector_mut::<u32>(0);
        assert!(vec.set(1, 21));
        vec.push(40);
        assert_eq!(vec.to_vec(), vec![10, 21, 30, 40]);
        assert!(!vec.set(4, 0));

        vec.clear();
        assert!(vec.is_empty());
    }

    #[test]
    fn record_vector_round_trips_element_images() {
        let mut element = Record::new(8, 0);
        element.set::<u32>(4, 123);

        let mut record = record_with_one_slot();
        {
            let mut vec = record.record_vector_mut(0, 8);
            vec.push(&element);
            element.set::<u32>(4, 456);
            vec.push(&element);
            assert_eq!(vec.len(), 2);
        }

        let vec = record.record_vector(0, 8);
        assert_eq!(vec.at(0).unwrap().get::<u32>(4), 123);
        assert_eq!(vec.at(1).unwrap().get::<u32>(4), 456);
        assert!(vec.at(2).is_none());
    }

    #[test]
    fn record_vector_set_overwrites_in_place() {
        let mut element = Record::new(8, 0);
        element.set::<u32>(4, 1);

        let mut record = record_with_one_slot();
        record.record_vector_mut(0, 8).push(&element);

        element.set::<u32>(4, 2);
        assert!(record.record_vector_mut(0, 8).set(0, &element));
        assert_eq!(record.record_vector(0, 8).at(0).unwrap().get::<u32>(4), 2);
    }
}
