use std::cell::RefCell;
use std::rc::Rc;

/// Format tag written into bytes 0..4 of every heap-backed record.
pub const FORMAT_VERSION: u32 = 1;

/// Size of the reserved version header at the start of a record.
pub const VERSION_HEADER_SIZE: usize = 4;

/// Size of one dynamic-slot header: 8-byte payload offset + 8-byte length.
pub const SLOT_HEADER_SIZE: usize = 16;

/// Storage backend for a record.
///
/// An allocator owns (or windows into) the record's byte image and knows how
/// to resolve dynamic-slot indices to variable-length payloads. The internal
/// arrangement of the payload region past `static_size` is the allocator's
/// business; callers only see slot indices.
///
/// Offsets passed to `read_bytes`/`write_bytes` are relative to the start of
/// the allocator's storage (the window start for sub-allocators).
pub trait Allocator {
    /// Size of the fixed, offset-addressable region in bytes.
    fn static_size(&self) -> usize;

    /// Number of dynamic slots.
    fn dynamic_count(&self) -> usize;

    /// Total length of the storage, including any dynamic payload region.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `out.len()` bytes starting at `offset` into `out`.
    fn read_bytes(&self, offset: usize, out: &mut [u8]);

    /// Copy `data` into storage starting at `offset`.
    fn write_bytes(&mut self, offset: usize, data: &[u8]);

    /// Current payload length of a dynamic slot in bytes.
    fn dynamic_len(&self, index: usize) -> usize;

    /// Copy `out.len()` bytes from a slot payload, starting at `offset`
    /// within the payload.
    fn read_dynamic(&self, index: usize, offset: usize, out: &mut [u8]);

    /// Overwrite bytes within a slot payload in place, without resizing it.
    fn write_dynamic(&mut self, index: usize, offset: usize, data: &[u8]);

    /// Replace a slot payload wholesale, resizing it to `payload.len()`.
    fn update_dynamic(&mut self, index: usize, payload: &[u8]);

    /// A view presenting `size` bytes at `offset` of this storage as an
    /// independent record's storage. Writes through the view land in the
    /// parent's buffer.
    fn sub_allocator(&self, offset: usize, size: usize) -> Box<dyn Allocator>;

    /// Copy of the entire storage.
    fn snapshot(&self) -> Vec<u8>;

    /// Replace the entire storage from a previous `snapshot`.
    fn restore(&mut self, bytes: &[u8]);
}

/// Owning allocator backing a standalone record.
///
/// Keeps dynamic payloads packed after the static region. Replacing one
/// payload re-lays the whole tail, updating every slot header; headers of
/// empty slots stay zeroed.
pub struct HeapAllocator {
    buf: Rc<RefCell<Vec<u8>>>,
    static_size: usize,
    dynamic_count: usize,
}

impl HeapAllocator {
    /// Zero-initialized storage of `static_size` bytes with the format
    /// version written into the header.
    pub fn new(static_size: usize, dynamic_count: usize) -> Self {
        let mut buf = vec![0u8; static_size];
        if static_size >= VERSION_HEADER_SIZE {
            buf[..VERSION_HEADER_SIZE].copy_from_slice(&FORMAT_VERSION.to_ne_bytes());
        }
        HeapAllocator {
            buf: Rc::new(RefCell::new(buf)),
            static_size,
            dynamic_count,
        }
    }

    /// Adopt an existing image, e.g. one element of a record array.
    ///
    /// The image must cover at least the static region.
    pub fn from_bytes(static_size: usize, dynamic_count: usize, bytes: Vec<u8>) -> Self {
        assert!(
            bytes.len() >= static_size,
            "image of {} bytes is smaller than the static size {}",
            bytes.len(),
            static_size
        );
        HeapAllocator {
            buf: Rc::new(RefCell::new(bytes)),
            static_size,
            dynamic_count,
        }
    }

    fn header_at(&self, index: usize) -> usize {
        assert!(
            index < self.dynamic_count,
            "dynamic slot {} out of range (record has {})",
            index,
            self.dynamic_count
        );
        VERSION_HEADER_SIZE + index * SLOT_HEADER_SIZE
    }

    fn read_header(&self, index: usize) -> (usize, usize) {
        let at = self.header_at(index);
        let buf = self.buf.borrow();
        let mut word = [0u8; 8];
        word.copy_from_slice(&buf[at..at + 8]);
        let offset = u64::from_ne_bytes(word) as usize;
        word.copy_from_slice(&buf[at + 8..at + 16]);
        let length = u64::from_ne_bytes(word) as usize;
        (offset, length)
    }

    fn write_header(&self, index: usize, offset: usize, length: usize) {
        let at = self.header_at(index);
        let mut buf = self.buf.borrow_mut();
        buf[at..at + 8].copy_from_slice(&(offset as u64).to_ne_bytes());
        buf[at + 8..at + 16].copy_from_slice(&(length as u64).to_ne_bytes());
    }
}

impl Allocator for HeapAllocator {
    fn static_size(&self) -> usize {
        self.static_size
    }

    fn dynamic_count(&self) -> usize {
        self.dynamic_count
    }

    fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        let buf = self.buf.borrow();
        out.copy_from_slice(&buf[offset..offset + out.len()]);
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        let mut buf = self.buf.borrow_mut();
        buf[offset..offset + data.len()].copy_from_slice(data);
    }

    fn dynamic_len(&self, index: usize) -> usize {
        self.read_header(index).1
    }

    fn read_dynamic(&self, index: usize, offset: usize, out: &mut [u8]) {
        let (start, length) = self.read_header(index);
        assert!(
            offset + out.len() <= length,
            "read of {} bytes at {} exceeds payload length {}",
            out.len(),
            offset,
            length
        );
        let buf = self.buf.borrow();
        out.copy_from_slice(&buf[start + offset..start + offset + out.len()]);
    }

    fn write_dynamic(&mut self, index: usize, offset: usize, data: &[u8]) {
        let (start, length) = self.read_header(index);
        assert!(
            offset + data.len() <= length,
            "write of {} bytes at {} exceeds payload length {}",
            data.len(),
            offset,
            length
        );
        let mut buf = self.buf.borrow_mut();
        buf[start + offset..start + offset + data.len()].copy_from_slice(data);
    }

    fn update_dynamic(&mut self, index: usize, payload: &[u8]) {
        self.header_at(index);

        // Gather every payload, swap in the replacement, then repack the
        // tail region and rewrite all headers.
        let mut payloads = Vec::with_capacity(self.dynamic_count);
        for slot in 0..self.dynamic_count {
            if slot == index {
                payloads.push(payload.to_vec());
            } else {
                let (start, length) = self.read_header(slot);
                let buf = self.buf.borrow();
                payloads.push(buf[start..start + length].to_vec());
            }
        }

        self.buf.borrow_mut().truncate(self.static_size);
        for (slot, bytes) in payloads.iter().enumerate() {
            if bytes.is_empty() {
                self.write_header(slot, 0, 0);
                continue;
            }
            let start = self.buf.borrow().len();
            self.buf.borrow_mut().extend_from_slice(bytes);
            self.write_header(slot, start, bytes.len());
        }
    }

    fn sub_allocator(&self, offset: usize, size: usize) -> Box<dyn Allocator> {
        assert!(
            offset + size <= self.static_size,
            "sub-allocator [{}, {}) outside the static region",
            offset,
            offset + size
        );
        Box::new(StaticSubAllocator {
            buf: Rc::clone(&self.buf),
            base: offset,
            size,
        })
    }

    fn snapshot(&self) -> Vec<u8> {
        self.buf.borrow().clone()
    }

    fn restore(&mut self, bytes: &[u8]) {
        assert!(
            bytes.len() >= self.static_size,
            "restore of {} bytes is smaller than the static size {}",
            bytes.len(),
            self.static_size
        );
        let mut buf = self.buf.borrow_mut();
        buf.clear();
        buf.extend_from_slice(bytes);
    }
}

/// Fixed window over a parent record's static region.
///
/// Backs live views of embedded sub-records. The compiler rejects dynamic
/// fields inside embedded tables, so this allocator has no dynamic section.
pub struct StaticSubAllocator {
    buf: Rc<RefCell<Vec<u8>>>,
    base: usize,
    size: usize,
}

impl StaticSubAllocator {
    fn check(&self, offset: usize, len: usize) {
        assert!(
            offset + len <= self.size,
            "access [{}, {}) outside the {}-byte sub-region",
            offset,
            offset + len,
            self.size
        );
    }
}

impl Allocator for StaticSubAllocator {
    fn static_size(&self) -> usize {
        self.size
    }

    fn dynamic_count(&self) -> usize {
        0
    }

    fn len(&self) -> usize {
        self.size
    }

    fn read_bytes(&self, offset: usize, out: &mut [u8]) {
        self.check(offset, out.len());
        let buf = self.buf.borrow();
        out.copy_from_slice(&buf[self.base + offset..self.base + offset + out.len()]);
    }

    fn write_bytes(&mut self, offset: usize, data: &[u8]) {
        self.check(offset, data.len());
        let mut buf = self.buf.borrow_mut();
        buf[self.base + offset..self.base + offset + data.len()].copy_from_slice(data);
    }

    fn dynamic_len(&self, _index: usize) -> usize {
        panic!("static sub-allocator has no dynamic slots");
    }

    fn read_dynamic(&self, _index: usize, _offset: usize, _out: &mut [u8]) {
        panic!("static sub-allocator has no dynamic slots");
    }

    fn write_dynamic(&mut self, _index: usize, _offset: usize, _data: &[u8]) {
        panic!("static sub-allocator has no dynamic slots");
    }

    fn update_dynamic(&mut self, _index: usize, _payload: &[u8]) {
        panic!("static sub-allocator has no dynamic slots");
    }

    fn sub_allocator(&self, offset: usize, size: usize) -> Box<dyn Allocator> {
        self.check(offset, size);
        Box::new(StaticSubAllocator {
            buf: Rc::clone(&self.buf),
            base: self.base + offset,
            size,
        })
    }

    fn snapshot(&self) -> Vec<u8> {
        let buf = self.buf.borrow();
        buf[self.base..self.base + self.size].to_vec()
    }

    fn restore(&mut self, bytes: &[u8]) {
        assert_eq!(
            bytes.len(),
            self.size,
            "restore into a {}-byte sub-region needs exactly that many bytes",
            self.size
        );
        let mut buf = self.buf.borrow_mut();
        buf[self.base..self.base + self.size].copy_from_slice(bytes);
    }
}
