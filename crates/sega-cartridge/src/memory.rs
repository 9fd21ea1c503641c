//! Paged backing store.
//!
//! A flat byte buffer reached through two 256-entry page tables, one for
//! reads and one for writes. Entry `n` holds the offset of the 256-byte page
//! that backs addresses `n << 8 ..= (n << 8) | 0xFF`. Remap callbacks move
//! entries around; the buffer itself is never reallocated.

/// Bytes per page.
pub const PAGE_SIZE: usize = 0x100;

/// Pages in the 64K address space.
pub const PAGE_COUNT: usize = 0x100;

pub struct PagedMemory {
    data: Vec<u8>,
    read_pages: [usize; PAGE_COUNT],
    write_pages: [usize; PAGE_COUNT],
}

impl PagedMemory {
    /// Wrap a backing buffer with every page pointing at offset 0.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than one page.
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        assert!(
            data.len() >= PAGE_SIZE,
            "backing store must hold at least one page, got {} bytes",
            data.len()
        );
        Self {
            data,
            read_pages: [0; PAGE_COUNT],
            write_pages: [0; PAGE_COUNT],
        }
    }

    /// 64K of zeroed RAM with every page mapped to itself.
    #[must_use]
    pub fn flat() -> Self {
        let mut memory = Self::new(vec![0; PAGE_SIZE * PAGE_COUNT]);
        memory.map_range(0x00, PAGE_COUNT, 0);
        memory
    }

    fn check_base(&self, base: usize) {
        assert!(
            base + PAGE_SIZE <= self.data.len(),
            "page base {base:#X} outside backing store of {:#X} bytes",
            self.data.len()
        );
    }

    /// Point page `page` at `base` for reads.
    pub fn map_read(&mut self, page: u8, base: usize) {
        self.check_base(base);
        self.read_pages[usize::from(page)] = base;
    }

    /// Point page `page` at `base` for writes.
    pub fn map_write(&mut self, page: u8, base: usize) {
        self.check_base(base);
        self.write_pages[usize::from(page)] = base;
    }

    /// Map `count` consecutive pages from `first` onto consecutive store
    /// pages from `base`, for reads only.
    pub fn map_read_range(&mut self, first: u8, count: usize, base: usize) {
        for i in 0..count {
            self.map_read(first.wrapping_add(i as u8), base + i * PAGE_SIZE);
        }
    }

    /// Same as [`PagedMemory::map_read_range`] for writes.
    pub fn map_write_range(&mut self, first: u8, count: usize, base: usize) {
        for i in 0..count {
            self.map_write(first.wrapping_add(i as u8), base + i * PAGE_SIZE);
        }
    }

    /// Map a range for both reads and writes.
    pub fn map_range(&mut self, first: u8, count: usize, base: usize) {
        self.map_read_range(first, count, base);
        self.map_write_range(first, count, base);
    }

    #[must_use]
    pub fn read_page(&self, page: u8) -> usize {
        self.read_pages[usize::from(page)]
    }

    #[must_use]
    pub fn write_page(&self, page: u8) -> usize {
        self.write_pages[usize::from(page)]
    }

    /// Read through the read page table.
    #[must_use]
    pub fn read(&self, address: u16) -> u8 {
        let [offset, page] = address.to_le_bytes();
        self.data[self.read_pages[usize::from(page)] + usize::from(offset)]
    }

    /// Write through the write page table.
    pub fn write(&mut self, address: u16, value: u8) {
        let [offset, page] = address.to_le_bytes();
        self.data[self.write_pages[usize::from(page)] + usize::from(offset)] = value;
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}
