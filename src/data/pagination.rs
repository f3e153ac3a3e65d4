use serde::Serialize;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 10;
pub const MAX_SIZE: u32 = 100;

///A 1-based page of `size` records. Range checks happen at the boundary, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub const fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    pub const fn offset(self) -> u64 {
        (self.page as u64 - 1) * self.size as u64
    }

    pub const fn limit(self) -> u64 {
        self.size as u64
    }
}

pub const fn page_count(total: u64, size: u32) -> u64 {
    total.div_ceil(size as u64)
}

///the envelope every listing goes out in
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub pages: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            size: request.size,
            pages: page_count(total, request.size),
        }
    }
}
