use std::ops::Range;

/// "Showing `from` to `to` of `total`", with `from` 1-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PageRange {
	pub from: usize,
	pub to: usize,
	pub total: usize,
}

/// Visible slice of a result list for a 1-based page index and page size.
///
/// `current_page` always lies in `1..=total_pages()`, and `total_pages()` is at least 1 even
/// for an empty list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PaginationWindow {
	len: usize,
	page_size: usize,
	current_page: usize,
}
impl PaginationWindow {
	pub fn new(page_size: usize) -> Self {
		Self { len: 0, page_size: page_size.max(1), current_page: 1 }
	}

	pub fn len(&self) -> usize {
		self.len
	}

	pub fn is_empty(&self) -> bool {
		self.len == 0
	}

	pub fn page_size(&self) -> usize {
		self.page_size
	}

	pub fn current_page(&self) -> usize {
		self.current_page
	}

	pub fn total_pages(&self) -> usize {
		self.len.div_ceil(self.page_size).max(1)
	}

	/// Called whenever the result list is replaced. Clamps the current page if the list shrank.
	pub fn set_len(&mut self, len: usize) {
		self.len = len;
		self.current_page = self.current_page.min(self.total_pages());
	}

	/// A new page size always returns to page 1. Zero is rejected.
	pub fn set_page_size(&mut self, page_size: usize) -> bool {
		if page_size == 0 {
			return false;
		}

		self.page_size = page_size;
		self.current_page = 1;

		true
	}

	/// Out-of-range requests are ignored without side effects.
	pub fn go_to(&mut self, page: usize) -> bool {
		if page == 0 || page > self.total_pages() {
			return false;
		}

		self.current_page = page;

		true
	}

	pub fn first(&mut self) {
		self.current_page = 1;
	}

	pub fn last(&mut self) {
		self.current_page = self.total_pages();
	}

	pub fn next(&mut self) -> bool {
		self.go_to(self.current_page + 1)
	}

	pub fn previous(&mut self) -> bool {
		self.current_page > 1 && self.go_to(self.current_page - 1)
	}

	pub fn range(&self) -> Range<usize> {
		let start = ((self.current_page - 1) * self.page_size).min(self.len);
		let end = (self.current_page * self.page_size).min(self.len);

		start..end
	}

	pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
		let Range { start, end } = self.range();

		&items[start.min(items.len())..end.min(items.len())]
	}

	pub fn showing(&self) -> PageRange {
		let start = (self.current_page - 1) * self.page_size + 1;

		PageRange {
			from: start.min(self.len),
			to: (self.current_page * self.page_size).min(self.len),
			total: self.len,
		}
	}
}
