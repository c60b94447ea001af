use serde::Serialize;

/// Page of results plus the cursor math the frontend needs.
/// `total_count` respects the `include_deleted` flag of the listing call:
/// inactive rows are only counted when they are also returned.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
  pub items: Vec<T>,
  pub total_count: i64,
  pub current_page: i64,
  pub total_pages: i64,
  pub has_next_page: bool,
  pub has_previous_page: bool,
}

impl<T> Paginated<T> {
  pub fn new(items: Vec<T>, total_count: i64, page: i64, limit: i64) -> Self {
    let total_pages = if total_count == 0 {
      0
    } else {
      (total_count + limit - 1) / limit
    };

    Self {
      items,
      total_count,
      current_page: page,
      total_pages,
      has_next_page: page < total_pages,
      has_previous_page: page > 1,
    }
  }
}

/// Envelope returned by every mutation command.
#[derive(Debug, Clone, Serialize)]
pub struct Mutation<T> {
  pub success: bool,
  pub data: T,
}

impl<T> Mutation<T> {
  pub fn of(data: T) -> Self {
    Self { success: true, data }
  }
}
