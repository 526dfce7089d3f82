//! The paged-list query-string convention.
//!
//! Every sortable, filterable, paginated collection endpoint takes the same
//! parameter set: a `draw` token, `start`/`length` for the page window,
//! `search[value]` when a term is active, one parameter per active column
//! filter, and `order[0][column]`/`order[0][dir]` for the sort. The backend
//! dictates this shape; the builder's job is to produce it deterministically.

use ustr::Ustr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// Abstract query intent for one fetch of a paged-list endpoint.
#[derive(Debug, Clone)]
pub struct TableQuery<'a> {
    pub page_index: usize,
    pub page_size: usize,
    pub search_term: &'a str,
    pub sort_column: usize,
    pub sort_direction: SortDirection,
    /// Active extra filters, already trimmed and blank-free, in column order.
    pub extra_filters: &'a [(Ustr, String)],
}

impl TableQuery<'_> {
    /// The ordered parameter list for this query.
    ///
    /// Identical inputs produce identical lists; blank filter values never
    /// appear (the filter layer guarantees `extra_filters` is already
    /// trimmed, and the search term is trimmed here).
    pub fn params(&self, draw: u64) -> Vec<(String, String)> {
        let mut params = vec![
            ("draw".to_owned(), draw.to_string()),
            (
                "start".to_owned(),
                (self.page_index * self.page_size).to_string(),
            ),
            ("length".to_owned(), self.page_size.to_string()),
        ];

        let term = self.search_term.trim();
        if !term.is_empty() {
            params.push(("search[value]".to_owned(), term.to_owned()));
        }

        for (key, value) in self.extra_filters {
            params.push((key.to_string(), value.clone()));
        }

        params.push(("order[0][column]".to_owned(), self.sort_column.to_string()));
        params.push((
            "order[0][dir]".to_owned(),
            self.sort_direction.as_query().to_owned(),
        ));

        params
    }
}

/// Percent-encodes an ordered parameter list into a query string.
pub fn encode_params(params: &[(String, String)]) -> String {
    let mut out = String::new();
    for (index, (key, value)) in params.iter().enumerate() {
        if index > 0 {
            out.push('&');
        }
        out.push_str(&urlencoding::encode(key));
        out.push('=');
        out.push_str(&urlencoding::encode(value));
    }
    out
}
