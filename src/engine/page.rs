use serde::Deserialize;

/// Pagination parameters sent as `page` and `size` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 0, size: 20 }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
        }
    }

    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        vec![("page", self.page.to_string()), ("size", self.size.to_string())]
    }
}

/// A page of results with the total as far as it is known.
///
/// `total` is `None` when neither the response nor a count endpoint could
/// provide it. The item count of a page is never used as the total.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page may exist. Unknown totals fall back to "the page
    /// was full".
    pub fn has_more(&self) -> bool {
        match self.total {
            Some(total) => (self.page as u64 + 1) * (self.size as u64) < total,
            None => self.items.len() as u32 >= self.size,
        }
    }
}

/// Both list shapes the engine produces: a bare JSON array or a Spring-style
/// `{content: [...], totalElements: n}` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PageBody<T> {
    Bare(Vec<T>),
    Envelope {
        content: Vec<T>,
        #[serde(default, rename = "totalElements", alias = "total")]
        total_elements: Option<u64>,
    },
}

impl<T> PageBody<T> {
    pub(crate) fn into_page(self, request: PageRequest) -> Page<T> {
        let (items, total) = match self {
            PageBody::Bare(items) => (items, None),
            PageBody::Envelope {
                content,
                total_elements,
            } => (content, total_elements),
        };
        Page {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: String,
    }

    #[test]
    fn test_bare_array() {
        let body: PageBody<Row> = serde_json::from_value(json!([{"id": "a"}, {"id": "b"}])).unwrap();
        let page = body.into_page(PageRequest::default());
        assert_eq!(page.len(), 2);
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_empty_bare_array() {
        let body: PageBody<Row> = serde_json::from_value(json!([])).unwrap();
        let page = body.into_page(PageRequest::default());
        assert!(page.is_empty());
        assert_eq!(page.total, None);
    }

    #[test]
    fn test_envelope_with_total() {
        let body: PageBody<Row> = serde_json::from_value(json!({
            "content": [{"id": "a"}],
            "totalElements": 41,
            "totalPages": 3,
            "number": 0
        }))
        .unwrap();
        let page = body.into_page(PageRequest::new(0, 20));
        assert_eq!(page.items, vec![Row { id: "a".into() }]);
        assert_eq!(page.total, Some(41));
        assert!(page.has_more());
    }

    #[test]
    fn test_envelope_without_total() {
        let body: PageBody<Row> = serde_json::from_value(json!({"content": []})).unwrap();
        let page = body.into_page(PageRequest::default());
        assert_eq!(page.total, None);
        assert!(!page.has_more());
    }

    #[test]
    fn test_unknown_total_uses_full_page_heuristic() {
        let page = Page {
            items: vec![1, 2],
            page: 0,
            size: 2,
            total: None,
        };
        assert!(page.has_more());
    }

    #[test]
    fn test_last_page_with_total() {
        let page = Page {
            items: vec![1],
            page: 2,
            size: 20,
            total: Some(41),
        };
        assert!(!page.has_more());
    }
}
