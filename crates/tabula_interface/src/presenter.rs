//! Rendering seam.

use tabula_core::{ListPage, RowPage};

/// Receives the payloads produced for list and row views.
///
/// The engine is agnostic to templating: a presenter may render HTML, emit
/// JSON, or just capture the payload in a test.
pub trait Presenter {
    /// What presenting produces.
    type Output;

    /// Present a paged list.
    fn present_list(&self, page: &ListPage) -> Self::Output;

    /// Present a single row.
    fn present_row(&self, page: &RowPage) -> Self::Output;
}

/// Presenter that serializes payloads to JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPresenter {
    pretty: bool,
}

impl JsonPresenter {
    /// Compact JSON output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Indented JSON output.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    fn render<T: serde::Serialize>(&self, value: &T) -> Result<String, serde_json::Error> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.inspect_err(|e| tracing::error!(error = %e, "Failed to serialize page payload"))
    }
}

impl Presenter for JsonPresenter {
    type Output = Result<String, serde_json::Error>;

    fn present_list(&self, page: &ListPage) -> Self::Output {
        self.render(page)
    }

    fn present_row(&self, page: &RowPage) -> Self::Output {
        self.render(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_presenter_renders_list() {
        let mut row = tabula_core::Row::new();
        row.insert("id".to_string(), json!(1));
        let page = ListPage::new(
            "Member".to_string(),
            1,
            String::new(),
            vec![row],
            Vec::new(),
            String::new(),
        );

        let output = JsonPresenter::new().present_list(&page).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["heading"], "Member");
        assert_eq!(value["total_count"], 1);
        assert_eq!(value["rows"][0]["id"], 1);
    }
}
