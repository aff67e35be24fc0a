//! Column sort anchors.

use crate::{QueryString, escape_html};
use tabula_core::{ColumnDescriptor, ColumnSortLink, NormalizedQueryParams, SortDirection};

/// Direction a sort anchor for `target` should request.
///
/// Clicking the column that is already sorted in the requested direction
/// flips it; anything else requests the direction as given.
///
/// # Examples
///
/// ```
/// use tabula_core::SortDirection;
/// use tabula_database::toggle;
///
/// let flipped = toggle(Some("name"), Some(SortDirection::Asc), "name", SortDirection::Asc);
/// assert_eq!(flipped, SortDirection::Desc);
/// assert_eq!(toggle(Some("name"), Some(SortDirection::Asc), "email", SortDirection::Asc), SortDirection::Asc);
/// ```
pub fn toggle(
    current_column: Option<&str>,
    current_direction: Option<SortDirection>,
    target: &str,
    requested: SortDirection,
) -> SortDirection {
    if current_column == Some(target) && current_direction == Some(requested) {
        requested.opposite()
    } else {
        requested
    }
}

/// Builds sort anchors against one request's navigation state.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct SortLinkBuilder<'a> {
    params: &'a NormalizedQueryParams,
    base_url: &'a str,
}

impl SortLinkBuilder<'_> {
    /// Anchor that sorts by `target`, toggling when already sorted that way.
    ///
    /// The link keeps the search and the page as they are.
    pub fn render(
        &self,
        label: &str,
        target: &str,
        requested: SortDirection,
        css_class: Option<&str>,
    ) -> String {
        let direction = toggle(
            self.params.sort_column(),
            self.params.sort_direction(),
            target,
            requested,
        );
        let href = format!(
            "{}?{}",
            self.base_url,
            QueryString::serialize(&self.params.with_sort(target, direction))
        );
        let class = css_class
            .map(|c| format!("class=\"{}\" ", escape_html(c)))
            .unwrap_or_default();
        format!(
            "<a {}href=\"{}\">{}</a>",
            class,
            escape_html(&href),
            escape_html(label)
        )
    }

    /// Ascending-first anchors for every column, labelled by column label.
    pub fn column_links(&self, columns: &[ColumnDescriptor]) -> Vec<ColumnSortLink> {
        columns
            .iter()
            .map(|column| {
                ColumnSortLink::new(
                    column.name().clone(),
                    self.render(column.label(), column.name(), SortDirection::Asc, None),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(column: &str, direction: SortDirection) -> NormalizedQueryParams {
        NormalizedQueryParams::builder()
            .sort_column(column)
            .sort_direction(direction)
            .page_number(3u64)
            .build()
            .unwrap()
    }

    #[test]
    fn test_toggle_without_current_sort() {
        assert_eq!(toggle(None, None, "id", SortDirection::Desc), SortDirection::Desc);
    }

    #[test]
    fn test_toggle_same_column_other_direction_keeps_request() {
        assert_eq!(
            toggle(Some("id"), Some(SortDirection::Desc), "id", SortDirection::Asc),
            SortDirection::Asc
        );
    }

    #[test]
    fn test_render_flips_current_sort() {
        let params = sorted("name", SortDirection::Asc);
        let anchor = SortLinkBuilder::new(&params, "/member").render(
            "Name",
            "name",
            SortDirection::Asc,
            Some("sort"),
        );
        assert_eq!(
            anchor,
            "<a class=\"sort\" href=\"/member?&amp;sst=name&amp;sod=DESC&amp;rows=20&amp;page=3\">Name</a>"
        );
    }

    #[test]
    fn test_two_clicks_restore_direction() {
        let params = sorted("name", SortDirection::Asc);
        let first = toggle(params.sort_column(), params.sort_direction(), "name", SortDirection::Asc);
        assert_eq!(first, SortDirection::Desc);
        let clicked = params.with_sort("name", first);
        let second = toggle(
            clicked.sort_column(),
            clicked.sort_direction(),
            "name",
            SortDirection::Desc,
        );
        assert_eq!(second, SortDirection::Asc);
    }

    #[test]
    fn test_column_links_follow_column_order() {
        let params = sorted("name", SortDirection::Asc);
        let columns = vec![
            ColumnDescriptor::new("id", "id", "int"),
            ColumnDescriptor::new("name", "Member <Name>", "varchar"),
        ];
        let links = SortLinkBuilder::new(&params, "/member").column_links(&columns);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].column(), "id");
        assert!(links[0].anchor().contains("sst=id&amp;sod=ASC"));
        assert!(links[1].anchor().contains("sod=DESC"));
        assert!(links[1].anchor().ends_with(">Member &lt;Name&gt;</a>"));
    }
}
