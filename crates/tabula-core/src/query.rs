use serde::{Deserialize, Serialize};

use crate::shape::Shape;

/// Largest page the list-records endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellFormat {
    Json,
    String,
}

impl CellFormat {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::String => "string",
        }
    }
}

/// Options for listing records. Every parameter is optional.
///
/// | Parameter | Meaning |
/// |-----------|---------|
/// | `fields` | field names or ids to return |
/// | `filter_by_formula` | Airtable formula rows must satisfy |
/// | `max_records` | total record cap across all pages |
/// | `page_size` | records per page, at most [`MAX_PAGE_SIZE`] |
/// | `sort` | ordered sort keys |
/// | `view` | view name or id whose filters and order apply |
/// | `cell_format` | `json` or `string` cell rendering |
/// | `time_zone` / `user_locale` | formatting for `string` cells |
/// | `return_fields_by_field_id` | key fields by id instead of name |
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_by_formula: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Vec<Sort>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_format: Option<CellFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_fields_by_field_id: Option<bool>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.filter_by_formula = Some(formula.into());
        self
    }

    pub fn with_max_records(mut self, max_records: u32) -> Self {
        self.max_records = Some(max_records);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort.get_or_insert_with(Vec::new).push(sort);
        self
    }

    pub fn with_view(mut self, view: impl Into<String>) -> Self {
        self.view = Some(view.into());
        self
    }

    pub fn with_cell_format(mut self, cell_format: CellFormat) -> Self {
        self.cell_format = Some(cell_format);
        self
    }

    pub fn with_time_zone(mut self, time_zone: impl Into<String>) -> Self {
        self.time_zone = Some(time_zone.into());
        self
    }

    pub fn with_user_locale(mut self, user_locale: impl Into<String>) -> Self {
        self.user_locale = Some(user_locale.into());
        self
    }

    pub fn returning_field_ids(mut self) -> Self {
        self.return_fields_by_field_id = Some(true);
        self
    }

    /// Encodes the query the way the list-records endpoint expects it,
    /// appending `offset` when continuing a previous page.
    pub fn to_query_string(&self, offset: Option<&str>) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();

        if let Some(fields) = &self.fields {
            for field in fields {
                pairs.push((String::from("fields[]"), field.clone()));
            }
        }
        if let Some(formula) = &self.filter_by_formula {
            pairs.push((String::from("filterByFormula"), formula.clone()));
        }
        if let Some(max_records) = self.max_records {
            pairs.push((String::from("maxRecords"), max_records.to_string()));
        }
        if let Some(page_size) = self.page_size {
            pairs.push((String::from("pageSize"), page_size.to_string()));
        }
        if let Some(sort) = &self.sort {
            for (index, key) in sort.iter().enumerate() {
                pairs.push((format!("sort[{index}][field]"), key.field.clone()));
                pairs.push((
                    format!("sort[{index}][direction]"),
                    key.direction.as_str().to_owned(),
                ));
            }
        }
        if let Some(view) = &self.view {
            pairs.push((String::from("view"), view.clone()));
        }
        if let Some(cell_format) = self.cell_format {
            pairs.push((String::from("cellFormat"), cell_format.as_str().to_owned()));
        }
        if let Some(time_zone) = &self.time_zone {
            pairs.push((String::from("timeZone"), time_zone.clone()));
        }
        if let Some(user_locale) = &self.user_locale {
            pairs.push((String::from("userLocale"), user_locale.clone()));
        }
        if let Some(by_id) = self.return_fields_by_field_id {
            pairs.push((String::from("returnFieldsByFieldId"), by_id.to_string()));
        }
        if let Some(offset) = offset {
            pairs.push((String::from("offset"), offset.to_owned()));
        }

        pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(key),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Shape a [`SelectQuery`] must satisfy once serialized.
pub fn select_query_shape() -> Shape {
    Shape::object([
        ("fields", Shape::optional(Shape::array(Shape::string()))),
        ("filterByFormula", Shape::optional(Shape::string())),
        (
            "maxRecords",
            Shape::optional(Shape::integer_in(1, i64::from(u32::MAX))),
        ),
        (
            "pageSize",
            Shape::optional(Shape::integer_in(1, i64::from(MAX_PAGE_SIZE))),
        ),
        (
            "sort",
            Shape::optional(Shape::array(Shape::object([
                ("field", Shape::string()),
                ("direction", Shape::one_of(["asc", "desc"])),
            ]))),
        ),
        ("view", Shape::optional(Shape::string())),
        ("cellFormat", Shape::optional(Shape::one_of(["json", "string"]))),
        ("timeZone", Shape::optional(Shape::string())),
        ("userLocale", Shape::optional(Shape::string())),
        ("returnFieldsByFieldId", Shape::optional(Shape::boolean())),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_encodes_to_nothing() {
        assert_eq!(SelectQuery::new().to_query_string(None), "");
    }

    #[test]
    fn encodes_arrays_and_sort_in_vendor_format() {
        let query = SelectQuery::new()
            .with_fields(["Name", "Full Name"])
            .with_sort(Sort::desc("Name"))
            .with_page_size(50);

        assert_eq!(
            query.to_query_string(Some("itr1/rec2")),
            "fields%5B%5D=Name&fields%5B%5D=Full%20Name&pageSize=50\
             &sort%5B0%5D%5Bfield%5D=Name&sort%5B0%5D%5Bdirection%5D=desc\
             &offset=itr1%2Frec2"
        );
    }

    #[test]
    fn shape_rejects_out_of_range_page_size() {
        for page_size in [0, MAX_PAGE_SIZE + 1] {
            let value = serde_json::to_value(SelectQuery::new().with_page_size(page_size))
                .expect("serializable");
            let diagnostic = select_query_shape().validate(&value).expect_err("must fail");
            assert_eq!(diagnostic.issues()[0].path, "pageSize");
        }
    }

    #[test]
    fn serialized_query_matches_shape() {
        let query = SelectQuery::new()
            .with_formula("{Status} = 'Done'")
            .with_cell_format(CellFormat::String)
            .with_time_zone("Europe/London")
            .with_user_locale("en-gb")
            .returning_field_ids();

        let value = serde_json::to_value(&query).expect("serializable");
        assert_eq!(value["filterByFormula"], "{Status} = 'Done'");
        assert!(select_query_shape().validate(&value).is_ok());
    }
}
