//! GraphQL search queries and dataset presets

use infrarisk_core::normalize::DatasetKind;
use serde::Serialize;

/// Catalog attribute holding the dataset identifier
pub const DATASET_ID_ATTRIBUTE: &str = "DPF:dataset_id";

/// Catalog attribute holding the prefecture name
pub const PREFECTURE_ATTRIBUTE: &str = "DPF:prefecture_name";

/// Exact-match filter on one catalog attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub name: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// One page of a keyword search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub term: String,
    /// Index of the first result (`first` in the catalog API)
    pub offset: usize,
    /// Results per page (`size` in the catalog API)
    pub limit: usize,
    pub filter: Option<AttributeFilter>,
}

impl SearchRequest {
    /// Render the GraphQL query text
    pub fn to_graphql(&self) -> String {
        let filter = match &self.filter {
            Some(filter) => format!(
                "\n    attributeFilter: {{ attributeName: \"{}\", is: \"{}\" }}",
                escape_graphql(&filter.name),
                escape_graphql(&filter.value)
            ),
            None => String::new(),
        };

        format!(
            "query {{\n  search(\n    term: \"{}\"\n    phraseMatch: true\n    first: {}\n    size: {}{}\n  ) {{\n    totalNumber\n    searchResults {{\n      id\n      title\n      lat\n      lon\n      metadata\n    }}\n  }}\n}}",
            escape_graphql(&self.term),
            self.offset,
            self.limit,
            filter
        )
    }

    /// JSON request body: `{"query": "..."}`
    pub fn to_body(&self) -> GraphqlBody {
        GraphqlBody { query: self.to_graphql() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlBody {
    pub query: String,
}

/// Escape a value for use inside a GraphQL string literal
pub fn escape_graphql(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

/// Search terms and filter used to fetch one dataset kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPreset {
    pub kind: DatasetKind,
    pub terms: Vec<String>,
    pub filter: Option<AttributeFilter>,
}

impl SearchPreset {
    /// Preset for `kind` restricted to the area named by `region`.
    ///
    /// Dataset-id presets search for the region text inside one dataset;
    /// keyword presets search fixed facility keywords filtered to the region
    /// as a prefecture.
    pub fn for_dataset(kind: DatasetKind, region: &str) -> Self {
        let region = region.trim();
        match kind {
            DatasetKind::Bridge => Self::by_dataset_id(kind, region, "rsdb_bridge"),
            DatasetKind::Pipe => Self::by_dataset_id(kind, region, "nlni_ksj-w09"),
            DatasetKind::Xroad => Self::by_keywords(kind, region, &["橋梁", "道路中心線", "道路施設"]),
            DatasetKind::Sewage => {
                Self::by_keywords(kind, region, &["下水道管渠", "マンホール", "下水道施設"])
            }
            DatasetKind::Water => Self::by_keywords(kind, region, &["水道管路", "消火栓", "水道施設"]),
        }
    }

    fn by_dataset_id(kind: DatasetKind, region: &str, dataset_id: &str) -> Self {
        Self {
            kind,
            terms: vec![region.to_string()],
            filter: Some(AttributeFilter::new(DATASET_ID_ATTRIBUTE, dataset_id)),
        }
    }

    fn by_keywords(kind: DatasetKind, region: &str, keywords: &[&str]) -> Self {
        let filter = (!region.is_empty()).then(|| AttributeFilter::new(PREFECTURE_ATTRIBUTE, region));
        Self { kind, terms: keywords.iter().map(|k| k.to_string()).collect(), filter }
    }

    /// Request for one page of `term`
    pub fn request(&self, term: &str, offset: usize, limit: usize) -> SearchRequest {
        SearchRequest { term: term.to_string(), offset, limit, filter: self.filter.clone() }
    }
}
