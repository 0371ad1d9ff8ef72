use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing parameters understood by the agent.
///
/// The dispatcher and scheduler never interpret these; they are merged and
/// handed to the transport as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_collection_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_errors: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, alias = "canonicalProperties", skip_serializing_if = "Option::is_none")]
    pub canonical_naming: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_stack_trace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialize_exception: Option<bool>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub if_modified_since: Option<DateTime<Utc>>,
}

impl ProcessingParams {
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_max_collection_size(mut self, size: u32) -> Self {
        self.max_collection_size = Some(size);
        self
    }

    pub fn with_max_objects(mut self, count: u32) -> Self {
        self.max_objects = Some(count);
        self
    }

    pub fn with_ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = Some(ignore);
        self
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub fn with_canonical_naming(mut self, canonical: bool) -> Self {
        self.canonical_naming = Some(canonical);
        self
    }

    pub fn with_include_stack_trace(mut self, include: bool) -> Self {
        self.include_stack_trace = Some(include);
        self
    }

    pub fn with_serialize_exception(mut self, serialize: bool) -> Self {
        self.serialize_exception = Some(serialize);
        self
    }

    pub fn with_if_modified_since(mut self, since: DateTime<Utc>) -> Self {
        self.if_modified_since = Some(since);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == ProcessingParams::default()
    }

    /// Whether the caller asked for errors to be tolerated
    pub fn ignores_errors(&self) -> bool {
        self.ignore_errors.unwrap_or(false)
    }

    /// Merge `overrides` on top of `self`; values set in `overrides` win.
    pub fn overlay(&self, overrides: &ProcessingParams) -> ProcessingParams {
        ProcessingParams {
            max_depth: overrides.max_depth.or(self.max_depth),
            max_collection_size: overrides.max_collection_size.or(self.max_collection_size),
            max_objects: overrides.max_objects.or(self.max_objects),
            ignore_errors: overrides.ignore_errors.or(self.ignore_errors),
            mime_type: overrides.mime_type.clone().or_else(|| self.mime_type.clone()),
            canonical_naming: overrides.canonical_naming.or(self.canonical_naming),
            include_stack_trace: overrides.include_stack_trace.or(self.include_stack_trace),
            serialize_exception: overrides.serialize_exception.or(self.serialize_exception),
            if_modified_since: overrides.if_modified_since.or(self.if_modified_since),
        }
    }

    /// Render as URL query parameters, in a fixed order.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(v) = self.max_depth {
            query.push(("maxDepth", v.to_string()));
        }
        if let Some(v) = self.max_collection_size {
            query.push(("maxCollectionSize", v.to_string()));
        }
        if let Some(v) = self.max_objects {
            query.push(("maxObjects", v.to_string()));
        }
        if let Some(v) = self.ignore_errors {
            query.push(("ignoreErrors", v.to_string()));
        }
        if let Some(v) = &self.mime_type {
            query.push(("mimeType", v.clone()));
        }
        if let Some(v) = self.canonical_naming {
            query.push(("canonicalNaming", v.to_string()));
        }
        if let Some(v) = self.include_stack_trace {
            query.push(("includeStackTrace", v.to_string()));
        }
        if let Some(v) = self.serialize_exception {
            query.push(("serializeException", v.to_string()));
        }
        if let Some(v) = self.if_modified_since {
            query.push(("ifModifiedSince", v.timestamp().to_string()));
        }
        query
    }
}
