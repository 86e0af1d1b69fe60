//! Codec service
//!
//! Applies the tree codec to JSON documents: flat arrays of records on one
//! side, arrays of nested nodes on the other.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::record::{
    forest_from_value, forest_to_value, records_from_value, records_to_value,
};
use crate::domain::{
    count_nodes, forest_depth, from_tree, make_tree, BuildOptions, DanglingPolicy, Record,
    RecordKey, RecordSchema, TreeNode, TreeNodeConvert,
};
use crate::infrastructure::traits::FileSystem;

/// Deepest tree a nested document may hold.
///
/// Each level nests an object and a children array; serde_json stops
/// parsing at 128 nested containers.
pub const MAX_DOCUMENT_DEPTH: usize = 63;

/// Deepest tree `render_document` will draw.
///
/// termtree nests one `Tree` per level and formats recursively.
pub const MAX_RENDER_DEPTH: usize = 256;

/// Per-call codec parameters, seeded from settings and overridable.
#[derive(Debug, Clone, PartialEq)]
pub struct CodecParams {
    pub schema: RecordSchema,
    pub root: Option<RecordKey>,
    pub on_dangling: DanglingPolicy,
    pub label_field: String,
    pub pretty: bool,
}

impl Default for CodecParams {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl CodecParams {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            schema: settings.schema(),
            root: settings.root.to_key(),
            on_dangling: settings.on_dangling,
            label_field: settings.label_field.clone(),
            pretty: settings.pretty,
        }
    }

    pub fn build_options(&self) -> BuildOptions<RecordKey> {
        BuildOptions {
            root: self.root.clone(),
            on_dangling: self.on_dangling,
        }
    }
}

/// Shape summary of a flat document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub roots: usize,
    pub nodes: usize,
    pub depth: usize,
    pub leaves: usize,
}

/// Service converting JSON documents between flat and nested form.
pub struct CodecService {
    fs: Arc<dyn FileSystem>,
    params: CodecParams,
}

impl CodecService {
    /// Create a new codec service.
    pub fn new(fs: Arc<dyn FileSystem>, params: CodecParams) -> Self {
        Self { fs, params }
    }

    /// Build nested records from a parsed flat document.
    pub fn build_forest(&self, value: Value) -> ApplicationResult<Vec<TreeNode<Record>>> {
        let records = records_from_value(value, &self.params.schema)?;
        debug!("build_forest: {} records", records.len());
        Ok(make_tree(records, &self.params.build_options())?)
    }

    /// Flat document value -> nested document value.
    pub fn build_value(&self, value: Value) -> ApplicationResult<Value> {
        let forest = self.build_forest(value)?;
        check_depth(&forest, MAX_DOCUMENT_DEPTH)?;
        Ok(forest_to_value(forest, &self.params.schema))
    }

    /// Nested document value -> flat document value in pre-order.
    pub fn flatten_value(&self, value: Value) -> ApplicationResult<Value> {
        let forest = forest_from_value(value, &self.params.schema)?;
        Ok(records_to_value(from_tree(forest)))
    }

    /// Flat JSON text -> nested JSON text.
    #[instrument(level = "debug", skip_all)]
    pub fn build_document(&self, json: &str) -> ApplicationResult<String> {
        let value = parse(json, "flat document")?;
        self.render_json(&self.build_value(value)?)
    }

    /// Nested JSON text -> flat JSON text.
    #[instrument(level = "debug", skip_all)]
    pub fn flatten_document(&self, json: &str) -> ApplicationResult<String> {
        let value = parse(json, "tree document")?;
        self.render_json(&self.flatten_value(value)?)
    }

    /// Flat JSON text -> terminal tree drawing, one block per root.
    pub fn render_document(&self, json: &str) -> ApplicationResult<String> {
        let forest = self.build_forest(parse(json, "flat document")?)?;
        check_depth(&forest, MAX_RENDER_DEPTH)?;
        let label_field = self.params.label_field.as_str();
        let rendered: Vec<String> = forest
            .to_tree_strings(|record| record.label(label_field))
            .iter()
            .map(ToString::to_string)
            .collect();
        Ok(rendered.concat())
    }

    /// Shape summary of a flat JSON document.
    pub fn stats_document(&self, json: &str) -> ApplicationResult<DocumentStats> {
        let forest = self.build_forest(parse(json, "flat document")?)?;
        let leaves = forest
            .iter()
            .flat_map(TreeNode::iter)
            .filter(|node| node.is_leaf())
            .count();
        Ok(DocumentStats {
            roots: forest.len(),
            nodes: count_nodes(&forest),
            depth: forest_depth(&forest),
            leaves,
        })
    }

    /// Build from a flat file; write to `output` when given.
    ///
    /// Returns the nested document either way.
    #[instrument(level = "debug", skip(self))]
    pub fn build_file(&self, input: &Path, output: Option<&Path>) -> ApplicationResult<String> {
        let json = self.read_input(input)?;
        let document = self.build_document(&json)?;
        self.write_document(output, &document)?;
        Ok(document)
    }

    /// Flatten a nested file; write to `output` when given.
    #[instrument(level = "debug", skip(self))]
    pub fn flatten_file(&self, input: &Path, output: Option<&Path>) -> ApplicationResult<String> {
        let json = self.read_input(input)?;
        let document = self.flatten_document(&json)?;
        self.write_document(output, &document)?;
        Ok(document)
    }

    pub fn render_file(&self, input: &Path) -> ApplicationResult<String> {
        self.render_document(&self.read_input(input)?)
    }

    pub fn stats_file(&self, input: &Path) -> ApplicationResult<DocumentStats> {
        self.stats_document(&self.read_input(input)?)
    }

    fn read_input(&self, input: &Path) -> ApplicationResult<String> {
        debug!("read_input: {}", input.display());
        self.fs.read_to_string(input).with_input_context(input)
    }

    /// Write a rendered document to `output`; no-op when `None`.
    pub fn write_document(&self, output: Option<&Path>, document: &str) -> ApplicationResult<()> {
        if let Some(path) = output {
            debug!("write_document: {}", path.display());
            self.fs
                .write_atomic(path, document)
                .with_path_context("write document", path)?;
        }
        Ok(())
    }

    fn render_json(&self, value: &Value) -> ApplicationResult<String> {
        let mut text = if self.params.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
        .map_err(|e| ApplicationError::json("output document", e))?;
        text.push('\n');
        Ok(text)
    }
}

fn check_depth<T>(forest: &[TreeNode<T>], limit: usize) -> ApplicationResult<()> {
    let depth = forest_depth(forest);
    if depth > limit {
        return Err(ApplicationError::TooDeep { depth, limit });
    }
    Ok(())
}

fn parse(json: &str, context: &str) -> ApplicationResult<Value> {
    serde_json::from_str(json).map_err(|e| ApplicationError::json(context, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::traits::RealFileSystem;
    use serde_json::json;

    fn service(params: CodecParams) -> CodecService {
        CodecService::new(Arc::new(RealFileSystem), params)
    }

    #[test]
    fn given_flat_document_when_building_then_children_field_added() {
        let svc = service(CodecParams::default());
        let tree = svc
            .build_value(json!([
                {"id": 1, "parentId": 0, "name": "A"},
                {"id": 2, "parentId": 1, "name": "B"}
            ]))
            .unwrap();

        assert_eq!(
            tree,
            json!([{"id": 1, "parentId": 0, "name": "A", "children": [
                {"id": 2, "parentId": 1, "name": "B", "children": []}
            ]}])
        );
    }

    #[test]
    fn given_custom_schema_when_flattening_then_custom_children_field_stripped() {
        let params = CodecParams {
            schema: RecordSchema {
                id_field: "key".into(),
                parent_field: "up".into(),
                children_field: "items".into(),
            },
            ..CodecParams::default()
        };
        let svc = service(params);

        let flat = svc
            .flatten_value(json!([{"key": "a", "items": [{"key": "b", "up": "a"}]}]))
            .unwrap();

        assert_eq!(flat, json!([{"key": "a"}, {"key": "b", "up": "a"}]));
    }

    #[test]
    fn given_invalid_json_when_building_then_json_error() {
        let svc = service(CodecParams::default());
        let err = svc.build_document("[{").unwrap_err();
        assert!(matches!(err, ApplicationError::Json { .. }));
    }

    #[test]
    fn given_compact_output_when_building_then_single_line() {
        let svc = service(CodecParams {
            pretty: false,
            ..CodecParams::default()
        });
        let out = svc.build_document(r#"[{"id":1,"parentId":0}]"#).unwrap();
        assert_eq!(out, "[{\"id\":1,\"parentId\":0,\"children\":[]}]\n");
    }

    #[test]
    fn given_flat_document_when_computing_stats_then_shape_reported() {
        let svc = service(CodecParams::default());
        let stats = svc
            .stats_document(
                r#"[{"id":1,"parentId":0},{"id":2,"parentId":1},{"id":3,"parentId":1},{"id":4,"parentId":0}]"#,
            )
            .unwrap();
        assert_eq!(
            stats,
            DocumentStats {
                roots: 2,
                nodes: 4,
                depth: 2,
                leaves: 3
            }
        );
    }
}
